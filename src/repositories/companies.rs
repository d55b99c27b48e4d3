use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Company;
use crate::db::types::CompanyStatus;

const COLUMNS: &str = "\
    id, name, legal_name, phone, email, address, national_id, economic_code, \
    field_of_activity, logo, website, description, owner_id, status, created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    status: Option<CompanyStatus>,
) -> Result<Vec<Company>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM companies WHERE TRUE"));

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.build_query_as::<Company>().fetch_all(pool).await
}

pub(crate) async fn list_by_owner(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!(
        "SELECT {COLUMNS} FROM companies WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!("SELECT {COLUMNS} FROM companies WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateCompany<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) legal_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) national_id: Option<String>,
    pub(crate) economic_code: Option<String>,
    pub(crate) field_of_activity: Option<String>,
    pub(crate) logo: Option<String>,
    pub(crate) website: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) owner_id: &'a str,
    pub(crate) status: CompanyStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCompany<'_>,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!(
        "INSERT INTO companies (
            id, name, legal_name, phone, email, address, national_id, economic_code,
            field_of_activity, logo, website, description, owner_id, status,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.legal_name)
    .bind(params.phone)
    .bind(params.email)
    .bind(params.address)
    .bind(params.national_id)
    .bind(params.economic_code)
    .bind(params.field_of_activity)
    .bind(params.logo)
    .bind(params.website)
    .bind(params.description)
    .bind(params.owner_id)
    .bind(params.status)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateCompany {
    pub(crate) name: Option<String>,
    pub(crate) legal_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) national_id: Option<String>,
    pub(crate) economic_code: Option<String>,
    pub(crate) field_of_activity: Option<String>,
    pub(crate) logo: Option<String>,
    pub(crate) website: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) status: Option<CompanyStatus>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateCompany,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!(
        "UPDATE companies SET
            name = COALESCE($1, name),
            legal_name = COALESCE($2, legal_name),
            phone = COALESCE($3, phone),
            email = COALESCE($4, email),
            address = COALESCE($5, address),
            national_id = COALESCE($6, national_id),
            economic_code = COALESCE($7, economic_code),
            field_of_activity = COALESCE($8, field_of_activity),
            logo = COALESCE($9, logo),
            website = COALESCE($10, website),
            description = COALESCE($11, description),
            status = COALESCE($12, status),
            updated_at = $13
         WHERE id = $14
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.legal_name)
    .bind(params.phone)
    .bind(params.email)
    .bind(params.address)
    .bind(params.national_id)
    .bind(params.economic_code)
    .bind(params.field_of_activity)
    .bind(params.logo)
    .bind(params.website)
    .bind(params.description)
    .bind(params.status)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM companies WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
