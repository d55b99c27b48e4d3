use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Company;
use crate::db::types::CompanyStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CompanyCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    #[serde(alias = "legalName")]
    pub(crate) legal_name: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) address: Option<String>,
    #[serde(default)]
    #[serde(alias = "nationalId")]
    pub(crate) national_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "economicCode")]
    pub(crate) economic_code: Option<String>,
    #[serde(default)]
    #[serde(alias = "fieldOfActivity")]
    pub(crate) field_of_activity: Option<String>,
    #[serde(default)]
    pub(crate) logo: Option<String>,
    #[serde(default)]
    pub(crate) website: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CompanyUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[serde(alias = "legalName")]
    pub(crate) legal_name: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) address: Option<String>,
    #[serde(default)]
    #[serde(alias = "nationalId")]
    pub(crate) national_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "economicCode")]
    pub(crate) economic_code: Option<String>,
    #[serde(default)]
    #[serde(alias = "fieldOfActivity")]
    pub(crate) field_of_activity: Option<String>,
    #[serde(default)]
    pub(crate) logo: Option<String>,
    #[serde(default)]
    pub(crate) website: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<CompanyStatus>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompanyResponse {
    pub(crate) id: String,
    pub(crate) name: String,
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
    pub(crate) owner_id: String,
    pub(crate) status: CompanyStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CompanyResponse {
    pub(crate) fn from_db(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            legal_name: company.legal_name,
            phone: company.phone,
            email: company.email,
            address: company.address,
            national_id: company.national_id,
            economic_code: company.economic_code,
            field_of_activity: company.field_of_activity,
            logo: company.logo,
            website: company.website,
            description: company.description,
            owner_id: company.owner_id,
            status: company.status,
            created_at: format_primitive(company.created_at),
            updated_at: format_primitive(company.updated_at),
        }
    }
}
