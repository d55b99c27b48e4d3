use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::core::time::DATE_FORMAT;

pub(crate) mod assignment;
pub(crate) mod auth;
pub(crate) mod company;
pub(crate) mod exam;
pub(crate) mod exam_set;
pub(crate) mod manager;
pub(crate) mod question;
pub(crate) mod result;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

pub(crate) fn deserialize_option_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => {
            Date::parse(value.trim(), &DATE_FORMAT).map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_option_date")]
        date: Option<Date>,
    }

    #[test]
    fn option_date_parses_iso() {
        let holder: Holder = serde_json::from_str(r#"{"date": "2026-08-27"}"#).unwrap();
        let date = holder.date.unwrap();
        assert_eq!(date.year(), 2026);
        assert_eq!(u8::from(date.month()), 8);
        assert_eq!(date.day(), 27);
    }

    #[test]
    fn option_date_treats_blank_as_none() {
        let holder: Holder = serde_json::from_str(r#"{"date": " "}"#).unwrap();
        assert!(holder.date.is_none());

        let holder: Holder = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert!(holder.date.is_none());
    }

    #[test]
    fn option_date_rejects_garbage() {
        let result = serde_json::from_str::<Holder>(r#"{"date": "27/08/2026"}"#);
        assert!(result.is_err());
    }
}
