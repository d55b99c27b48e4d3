use serde::{Deserialize, Serialize};

use crate::schemas::user::UserResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct SendOtpRequest {
    pub(crate) phone: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendOtpResponse {
    pub(crate) message: String,
    pub(crate) expires_at: String,
    pub(crate) is_registered: bool,
    /// Echoed outside production only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyOtpRequest {
    pub(crate) phone: String,
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}
