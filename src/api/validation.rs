use std::path::Path;

use crate::api::errors::ApiError;

pub(crate) const OTP_CODE_LEN: usize = 4;

/// Iranian mobile numbers: `09` followed by nine more digits.
pub(crate) fn validate_phone(phone: &str) -> Result<(), ApiError> {
    let valid =
        phone.len() == 11 && phone.starts_with("09") && phone.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid phone number format".to_string()))
    }
}

pub(crate) fn validate_code_len(code: &str) -> Result<(), ApiError> {
    if code.len() == OTP_CODE_LEN && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Code must be exactly {OTP_CODE_LEN} digits")))
    }
}

pub(crate) fn validate_image_upload(
    filename: &str,
    content_type: &str,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    let Some(extension) = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    else {
        return Err(ApiError::BadRequest("Uploaded file has no extension".to_string()));
    };

    if !allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(ApiError::BadRequest(format!("Extension '{extension}' is not allowed")));
    }

    let mime = content_type.trim().to_ascii_lowercase();
    let matches = mimes_for_extension(&extension).contains(&mime.as_str());
    if matches {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Content type '{mime}' does not match extension '.{extension}'"
        )))
    }
}

fn mimes_for_extension(extension: &str) -> &'static [&'static str] {
    match extension {
        "jpg" | "jpeg" => &["image/jpeg", "image/jpg"],
        "png" => &["image/png"],
        "webp" => &["image/webp"],
        "gif" => &["image/gif"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_iranian_mobile_format() {
        assert!(validate_phone("09123456789").is_ok());
        assert!(validate_phone("09987654321").is_ok());
    }

    #[test]
    fn phone_rejects_wrong_shape() {
        assert!(validate_phone("0912345678").is_err());
        assert!(validate_phone("091234567890").is_err());
        assert!(validate_phone("08123456789").is_err());
        assert!(validate_phone("0912345678a").is_err());
        assert!(validate_phone("+9891234567").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn code_must_be_four_digits() {
        assert!(validate_code_len("0042").is_ok());
        assert!(validate_code_len("123").is_err());
        assert!(validate_code_len("12345").is_err());
        assert!(validate_code_len("12a4").is_err());
    }

    #[test]
    fn image_upload_checks_extension_and_mime() {
        let allowed = vec!["jpg".to_string(), "png".to_string()];
        assert!(validate_image_upload("avatar.jpg", "image/jpeg", &allowed).is_ok());
        assert!(validate_image_upload("avatar.PNG", "image/png", &allowed).is_ok());
        assert!(validate_image_upload("avatar.webp", "image/webp", &allowed).is_err());
        assert!(validate_image_upload("avatar.png", "image/jpeg", &allowed).is_err());
        assert!(validate_image_upload("avatar", "image/png", &allowed).is_err());
    }
}
