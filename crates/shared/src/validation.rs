//! Common validation utilities.

use validator::ValidationError;

/// Validates that the minimum member count does not exceed the maximum.
pub fn validate_member_range(min: i32, max: i32) -> Result<(), ValidationError> {
    if min <= max {
        Ok(())
    } else {
        let mut err = ValidationError::new("member_count_order");
        err.message = Some("Minimum member count cannot exceed maximum member count".into());
        Err(err)
    }
}

/// Validates that an image reference is an absolute http(s) URL.
///
/// Images live in object storage; the backend only stores the URL the
/// client received from the upload step.
pub fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("image_url_scheme");
        err.message = Some("Image URL must be an http(s) URL".into());
        Err(err)
    }
}

/// Validates that a name is not blank once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_member_range() {
        assert!(validate_member_range(2, 10).is_ok());
        assert!(validate_member_range(5, 5).is_ok());

        let err = validate_member_range(10, 2).unwrap_err();
        assert_eq!(err.code, "member_count_order");
    }

    #[test]
    fn test_validate_image_url() {
        assert!(validate_image_url("https://cdn.example.com/a.png").is_ok());
        assert!(validate_image_url("http://localhost/a.png").is_ok());
        assert!(validate_image_url("ftp://example.com/a.png").is_err());
        assert!(validate_image_url("a.png").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Kim").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
