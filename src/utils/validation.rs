use crate::utils::error::{Result, TrendError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Earliest year accepted as a report anchor.
pub const MIN_REPORT_YEAR: i32 = 1900;
/// Latest year accepted as a report anchor.
pub const MAX_REPORT_YEAR: i32 = 2200;

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TrendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TrendError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TrendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TrendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TrendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TrendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_report_year(field_name: &str, year: i32) -> Result<()> {
    validate_range(field_name, year, MIN_REPORT_YEAR, MAX_REPORT_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://science.example.edu").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:5000").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("session.file", "./session.json").is_ok());
        assert!(validate_path("session.file", "").is_err());
        assert!(validate_path("session.file", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_report_year() {
        assert!(validate_report_year("analysis.current_year", 2024).is_ok());
        assert!(validate_report_year("analysis.current_year", 1899).is_err());
        assert!(validate_report_year("analysis.current_year", 3000).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("iin", "990101300123").is_ok());
        assert!(validate_non_empty_string("iin", "   ").is_err());
    }
}
