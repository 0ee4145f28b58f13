use crate::config::OutputFormat;
use crate::utils::error::{Result, TrendError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub session: Option<SessionConfig>,
    #[serde(default)]
    pub analysis: Option<AnalysisConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub iin: Option<String>,
    pub admin: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub current_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

impl TomlConfig {
    /// Loads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrendError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrendError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrendError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(api) = &self.api {
            validation::validate_url("api.base_url", &api.base_url)?;
            if let Some(timeout) = api.timeout_seconds {
                validation::validate_range("api.timeout_seconds", timeout, 1, 600)?;
            }
            if let Some(iin) = &api.iin {
                validation::validate_non_empty_string("api.iin", iin)?;
            }
        }

        if let Some(session) = &self.session {
            validation::validate_path("session.file", &session.file)?;
        }

        if let Some(year) = self.analysis.as_ref().and_then(|a| a.current_year) {
            validation::validate_report_year("analysis.current_year", year)?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.api.as_ref().map(|api| api.base_url.as_str())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.api
            .as_ref()
            .and_then(|api| api.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn session_file(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.file.as_str())
    }

    pub fn current_year(&self) -> Option<i32> {
        self.analysis.as_ref().and_then(|a| a.current_year)
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output.as_ref().and_then(|o| o.format)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "https://science.example.edu"
timeout_seconds = 10
iin = "990101300123"

[session]
file = "./session.json"

[analysis]
current_year = 2024

[output]
format = "json"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), Some("https://science.example.edu"));
        assert_eq!(config.timeout_seconds(), 10);
        assert_eq!(config.session_file(), Some("./session.json"));
        assert_eq!(config.current_year(), Some(2024));
        assert_eq!(config.output_format(), Some(OutputFormat::Json));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), None);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.output_format(), None);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("PUBTREND_TEST_BASE_URL", "http://localhost:5000");
        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "${PUBTREND_TEST_BASE_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), Some("http://localhost:5000"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "ftp://science.example.edu"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[analysis]
current_year = 1200
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(TrendError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let result = TomlConfig::from_toml_str("[api\nbase_url = ");
        assert!(matches!(
            result,
            Err(TrendError::ConfigValidationError { .. })
        ));
    }
}
