use crate::adapters::api::Scope;
use crate::config::toml_config::TomlConfig;
use crate::config::{LogFormat, OutputFormat, Settings, SourceSettings};
use crate::utils::error::{Result, TrendError};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pubtrend")]
#[command(about = "Forecast next year's publication count and activity trend")]
pub struct CliConfig {
    /// JSON file holding an array of publication records
    #[arg(long, conflicts_with = "api_url")]
    pub input: Option<String>,

    /// Base URL of the publication backend
    #[arg(long, env = "PUBTREND_API_URL")]
    pub api_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Analyze another user's publications by IIN
    #[arg(long)]
    pub iin: Option<String>,

    /// Analyze every publication in the system (admin token required)
    #[arg(long, conflicts_with = "iin")]
    pub admin: bool,

    /// File where access and refresh tokens are kept between runs
    #[arg(long)]
    pub session_file: Option<String>,

    #[arg(long, env = "PUBTREND_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "PUBTREND_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Treat this as the current year instead of the system clock
    #[arg(long)]
    pub current_year: Option<i32>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Also download the DOCX publication report into this directory
    #[arg(long, value_name = "DIR")]
    pub report: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input {
            validation::validate_path("input", input)?;
        }
        if let Some(url) = &self.api_url {
            validation::validate_url("api_url", url)?;
        }
        if let Some(iin) = &self.iin {
            validation::validate_non_empty_string("iin", iin)?;
        }
        if let Some(path) = &self.session_file {
            validation::validate_path("session_file", path)?;
        }
        if let Some(year) = self.current_year {
            validation::validate_report_year("current_year", year)?;
        }
        if let Some(dir) = &self.report {
            validation::validate_path("report", dir)?;
        }
        Ok(())
    }
}

impl CliConfig {
    /// Loads the config file named by `--config`, if any.
    pub fn load_toml(&self) -> Result<Option<TomlConfig>> {
        let Some(path) = &self.config else {
            return Ok(None);
        };
        let config = TomlConfig::from_file(path)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Command line values win over the config file.
    pub fn resolve(&self, toml: Option<&TomlConfig>) -> Result<Settings> {
        let source = if let Some(input) = &self.input {
            SourceSettings::File(PathBuf::from(input))
        } else {
            let base_url = self
                .api_url
                .clone()
                .or_else(|| toml.and_then(|t| t.base_url()).map(str::to_string))
                .ok_or_else(|| TrendError::MissingConfigError {
                    field: "--input or --api-url (api.base_url)".to_string(),
                })?;
            let api = toml.and_then(|t| t.api.as_ref());

            let scope = if self.admin || (self.iin.is_none() && api.and_then(|a| a.admin) == Some(true)) {
                Scope::Admin
            } else {
                Scope::User(self.iin.clone().or_else(|| api.and_then(|a| a.iin.clone())))
            };

            SourceSettings::Api {
                base_url,
                timeout: Duration::from_secs(toml.map(TomlConfig::timeout_seconds).unwrap_or(
                    crate::config::toml_config::DEFAULT_TIMEOUT_SECONDS,
                )),
                scope,
            }
        };

        if self.report.is_some() && matches!(source, SourceSettings::File(_)) {
            return Err(TrendError::ConfigError {
                message: "--report needs the backend; use --api-url instead of --input".to_string(),
            });
        }

        Ok(Settings {
            source,
            session_file: self
                .session_file
                .clone()
                .or_else(|| toml.and_then(|t| t.session_file()).map(str::to_string))
                .map(PathBuf::from),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            current_year: self.current_year.or_else(|| toml.and_then(TomlConfig::current_year)),
            format: self
                .format
                .or_else(|| toml.and_then(TomlConfig::output_format))
                .unwrap_or_default(),
            report_dir: self.report.as_ref().map(PathBuf::from),
        })
    }
}
