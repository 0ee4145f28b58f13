#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::api::Scope;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where the publication list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSettings {
    File(PathBuf),
    Api {
        base_url: String,
        timeout: Duration,
        scope: Scope,
    },
}

/// Effective run settings after merging the command line over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: SourceSettings,
    pub session_file: Option<PathBuf>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub current_year: Option<i32>,
    pub format: OutputFormat,
    /// Directory for the backend-rendered DOCX report, when one is requested.
    pub report_dir: Option<PathBuf>,
}
