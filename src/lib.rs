pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::api::{ApiClient, ApiPublicationSource, Scope};
pub use adapters::file_source::JsonFileSource;
pub use adapters::session::{FileSession, InMemorySession};
pub use crate::core::{analyzer::PublicationTrendAnalyzer, engine::TrendEngine};
pub use domain::model::{PublicationRecord, Trend, TrendReport, TrendResult, YearValue};
pub use utils::error::{Result, TrendError};
