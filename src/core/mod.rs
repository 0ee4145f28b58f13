pub mod analyzer;
pub mod engine;

pub use crate::domain::model::{PublicationRecord, Trend, TrendReport, TrendResult, YearBuckets};
pub use crate::domain::ports::{CredentialStore, PublicationSource};
pub use crate::utils::error::Result;
