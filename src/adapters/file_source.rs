use crate::domain::model::{parse_publications, PublicationRecord};
use crate::domain::ports::PublicationSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads a JSON array of publication records from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PublicationSource for JsonFileSource {
    async fn fetch_publications(&self) -> Result<Vec<PublicationRecord>> {
        tracing::debug!("Reading publications from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        let value: serde_json::Value = serde_json::from_slice(&data)?;
        Ok(parse_publications(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TrendError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_publication_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pubs.json");
        std::fs::write(
            &path,
            r#"[{"title": "A", "year": "2021"}, {"title": "B", "year": 2022}]"#,
        )
        .unwrap();

        let records = JsonFileSource::new(&path).fetch_publications().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parsed_year(), Some(2021));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = JsonFileSource::new(dir.path().join("absent.json"))
            .fetch_publications()
            .await;
        assert!(matches!(result, Err(TrendError::IoError(_))));
    }

    #[tokio::test]
    async fn test_non_array_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pubs.json");
        std::fs::write(&path, r#"{"year": 2021}"#).unwrap();

        let result = JsonFileSource::new(&path).fetch_publications().await;
        assert!(matches!(result, Err(TrendError::SerializationError(_))));
    }
}
