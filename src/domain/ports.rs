use crate::domain::model::PublicationRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Anything that can hand over a list of publication records.
#[async_trait]
pub trait PublicationSource: Send + Sync {
    async fn fetch_publications(&self) -> Result<Vec<PublicationRecord>>;
}

/// Session credentials injected into the network layer.
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn set_access_token(&self, token: String) -> Result<()>;
    fn clear(&self) -> Result<()>;
}
