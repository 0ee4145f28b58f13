use crate::domain::ports::CredentialStore;
use crate::utils::error::{Result, TrendError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn poisoned() -> TrendError {
    TrendError::ConfigError {
        message: "session state lock poisoned".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct InMemorySession {
    tokens: RwLock<SessionTokens>,
}

impl InMemorySession {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            tokens: RwLock::new(SessionTokens {
                access_token,
                refresh_token,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionTokens {
        self.tokens.read().map(|t| t.clone()).unwrap_or_default()
    }
}

impl CredentialStore for InMemorySession {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().ok()?.access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().ok()?.refresh_token.clone()
    }

    fn set_access_token(&self, token: String) -> Result<()> {
        self.tokens.write().map_err(|_| poisoned())?.access_token = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.tokens.write().map_err(|_| poisoned())? = SessionTokens::default();
        Ok(())
    }
}

/// Tokens persisted as a small JSON document so they survive between runs.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    tokens: RwLock<SessionTokens>,
}

impl FileSession {
    /// Opens the session file, starting empty if it does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tokens = if path.exists() {
            let data = fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            tracing::debug!("No session file at {}, starting empty", path.display());
            SessionTokens::default()
        };

        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    /// Overrides stored tokens with any provided explicitly and persists them.
    pub fn merge(&self, access_token: Option<String>, refresh_token: Option<String>) -> Result<()> {
        let mut tokens = self.tokens.write().map_err(|_| poisoned())?;
        if access_token.is_some() {
            tokens.access_token = access_token;
        }
        if refresh_token.is_some() {
            tokens.refresh_token = refresh_token;
        }
        self.persist(&tokens)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &SessionTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(tokens)?)?;
        Ok(())
    }
}

impl CredentialStore for FileSession {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().ok()?.access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().ok()?.refresh_token.clone()
    }

    fn set_access_token(&self, token: String) -> Result<()> {
        let mut tokens = self.tokens.write().map_err(|_| poisoned())?;
        tokens.access_token = Some(token);
        self.persist(&tokens)
    }

    fn clear(&self) -> Result<()> {
        let mut tokens = self.tokens.write().map_err(|_| poisoned())?;
        *tokens = SessionTokens::default();
        self.persist(&tokens)
    }
}
