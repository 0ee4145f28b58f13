use crate::domain::model::{parse_publications, PublicationRecord};
use crate::domain::ports::{CredentialStore, PublicationSource};
use crate::utils::error::{Result, TrendError};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const REFRESH_TOKEN_PATH: &str = "/api/auth/refresh-token";
pub const USER_PUBLICATIONS_PATH: &str = "/api/user/getPublications";
pub const ADMIN_PUBLICATIONS_PATH: &str = "/api/admin/publications";
pub const ALL_PUBLICATIONS_REPORT_PATH: &str = "/api/admin/generateAllPublicationsReport";
pub const USER_REPORT_PATH: &str = "/api/admin/generateUserReport";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Bearer-token client for the publication backend.
///
/// A request rejected with 401 triggers exactly one token refresh and one
/// retry. If the refresh itself is rejected the session is cleared.
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn CredentialStore>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            session,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn CredentialStore> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: &Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<Response> {
        tracing::debug!("{} {}", method, endpoint);
        let mut request = self
            .client
            .request(method.clone(), endpoint)
            .query(query)
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        tracing::debug!("Response status: {}", response.status());
        Ok(response)
    }

    /// Sends a bearer-authenticated request, refreshing the token once on 401.
    pub async fn authenticated_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let endpoint = self.endpoint(path);
        let token = self
            .session
            .access_token()
            .ok_or_else(|| TrendError::unauthenticated("no access token in session"))?;

        let response = self.send(&method, &endpoint, query, body, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response, &endpoint);
        }

        tracing::warn!("Unauthorized. Attempting token refresh...");
        let token = self.refresh_access_token().await?;

        let response = self.send(&method, &endpoint, query, body, &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(TrendError::unauthenticated(
                "request still rejected after refreshing the access token",
            ));
        }
        check_status(response, &endpoint)
    }

    pub async fn authenticated_get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.authenticated_request(Method::GET, path, query, None).await
    }

    /// Exchanges the refresh token for a new access token and stores it.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.session.clear()?;
            return Err(TrendError::unauthenticated("no refresh token in session"));
        };

        let response = self
            .client
            .post(self.endpoint(REFRESH_TOKEN_PATH))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::error!("Token refresh failed with status {}", response.status());
            self.session.clear()?;
            return Err(TrendError::unauthenticated(format!(
                "token refresh rejected with status {}",
                response.status().as_u16()
            )));
        }

        let RefreshResponse { access_token } = response.json().await?;
        self.session.set_access_token(access_token.clone())?;
        tracing::info!("Access token refreshed");
        Ok(access_token)
    }

    pub async fn fetch_user_publications(&self, iin: Option<&str>) -> Result<Vec<PublicationRecord>> {
        let query: Vec<(&str, &str)> = iin.map(|iin| ("iin", iin)).into_iter().collect();
        let response = self.authenticated_get(USER_PUBLICATIONS_PATH, &query).await?;
        Ok(parse_publications(response.json().await?)?)
    }

    pub async fn fetch_all_publications(&self) -> Result<Vec<PublicationRecord>> {
        let response = self.authenticated_get(ADMIN_PUBLICATIONS_PATH, &[]).await?;
        Ok(parse_publications(response.json().await?)?)
    }

    /// Asks the backend to render a DOCX publication report and saves it under
    /// `out_dir`. A user report needs an explicit IIN.
    pub async fn download_report(&self, scope: &Scope, out_dir: &Path) -> Result<PathBuf> {
        let (path, body, file_name) = match scope {
            Scope::Admin => (
                ALL_PUBLICATIONS_REPORT_PATH,
                None,
                "all_publications_report.docx".to_string(),
            ),
            Scope::User(Some(iin)) => (
                USER_REPORT_PATH,
                Some(json!({ "iin": iin })),
                format!("{}_report.docx", iin),
            ),
            Scope::User(None) => {
                return Err(TrendError::MissingConfigError {
                    field: "iin (required for a user report)".to_string(),
                })
            }
        };

        let response = self
            .authenticated_request(Method::POST, path, &[], body.as_ref())
            .await?;
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(out_dir).await?;
        let target = out_dir.join(file_name);
        tokio::fs::write(&target, &bytes).await?;
        tracing::info!("Saved report ({} bytes) to {}", bytes.len(), target.display());
        Ok(target)
    }
}

fn check_status(response: Response, endpoint: &str) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(TrendError::HttpStatus {
            status: response.status().as_u16(),
            endpoint: endpoint.to_string(),
        })
    }
}

/// Whose publications to pull from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The logged-in user, or another user by IIN when given.
    User(Option<String>),
    /// Every publication in the system (admin token required).
    Admin,
}

pub struct ApiPublicationSource {
    client: ApiClient,
    scope: Scope,
}

impl ApiPublicationSource {
    pub fn new(client: ApiClient, scope: Scope) -> Self {
        Self { client, scope }
    }
}

#[async_trait]
impl PublicationSource for ApiPublicationSource {
    async fn fetch_publications(&self) -> Result<Vec<PublicationRecord>> {
        match &self.scope {
            Scope::User(iin) => self.client.fetch_user_publications(iin.as_deref()).await,
            Scope::Admin => self.client.fetch_all_publications().await,
        }
    }
}
