use crate::domain::model::{Authors, PublicationRecord, YearValue};
use crate::utils::error::{Result, TrendError};
use reqwest::Client;
use serde::Deserialize;

pub const CROSSREF_API_BASE: &str = "https://api.crossref.org";

const SEARCH_ROWS: &str = "20";
const SEARCH_FIELDS: &str = "DOI,title,author,published-print,published-online,created,type,container-title,is-referenced-by-count";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateParts {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Option<i64>>>,
}

impl DateParts {
    fn year(&self) -> Option<i64> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossrefAuthor {
    pub given: Option<String>,
    pub family: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossrefWork {
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    #[serde(default)]
    pub author: Vec<CrossrefAuthor>,
    pub published_print: Option<DateParts>,
    pub published_online: Option<DateParts>,
    pub created: Option<DateParts>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    #[serde(default)]
    pub container_title: Vec<String>,
    pub is_referenced_by_count: Option<u64>,
}

impl CrossrefWork {
    /// Print date wins over online date, which wins over record creation.
    pub fn year(&self) -> Option<i64> {
        [&self.published_print, &self.published_online, &self.created]
            .into_iter()
            .flatten()
            .find_map(DateParts::year)
    }

    pub fn to_record(&self) -> PublicationRecord {
        let authors = self
            .author
            .iter()
            .map(|a| {
                format!(
                    "{} {}",
                    a.given.as_deref().unwrap_or_default(),
                    a.family.as_deref().unwrap_or_default()
                )
                .trim()
                .to_string()
            })
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        PublicationRecord {
            year: self.year().map(YearValue::Integer),
            title: Some(self.title.first().cloned().unwrap_or_default()),
            authors: (!authors.is_empty()).then_some(Authors::Joined(authors)),
            publication_type: Some(map_publication_type(self.work_type.as_deref()).to_string()),
            doi: self.doi.clone(),
            journal: Some(self.container_title.first().cloned().unwrap_or_default()),
            citations: Some(self.is_referenced_by_count.unwrap_or(0)),
            extra: serde_json::Map::new(),
        }
    }
}

/// Maps a Crossref work type onto the backend's publication categories.
pub fn map_publication_type(crossref_type: Option<&str>) -> &'static str {
    match crossref_type {
        Some("proceedings-article") => "conference",
        Some("book") | Some("book-chapter") => "books",
        Some(other) => {
            tracing::debug!("Mapping Crossref type '{}' to articles", other);
            "articles"
        }
        None => {
            tracing::warn!("No publication type provided");
            "articles"
        }
    }
}

/// Loose DOI detection used to pick between DOI filter and author search.
pub fn looks_like_doi(query: &str) -> bool {
    query.contains('/') || query.contains("10.")
}

#[derive(Deserialize)]
struct WorkEnvelope {
    message: CrossrefWork,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    message: SearchMessage,
}

#[derive(Deserialize)]
struct SearchMessage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

pub struct CrossrefClient {
    base_url: String,
    client: Client,
}

impl CrossrefClient {
    /// Client against the public Crossref API.
    pub fn with_mailto(mailto: &str) -> Result<Self> {
        Self::new(CROSSREF_API_BASE, mailto)
    }

    pub fn new(base_url: impl Into<String>, mailto: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("pubtrend (mailto:{})", mailto))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn work_by_doi(&self, doi: &str) -> Result<PublicationRecord> {
        let encoded: String = url::form_urlencoded::byte_serialize(doi.as_bytes()).collect();
        let endpoint = format!("{}/works/{}", self.base_url, encoded);
        tracing::debug!("Fetching Crossref work {}", endpoint);

        let response = self.client.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(TrendError::HttpStatus {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let envelope: WorkEnvelope = response.json().await?;
        Ok(envelope.message.to_record())
    }

    /// Searches by DOI when the query looks like one, by author name otherwise.
    /// Items that fail to decode are dropped.
    pub async fn search(&self, query: &str) -> Result<Vec<PublicationRecord>> {
        let endpoint = format!("{}/works", self.base_url);
        let doi_filter = format!("doi:{}", query);
        let criterion = if looks_like_doi(query) {
            ("filter", doi_filter.as_str())
        } else {
            ("query.author", query)
        };

        let response = self
            .client
            .get(&endpoint)
            .query(&[criterion, ("rows", SEARCH_ROWS), ("select", SEARCH_FIELDS)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TrendError::HttpStatus {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let envelope: SearchEnvelope = response.json().await?;
        let records = envelope
            .message
            .items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<CrossrefWork>(item) {
                Ok(work) => Some(work.to_record()),
                Err(e) => {
                    tracing::warn!("Skipping malformed Crossref item: {}", e);
                    None
                }
            })
            .collect();
        Ok(records)
    }
}
