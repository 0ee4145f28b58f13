use anyhow::Result;
use httpmock::prelude::*;
use pubtrend::adapters::crossref::CrossrefClient;
use pubtrend::domain::model::Authors;
use pubtrend::{PublicationTrendAnalyzer, TrendError};
use serde_json::json;

#[tokio::test]
async fn test_work_by_doi_maps_message() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("/works/10.1000")
            .header("User-Agent", "pubtrend (mailto:science@example.edu)");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "status": "ok",
                "message": {
                    "DOI": "10.1000/xyz123",
                    "title": ["Soil Salinity in the Aral Basin"],
                    "author": [{"given": "Dana", "family": "Sultanova"}],
                    "published-print": {"date-parts": [[2022, 3]]},
                    "type": "journal-article",
                    "container-title": ["Journal of Arid Environments"],
                    "is-referenced-by-count": 12
                }
            }));
    });

    let client = CrossrefClient::new(server.base_url(), "science@example.edu")?;
    let record = client.work_by_doi("10.1000/xyz123").await?;

    api_mock.assert();
    assert_eq!(record.doi.as_deref(), Some("10.1000/xyz123"));
    assert_eq!(record.parsed_year(), Some(2022));
    assert_eq!(record.publication_type.as_deref(), Some("articles"));
    assert_eq!(record.authors, Some(Authors::Joined("Dana Sultanova".to_string())));
    assert_eq!(record.citations, Some(12));
    Ok(())
}

#[tokio::test]
async fn test_unknown_doi_is_http_status_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("/works/");
        then.status(404).body("Resource not found.");
    });

    let client = CrossrefClient::new(server.base_url(), "science@example.edu")?;
    let result = client.work_by_doi("10.9999/missing").await;

    assert!(matches!(result, Err(TrendError::HttpStatus { status: 404, .. })));
    Ok(())
}

#[tokio::test]
async fn test_author_search_feeds_analyzer() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/works")
            .query_param("query.author", "Sultanova")
            .query_param("rows", "20");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "message": {
                    "items": [
                        {"title": ["A"], "published-print": {"date-parts": [[2021]]}, "type": "book"},
                        {"title": ["B"], "published-online": {"date-parts": [[2022, 1]]}},
                        {"title": ["C"], "created": {"date-parts": [[2022, 6, 1]]}},
                        {"title": "not a list"}
                    ]
                }
            }));
    });

    let client = CrossrefClient::new(server.base_url(), "science@example.edu")?;
    let records = client.search("Sultanova").await?;

    api_mock.assert();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].publication_type.as_deref(), Some("books"));

    let trend = PublicationTrendAnalyzer::with_current_year(2024).analyze_trend(&records);
    assert_eq!(trend.growth, 1.0);
    Ok(())
}

#[tokio::test]
async fn test_doi_like_query_uses_filter() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/works")
            .query_param("filter", "doi:10.1000/xyz123");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"message": {"items": []}}));
    });

    let client = CrossrefClient::new(server.base_url(), "science@example.edu")?;
    let records = client.search("10.1000/xyz123").await?;

    api_mock.assert();
    assert!(records.is_empty());
    Ok(())
}
