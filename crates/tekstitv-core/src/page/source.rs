use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::models::{PageId, PageResponse};
use crate::config::AppConfig;
use crate::error::{PageError, PageErrorKind};
use crate::{Error, Result};

/// Remote source of teletext pages.
///
/// The cache and controller only see this trait, so tests run against
/// in-memory sources with controlled timing.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page/subpage combination.
    ///
    /// Fails with `NotFound` when the combination does not exist,
    /// `Network` on transport failures and `Unknown` for everything else.
    async fn fetch(&self, page: PageId, sub_page: u16) -> std::result::Result<PageResponse, PageError>;
}

/// Wire format of the teletext API.
///
/// Numeric fields arrive as strings ("subPageCount": "3"), matching what
/// the upstream service actually serves.
#[derive(Debug, Deserialize)]
struct PageEnvelope {
    page: WirePage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePage {
    number: String,
    #[serde(default)]
    sub_page_count: Option<String>,
    #[serde(default)]
    prev_page: Option<String>,
    #[serde(default)]
    next_page: Option<String>,
    #[serde(default)]
    content: Vec<String>,
}

/// HTTP page source backed by reqwest
pub struct HttpPageSource {
    client: Client,
    base_url: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl HttpPageSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.source.request_timeout_secs))
            .gzip(true)
            .build()
            .map_err(Error::Http)?;

        // Fail early on an unusable base URL instead of per request
        Url::parse(&config.source.base_url)?;

        Ok(Self {
            client,
            base_url: config.source.base_url.clone(),
            app_id: config.source.app_id.clone(),
            app_key: config.source.app_key.clone(),
        })
    }

    /// Build the request URL for a page/subpage pair
    fn endpoint(&self, page: PageId, sub_page: u16) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/pages/{}.json", base, page))?;

        {
            let mut query = url.query_pairs_mut();
            if sub_page > 1 {
                query.append_pair("subpage", &sub_page.to_string());
            }
            if let Some(ref id) = self.app_id {
                query.append_pair("app_id", id);
            }
            if let Some(ref key) = self.app_key {
                query.append_pair("app_key", key);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, page: PageId, sub_page: u16) -> std::result::Result<PageResponse, PageError> {
        let url = match self.endpoint(page, sub_page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to build page URL for {}: {}", page, e);
                return Err(PageError::new(PageErrorKind::Unknown, page));
            }
        };

        tracing::debug!("Fetching page {} subpage {} from {}", page, sub_page, url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Transport failure fetching page {}: {}", page, e);
                return Err(PageError::new(PageErrorKind::Network, page));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Page {}/{} does not exist", page, sub_page);
            return Err(PageError::new(PageErrorKind::NotFound, page));
        }
        if !status.is_success() {
            tracing::warn!("Unexpected HTTP {} for page {}", status, page);
            return Err(PageError::new(PageErrorKind::Unknown, page));
        }

        let envelope: PageEnvelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Malformed page body for {}: {}", page, e);
                return Err(PageError::new(PageErrorKind::Unknown, page));
            }
        };

        parse_wire_page(envelope, page)
    }
}

/// Convert the wire shape to the engine model, validating page numbers
fn parse_wire_page(
    envelope: PageEnvelope,
    requested: PageId,
) -> std::result::Result<PageResponse, PageError> {
    let wire = envelope.page;

    let page = PageId::parse(&wire.number)
        .ok_or_else(|| PageError::new(PageErrorKind::Unknown, requested))?;

    let sub_page_count = wire
        .sub_page_count
        .as_deref()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(1)
        .max(1);

    Ok(PageResponse {
        page,
        sub_page_count,
        // Out-of-range neighbors are dropped rather than failing the page
        prev_page: wire.prev_page.as_deref().and_then(PageId::parse),
        next_page: wire.next_page.as_deref().and_then(PageId::parse),
        lines: wire.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u16) -> PageId {
        PageId::new(n).unwrap()
    }

    #[test]
    fn test_parse_wire_page() {
        let envelope: PageEnvelope = serde_json::from_str(
            r#"{
                "page": {
                    "number": "201",
                    "subPageCount": "4",
                    "prevPage": "200",
                    "nextPage": "202",
                    "content": ["TEKSTI-TV 201", "  Urheilu  "]
                }
            }"#,
        )
        .unwrap();

        let response = parse_wire_page(envelope, page(201)).unwrap();
        assert_eq!(response.page, page(201));
        assert_eq!(response.sub_page_count, 4);
        assert_eq!(response.prev_page, Some(page(200)));
        assert_eq!(response.next_page, Some(page(202)));
        assert_eq!(response.lines.len(), 2);
    }

    #[test]
    fn test_parse_wire_page_missing_fields() {
        let envelope: PageEnvelope =
            serde_json::from_str(r#"{"page": {"number": "100"}}"#).unwrap();

        let response = parse_wire_page(envelope, page(100)).unwrap();
        assert_eq!(response.sub_page_count, 1);
        assert_eq!(response.prev_page, None);
        assert_eq!(response.next_page, None);
        assert!(response.lines.is_empty());
    }

    #[test]
    fn test_parse_wire_page_invalid_neighbors_dropped() {
        let envelope: PageEnvelope = serde_json::from_str(
            r#"{"page": {"number": "100", "prevPage": "099", "nextPage": "abc"}}"#,
        )
        .unwrap();

        let response = parse_wire_page(envelope, page(100)).unwrap();
        assert_eq!(response.prev_page, None);
        assert_eq!(response.next_page, None);
    }

    #[test]
    fn test_endpoint_url() {
        let mut config = AppConfig::default();
        config.source.base_url = "http://localhost:8080/teletext/".to_string();
        config.source.app_id = Some("id".to_string());
        config.source.app_key = Some("key".to_string());

        let source = HttpPageSource::new(&config).unwrap();
        let url = source.endpoint(page(100), 2).unwrap();

        assert_eq!(url.path(), "/teletext/pages/100.json");
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("subpage".to_string(), "2".to_string())));
        assert!(query.contains(&("app_id".to_string(), "id".to_string())));
        assert!(query.contains(&("app_key".to_string(), "key".to_string())));

        // First subpage is the default, no query parameter
        let url = source.endpoint(page(100), 1).unwrap();
        assert!(!url.query().unwrap_or("").contains("subpage"));
    }
}
