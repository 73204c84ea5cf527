//! Google Books source implementation.

use async_trait::async_trait;

use crate::config::{ApiConfig, Config};
use crate::models::{BookRecord, SearchQuery};
use crate::sources::{parser, BookSource, MalformedItemPolicy, SearchError};
use crate::utils::{default_user_agent, FetchError, HttpClient};

/// Google Books source
///
/// Uses the public volumes endpoint; no API key is needed. The source holds no
/// per-search state and can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: HttpClient,
    api: ApiConfig,
    policy: MalformedItemPolicy,
}

impl GoogleBooksSource {
    /// Create a source with the default endpoint, timeouts and parsing policy
    pub fn new() -> Result<Self, FetchError> {
        Self::from_config(&Config::default())
    }

    /// Create a source from application configuration
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let user_agent = config
            .http
            .user_agent
            .as_deref()
            .unwrap_or(default_user_agent());
        let client = HttpClient::with_timeouts(
            user_agent,
            config.http.connect_timeout(),
            config.http.read_timeout(),
        )?;

        Ok(Self::with_client(
            client,
            config.api.clone(),
            config.search.malformed_items,
        ))
    }

    /// Create a source around an existing client
    pub fn with_client(client: HttpClient, api: ApiConfig, policy: MalformedItemPolicy) -> Self {
        Self {
            client,
            api,
            policy,
        }
    }

    /// Build the request URL for a query, substituting the default term for blank input
    pub fn build_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?maxResults={}&orderBy={}&q={}",
            self.api.base_url,
            self.api.max_results,
            urlencoding::encode(&self.api.order_by),
            urlencoding::encode(query.term_or(&self.api.default_term))
        )
    }
}

#[async_trait]
impl BookSource for GoogleBooksSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<BookRecord>, SearchError> {
        let url = self.build_url(query);

        let body = self.client.fetch(&url).await.map_err(|e| {
            tracing::warn!("Problem making the HTTP request: {}", e);
            SearchError::Network(e)
        })?;

        let text = String::from_utf8_lossy(&body);
        let books = parser::try_parse(Some(&text), self.policy).map_err(|e| {
            tracing::warn!("Problem parsing the volumes JSON: {}", e);
            SearchError::NoData(e)
        })?;

        tracing::debug!("Parsed {} books for '{}'", books.len(), query.query);
        Ok(books)
    }
}
