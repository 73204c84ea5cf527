//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{BookRecord, SearchQuery};
use crate::sources::{BookSource, SearchError};

#[derive(Debug, Clone)]
struct MockResponse {
    result: Result<Vec<BookRecord>, SearchError>,
    delay: Duration,
}

/// A mock source for testing that returns predefined responses.
///
/// Responses are keyed by the raw query text. Queries without a configured
/// response succeed with an empty list.
#[derive(Debug, Default)]
pub struct MockSource {
    responses: Mutex<HashMap<String, MockResponse>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result returned for `query`.
    pub fn set_response(&self, query: &str, result: Result<Vec<BookRecord>, SearchError>) {
        self.set_delayed_response(query, result, Duration::ZERO);
    }

    /// Set the result returned for `query` after waiting `delay`.
    pub fn set_delayed_response(
        &self,
        query: &str,
        result: Result<Vec<BookRecord>, SearchError>,
        delay: Duration,
    ) {
        let mut guard = self.responses.lock().unwrap();
        guard.insert(query.to_string(), MockResponse { result, delay });
    }

    /// Number of searches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookSource for MockSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<BookRecord>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let response = {
            let guard = self.responses.lock().unwrap();
            guard.get(&query.query).cloned()
        };

        match response {
            Some(response) => {
                if !response.delay.is_zero() {
                    tokio::time::sleep(response.delay).await;
                }
                response.result
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Helper function to create a mock book for testing.
pub fn make_book(title: &str, authors: &[&str]) -> BookRecord {
    BookRecord::new(authors.iter().copied(), title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ParseError;

    #[tokio::test]
    async fn test_mock_returns_configured_response() {
        let source = MockSource::new();
        source.set_response("rust", Ok(vec![make_book("The Book", &["Steve", "Carol"])]));
        source.set_response("broken", Err(SearchError::NoData(ParseError::MissingItems)));

        let books = source.search(&SearchQuery::new("rust")).await.unwrap();
        assert_eq!(books[0].author(), "Steve, Carol");

        assert!(source.search(&SearchQuery::new("broken")).await.is_err());
        assert!(source
            .search(&SearchQuery::new("other"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(source.calls(), 3);
    }
}
