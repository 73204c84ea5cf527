//! Book search backends.
//!
//! This module defines the [`BookSource`] trait the search controller talks
//! to. [`GoogleBooksSource`] queries the Google Books volumes endpoint;
//! [`MockSource`] returns canned results for tests.
//!
//! A search either yields a list of books (possibly empty when nothing
//! matched) or fails with a [`SearchError`]:
//!
//! - [`SearchError::Network`]: the URL was invalid, the connection failed,
//!   timed out, or the server answered with a status other than 200
//! - [`SearchError::NoData`]: the body had no usable `items` array or a volume
//!   in it was malformed

mod google_books;
pub mod mock;
mod parser;

pub use google_books::GoogleBooksSource;
pub use mock::MockSource;
pub use parser::{parse, try_parse, MalformedItemPolicy, ParseError};

use async_trait::async_trait;

use crate::models::{BookRecord, SearchQuery};
use crate::utils::FetchError;

/// A backend able to turn a query into a list of books
#[async_trait]
pub trait BookSource: Send + Sync + std::fmt::Debug {
    /// Search for books matching the query
    ///
    /// `Ok(vec![])` means the request succeeded and nothing matched.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<BookRecord>, SearchError>;
}

/// Errors that can occur when searching a source
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// Network or HTTP error, including malformed request URLs
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// The response held nothing that could be shown
    #[error("No data: {0}")]
    NoData(#[from] ParseError),
}
