//! Search query and result state models.

use serde::{Deserialize, Serialize};

use super::BookRecord;

/// Term searched when the user has not typed anything
pub const DEFAULT_SEARCH_TERM: &str = "android";

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Raw text as typed by the user
    pub query: String,
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Whether the user supplied no usable text
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// The term to send, substituting `default_term` for a blank query
    pub fn term_or<'a>(&'a self, default_term: &'a str) -> &'a str {
        if self.is_blank() {
            default_term
        } else {
            &self.query
        }
    }

    /// The term to send, substituting [`DEFAULT_SEARCH_TERM`] for a blank query
    pub fn term(&self) -> &str {
        self.term_or(DEFAULT_SEARCH_TERM)
    }
}

impl From<&str> for SearchQuery {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

impl From<String> for SearchQuery {
    fn from(query: String) -> Self {
        Self::new(query)
    }
}

/// The single current outcome of the latest search, as shown by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ResultState {
    /// No search issued yet
    #[default]
    Idle,
    /// A search is in flight
    Loading,
    /// At least one book matched
    Loaded(Vec<BookRecord>),
    /// The search finished without books to show
    Empty,
    /// No network was reachable, nothing was fetched
    OfflineError,
    /// The request failed
    RequestError(String),
}

impl ResultState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResultState::Loading)
    }

    /// Books to list, empty for every state but `Loaded`
    pub fn books(&self) -> &[BookRecord] {
        match self {
            ResultState::Loaded(books) => books,
            _ => &[],
        }
    }

    /// Short text for the empty-state display, if the state has one
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ResultState::Empty => Some("No books found"),
            ResultState::OfflineError => Some("No internet connection"),
            ResultState::RequestError(_) => Some("Problem fetching books. Please try again."),
            ResultState::Idle | ResultState::Loading | ResultState::Loaded(_) => None,
        }
    }
}
