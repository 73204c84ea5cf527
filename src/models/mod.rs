//! Core data models for books and search operations.

mod book;
mod search;

pub use book::{join_authors, BookRecord, AUTHOR_SEPARATOR, UNKNOWN_AUTHOR};
pub use search::{ResultState, SearchQuery, DEFAULT_SEARCH_TERM};
