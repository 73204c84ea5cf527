//! # Booklisting
//!
//! Search the Google Books API and keep a live list of results that refreshes
//! as the user types.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (BookRecord, SearchQuery, ResultState)
//! - [`sources`]: Search backends behind the [`BookSource`] trait, and the
//!   volumes JSON parser
//! - [`controller`]: The [`SearchController`] owning the UI-facing result state
//! - [`utils`]: HTTP fetching and connectivity checks
//! - [`ui`]: Terminal rendering of result states
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use booklisting::{GoogleBooksSource, SearchController};
//! use booklisting::utils::StaticConnectivity;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = SearchController::new(
//!     Arc::new(GoogleBooksSource::new()?),
//!     Arc::new(StaticConnectivity::online()),
//! );
//! controller.submit("rust programming");
//! for book in controller.settled().await.books() {
//!     println!("{}", book);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use controller::SearchController;
pub use models::{BookRecord, ResultState, SearchQuery};
pub use sources::{BookSource, GoogleBooksSource, SearchError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
