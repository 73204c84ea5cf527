//! Utility modules supporting book searches.
//!
//! - [`HttpClient`]: shared HTTP client performing timed GET requests
//! - [`FetchError`]: errors raised while fetching a URL
//! - [`Connectivity`]: network reachability seam, with [`StaticConnectivity`]
//!   and the background-refreshed [`ProbedConnectivity`] built on [`TcpProbe`]
//!
//! # Fetching a URL
//!
//! ```rust,no_run
//! use booklisting::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let body = client
//!     .fetch("https://www.googleapis.com/books/v1/volumes?q=android")
//!     .await?;
//! println!("{} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod connectivity;
mod http;

pub use connectivity::{Connectivity, ProbedConnectivity, StaticConnectivity, TcpProbe};
pub use http::{
    default_user_agent, FetchError, HttpClient, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT,
};
