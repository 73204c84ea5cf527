//! Book model representing a single volume returned by a search.

use serde::{Deserialize, Serialize};

/// Placeholder shown when a volume lists no authors
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Separator used when joining several author names
pub const AUTHOR_SEPARATOR: &str = ", ";

/// A book as shown in the result list
///
/// The record is immutable once built. `author` is always a non-empty display
/// string: missing authors collapse to [`UNKNOWN_AUTHOR`] and multiple authors
/// are joined with [`AUTHOR_SEPARATOR`] in the order given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookRecord {
    author: String,
    title: String,
}

impl BookRecord {
    /// Create a record from a list of author names and a title
    pub fn new<I, S>(authors: I, title: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            author: join_authors(authors),
            title: title.into(),
        }
    }

    /// Create a record from an already formatted author string
    ///
    /// A blank author string is replaced with [`UNKNOWN_AUTHOR`].
    pub fn from_display(author: impl Into<String>, title: impl Into<String>) -> Self {
        let author = author.into();
        let author = if author.trim().is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            author
        };

        Self {
            author,
            title: title.into(),
        }
    }

    /// Author display string
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Book title
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl std::fmt::Display for BookRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.title, self.author)
    }
}

/// Join author names for display, falling back to [`UNKNOWN_AUTHOR`]
pub fn join_authors<I, S>(authors: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<String> = authors
        .into_iter()
        .map(|a| a.as_ref().to_string())
        .collect();

    if names.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        names.join(AUTHOR_SEPARATOR)
    }
}
