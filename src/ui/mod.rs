//! Terminal rendering of search results.
//!
//! This is the UI layer bound to [`ResultState`]: a spinner while loading, a
//! table (or JSON, or plain lines) of books once loaded, and a short
//! colored message for the empty, offline and error states.

use comfy_table::{Attribute, Cell, Table};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::models::{BookRecord, ResultState};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different outcomes.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Loading => "◐",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Loading,
    Search,
}

impl Status {
    /// Status matching a result state
    pub fn for_state(state: &ResultState) -> Self {
        match state {
            ResultState::Idle => Status::Info,
            ResultState::Loading => Status::Loading,
            ResultState::Loaded(_) => Status::Success,
            ResultState::Empty => Status::Warning,
            ResultState::OfflineError | ResultState::RequestError(_) => Status::Error,
        }
    }
}

/// Print a styled status message to stderr.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Loading => eprintln!("{} {}", icon.cyan(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// One-line summary of a state, as shown under the search box
pub fn state_summary(state: &ResultState) -> String {
    match state {
        ResultState::Idle => "Type a query to search for books".to_string(),
        ResultState::Loading => "Searching...".to_string(),
        ResultState::Loaded(books) if books.len() == 1 => "Found 1 book".to_string(),
        ResultState::Loaded(books) => format!("Found {} books", books.len()),
        ResultState::Empty | ResultState::OfflineError | ResultState::RequestError(_) => state
            .message()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Print the search results header.
pub fn print_search_header(query: &str) {
    eprintln!();
    eprintln!(
        "{} Search results for: \"{}\"",
        status_icon(Status::Search).yellow().bold(),
        query.cyan().bold()
    );
}

/// Build a results table for a list of books.
pub fn books_table(books: &[BookRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "Title", "Authors"]);

    for (i, book) in books.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate_with_ellipsis(book.title(), 60)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(book.author(), 40)),
        ]);
    }
    table
}

/// Print a settled state as a table, falling back to its message.
pub fn print_state_table(state: &ResultState) {
    match state {
        ResultState::Loaded(books) => {
            println!("{}", books_table(books));
            print_status(Status::Success, &state_summary(state));
        }
        _ => print_status(Status::for_state(state), &state_summary(state)),
    }
}

/// Print a settled state as plain lines.
pub fn print_state_plain(state: &ResultState) {
    match state {
        ResultState::Loaded(books) => {
            for book in books {
                println!("{}", book);
            }
        }
        _ => println!("{}", state_summary(state)),
    }
}

/// Print a settled state as JSON.
pub fn print_state_json(state: &ResultState) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

/// Truncate text to at most `max_chars` characters, marking the cut with "...".
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return "...".to_string();
    }

    let truncated: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", truncated)
}

/// Loading spinner shown while a search is in flight.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Remove the spinner from the terminal.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
