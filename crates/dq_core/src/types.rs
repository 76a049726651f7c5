use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of body characters kept in a tracking record preview.
pub const PREVIEW_CHARS: usize = 100;

/// A single daily quote, built fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub date_label: String,
    pub title: String,
    /// One or more paragraphs separated by blank lines.
    pub body: String,
    pub author: String,
    pub fetch_date: NaiveDate,
}

impl QuoteRecord {
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.body
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Which supplier produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteOrigin {
    Live,
    Fallback,
}

/// Raw result of a successful page fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

/// The last quote that was successfully delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub fingerprint: String,
    pub date_label: String,
    pub title: String,
    pub sent_at: DateTime<Utc>,
    pub fetch_date: NaiveDate,
    pub content_preview: String,
}

impl TrackingRecord {
    pub fn delivered(quote: &QuoteRecord, fingerprint: String, sent_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint,
            date_label: quote.date_label.clone(),
            title: quote.title.clone(),
            sent_at,
            fetch_date: quote.fetch_date,
            content_preview: char_prefix(&quote.body, PREVIEW_CHARS).to_string(),
        }
    }
}

/// Returns the first `max_chars` characters of `text`, never splitting a char.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
