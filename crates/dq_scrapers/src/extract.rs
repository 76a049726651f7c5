//! Heuristic quote extraction from the flattened greatday.com page.
//!
//! The scan is keyed to the page layout: a weekday date line, a short title
//! right after it, then body paragraphs up to the author byline or the page
//! footer. It is best-effort and will need retuning whenever the site layout
//! changes.

use chrono::NaiveDate;
use dq_core::{Error, Logger, QuoteRecord, Result};

use crate::text::page_lines;

pub const DEFAULT_AUTHOR: &str = "Ralph Marston";
pub const DEFAULT_TITLE: &str = "Daily Motivation";
pub const DATE_LABEL_FORMAT: &str = "%A, %B %d, %Y";

const WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

const TITLE_LOOKAHEAD: usize = 3;
const TITLE_MIN_CHARS: usize = 6;
const TITLE_MAX_CHARS: usize = 99;
const TITLE_BLACKLIST: &[&str] = &[
    "copyright",
    "ralph marston",
    "greatday",
    "daily motivator",
    "http",
    "www.",
    ".com",
];

const FOOTER_KEYWORDS: &[&str] = &[
    "copyright",
    "all rights reserved",
    "previous",
    "permission",
    "subscribe",
    "email",
    "privacy policy",
];

const MAX_PARAGRAPHS: usize = 3;
const PARAGRAPH_MIN_CHARS: usize = 16;
const PARAGRAPH_MIN_WORDS: usize = 4;
const ENCODING_ARTIFACTS: &[&str] = &["â€", "Ã", "\u{FFFD}"];

const FALLBACK_SENTENCE_MIN_CHARS: usize = 51;

/// Why the body scan ended early.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stop {
    Byline(String),
    Footer,
}

type StopRule = fn(&str, &str) -> Option<Stop>;

/// Evaluated in order against every line after the title.
const STOP_RULES: &[(&str, StopRule)] = &[("byline", byline), ("footer", footer)];

fn byline(line: &str, author: &str) -> Option<Stop> {
    line.starts_with(author).then(|| Stop::Byline(line.to_string()))
}

fn footer(line: &str, _author: &str) -> Option<Stop> {
    let lower = line.to_lowercase();
    FOOTER_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
        .then_some(Stop::Footer)
}

type LineFilter = fn(&str) -> bool;

/// A line becomes a paragraph only if every filter accepts it.
const PARAGRAPH_FILTERS: &[(&str, LineFilter)] = &[
    ("length", long_enough),
    ("url", not_a_link),
    ("encoding", clean_encoding),
    ("uppercase", not_shouting),
    ("words", enough_words),
];

fn long_enough(line: &str) -> bool {
    line.chars().count() >= PARAGRAPH_MIN_CHARS
}

fn not_a_link(line: &str) -> bool {
    !line.starts_with("http://") && !line.starts_with("https://")
}

fn clean_encoding(line: &str) -> bool {
    !ENCODING_ARTIFACTS.iter().any(|artifact| line.contains(artifact))
}

fn not_shouting(line: &str) -> bool {
    !is_all_uppercase(line)
}

fn enough_words(line: &str) -> bool {
    line.split_whitespace().count() >= PARAGRAPH_MIN_WORDS
}

fn is_all_uppercase(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

fn is_title_candidate(line: &str) -> bool {
    let len = line.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return false;
    }
    let lower = line.to_lowercase();
    !TITLE_BLACKLIST.iter().any(|word| lower.contains(word))
}

#[derive(Debug, Default)]
struct Scan {
    date_label: Option<String>,
    title: Option<String>,
    paragraphs: Vec<String>,
    author: Option<String>,
}

pub struct QuoteExtractor {
    author: String,
    logger: Logger,
}

impl Default for QuoteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteExtractor {
    pub fn new() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            logger: Logger::new().with_prefix("[extract]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.with_prefix("[extract]");
        self
    }

    /// Builds a quote from raw page bytes, or fails when no body text can be found.
    pub fn extract(&self, html: &[u8], today: NaiveDate) -> Result<QuoteRecord> {
        let html = String::from_utf8_lossy(html);
        let lines = page_lines(&html);
        self.logger.debug(&format!("Flattened page into {} lines", lines.len()));

        let scan = self.scan(&lines);
        let mut body = scan.paragraphs.join("\n\n");

        if scan.date_label.is_none() || scan.title.is_none() || body.is_empty() {
            self.logger.warn(&format!(
                "Layout scan incomplete (date: {}, title: {}, paragraphs: {})",
                scan.date_label.is_some(),
                scan.title.is_some(),
                scan.paragraphs.len()
            ));
            if body.is_empty() {
                body = first_long_sentence(&lines).unwrap_or_default();
            }
        }

        if body.is_empty() {
            return Err(Error::Parse("no quote body found on page".to_string()));
        }

        Ok(QuoteRecord {
            date_label: scan
                .date_label
                .unwrap_or_else(|| today.format(DATE_LABEL_FORMAT).to_string()),
            title: scan.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body,
            author: scan.author.unwrap_or_else(|| self.author.clone()),
            fetch_date: today,
        })
    }

    fn scan(&self, lines: &[String]) -> Scan {
        let mut scan = Scan::default();

        let Some(date_idx) = lines
            .iter()
            .position(|line| WEEKDAYS.iter().any(|day| line.contains(day)))
        else {
            return scan;
        };
        scan.date_label = Some(lines[date_idx].clone());

        let Some(title_idx) = lines
            .iter()
            .enumerate()
            .skip(date_idx + 1)
            .take(TITLE_LOOKAHEAD)
            .find(|(_, line)| is_title_candidate(line))
            .map(|(idx, _)| idx)
        else {
            return scan;
        };
        scan.title = Some(lines[title_idx].clone());

        'lines: for line in &lines[title_idx + 1..] {
            for (name, rule) in STOP_RULES {
                if let Some(stop) = rule(line.as_str(), &self.author) {
                    self.logger.debug(&format!("Body scan stopped by {} rule at {:?}", name, line));
                    if let Stop::Byline(author) = stop {
                        scan.author = Some(author);
                    }
                    break 'lines;
                }
            }

            match PARAGRAPH_FILTERS.iter().find(|(_, accept)| !accept(line.as_str())) {
                Some((name, _)) => self.logger.debug(&format!("Skipping line ({}): {:?}", name, line)),
                None => scan.paragraphs.push(line.clone()),
            }
        }

        scan.paragraphs.truncate(MAX_PARAGRAPHS);
        scan
    }
}

fn first_long_sentence(lines: &[String]) -> Option<String> {
    let text = lines.join(" ");
    text.split_inclusive(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .find(|sentence| sentence.chars().count() >= FALLBACK_SENTENCE_MIN_CHARS)
        .map(str::to_string)
}
