use chrono::NaiveDate;
use dq_core::QuoteRecord;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::extract::DATE_LABEL_FORMAT;

pub const FALLBACK_AUTHOR: &str = "Daily Motivator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedQuote {
    pub title: String,
    pub body: String,
    pub author: String,
}

impl CannedQuote {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            author: FALLBACK_AUTHOR.to_string(),
        }
    }
}

/// Hand-written quotes used when the live page cannot be read.
#[derive(Debug, Clone)]
pub struct FallbackPool {
    quotes: Vec<CannedQuote>,
}

impl Default for FallbackPool {
    fn default() -> Self {
        Self::new(vec![
            CannedQuote::new(
                "Persistence Pays",
                "Success is not final, failure is not fatal: it is the courage to continue that counts. \
                 Keep pushing forward, even when the path seems difficult.",
            ),
            CannedQuote::new(
                "New Beginnings",
                "Every day is a fresh start. Yesterday's mistakes don't define today's possibilities. \
                 Embrace the opportunity to grow and improve.",
            ),
            CannedQuote::new(
                "Inner Strength",
                "You are stronger than you think and more capable than you realize. \
                 Trust in your abilities and take confident steps toward your goals.",
            ),
        ])
    }
}

impl FallbackPool {
    pub fn new(quotes: Vec<CannedQuote>) -> Self {
        Self { quotes }
    }

    pub fn quotes(&self) -> &[CannedQuote] {
        &self.quotes
    }

    /// Picks one quote with `rng` and stamps it with `today`.
    pub fn choose<R: Rng + ?Sized>(&self, today: NaiveDate, rng: &mut R) -> Option<QuoteRecord> {
        self.quotes.choose(rng).map(|quote| QuoteRecord {
            date_label: today.format(DATE_LABEL_FORMAT).to_string(),
            title: quote.title.clone(),
            body: quote.body.clone(),
            author: quote.author.clone(),
            fetch_date: today,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_fixed_selector_is_deterministic() {
        let pool = FallbackPool::default();
        let mut rng = StepRng::new(0, 0);
        let quote = pool.choose(today(), &mut rng).unwrap();
        assert_eq!(quote.title, "Persistence Pays");
        assert_eq!(quote.author, FALLBACK_AUTHOR);
        assert_eq!(quote.date_label, "Monday, June 02, 2025");
        assert_eq!(quote.fetch_date, today());
    }

    #[test]
    fn test_choice_always_comes_from_pool() {
        let pool = FallbackPool::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let quote = pool.choose(today(), &mut rng).unwrap();
            assert!(pool
                .quotes()
                .iter()
                .any(|c| c.title == quote.title && c.body == quote.body));
            assert!(!quote.date_label.is_empty());
            assert!(!quote.body.is_empty());
        }
    }

    #[test]
    fn test_empty_pool_yields_nothing() {
        let pool = FallbackPool::new(Vec::new());
        assert!(pool.choose(today(), &mut StepRng::new(0, 0)).is_none());
    }
}
