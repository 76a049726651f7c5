use std::sync::Arc;

use chrono::NaiveDate;
use dq_core::{Logger, PageSource, QuoteOrigin, QuoteRecord, Result};
use rand::Rng;

use crate::extract::QuoteExtractor;
use crate::fallback::FallbackPool;

#[derive(Debug, Clone)]
pub struct AcquiredQuote {
    pub quote: QuoteRecord,
    pub origin: QuoteOrigin,
}

/// Fetch, extract, and fall back to a canned quote when either step fails.
pub struct QuoteScraper {
    source: Arc<dyn PageSource>,
    extractor: QuoteExtractor,
    fallback: FallbackPool,
    logger: Logger,
}

impl QuoteScraper {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            extractor: QuoteExtractor::new(),
            fallback: FallbackPool::default(),
            logger: Logger::new().with_prefix("[scraper]"),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.extractor = QuoteExtractor::new().with_logger(logger.clone());
        self.logger = logger.with_prefix("[scraper]");
        self
    }

    async fn scrape_live(&self, today: NaiveDate) -> Result<QuoteRecord> {
        let page = self.source.fetch_page().await?;
        self.extractor.extract(&page.body, today)
    }

    /// Returns `None` only when the live page fails and the fallback pool is empty.
    pub async fn acquire<R: Rng + ?Sized>(&self, today: NaiveDate, rng: &mut R) -> Option<AcquiredQuote> {
        self.logger
            .info(&format!("Fetching quote from {}...", self.source.url()));

        match self.scrape_live(today).await {
            Ok(quote) => {
                self.logger
                    .info(&format!("Successfully fetched quote: {}", quote.title));
                return Some(AcquiredQuote {
                    quote,
                    origin: QuoteOrigin::Live,
                });
            }
            Err(e) => self
                .logger
                .error(&format!("Error fetching quote, using fallback: {}", e)),
        }

        let quote = self.fallback.choose(today, rng)?;
        self.logger
            .info(&format!("Using fallback quote: {}", quote.title));
        Some(AcquiredQuote {
            quote,
            origin: QuoteOrigin::Fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dq_core::{Error, FetchedPage};
    use rand::rngs::mock::StepRng;

    struct StaticPage(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl PageSource for StaticPage {
        fn url(&self) -> &str {
            "https://quotes.test/"
        }

        async fn fetch_page(&self) -> Result<FetchedPage> {
            match self.0 {
                Ok(html) => Ok(FetchedPage {
                    url: self.url().to_string(),
                    status: 200,
                    body: html.as_bytes().to_vec(),
                }),
                Err(message) => Err(Error::Network(message.to_string())),
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[tokio::test]
    async fn test_live_page_is_used_when_it_parses() {
        let html = "<div>Monday, June 2, 2025</div><h2>Stay the Course</h2>\
                    <p>Keep going even when the road gets hard.</p><p>Ralph Marston</p>";
        let scraper = QuoteScraper::new(Arc::new(StaticPage(Ok(html))));
        let acquired = scraper.acquire(today(), &mut StepRng::new(0, 0)).await.unwrap();
        assert_eq!(acquired.origin, QuoteOrigin::Live);
        assert_eq!(acquired.quote.title, "Stay the Course");
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback() {
        let scraper = QuoteScraper::new(Arc::new(StaticPage(Err("connection refused"))));
        let acquired = scraper.acquire(today(), &mut StepRng::new(0, 0)).await.unwrap();
        assert_eq!(acquired.origin, QuoteOrigin::Fallback);
        assert_eq!(acquired.quote.title, "Persistence Pays");
        assert!(!acquired.quote.date_label.is_empty());
        assert!(!acquired.quote.author.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_page_uses_fallback() {
        let scraper = QuoteScraper::new(Arc::new(StaticPage(Ok("<html><body></body></html>"))));
        let acquired = scraper.acquire(today(), &mut StepRng::new(0, 0)).await.unwrap();
        assert_eq!(acquired.origin, QuoteOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_empty_fallback_pool_yields_nothing() {
        let scraper = QuoteScraper::new(Arc::new(StaticPage(Err("down"))))
            .with_fallback(FallbackPool::new(Vec::new()));
        assert!(scraper.acquire(today(), &mut StepRng::new(0, 0)).await.is_none());
    }
}
