use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dq_core::{Logger, MessageSink, QuoteOrigin, TrackingRecord, TrackingStore};
use dq_delivery::{apology_message, format_message};
use dq_scrapers::QuoteScraper;
use dq_storage::{ChangeDetector, ChangeStatus};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Quote delivered and recorded.
    Sent { origin: QuoteOrigin },
    /// Same quote as the last delivery, nothing sent.
    Skipped,
    /// Delivery failed; the tracking record was left alone.
    SendFailed,
    /// No quote at all; an apology was attempted instead.
    NoQuote { apology_sent: bool },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Sent { origin: QuoteOrigin::Live } => write!(f, "Quote sent successfully"),
            RunOutcome::Sent { origin: QuoteOrigin::Fallback } => write!(f, "Fallback quote sent successfully"),
            RunOutcome::Skipped => write!(f, "No new quote, skipped"),
            RunOutcome::SendFailed => write!(f, "Failed to send quote"),
            RunOutcome::NoQuote { .. } => write!(f, "Failed to fetch quote"),
        }
    }
}

/// One scheduled invocation: fetch, dedupe, deliver, record.
pub struct DailyRun {
    scraper: QuoteScraper,
    detector: ChangeDetector,
    store: Arc<dyn TrackingStore>,
    sink: Arc<dyn MessageSink>,
    logger: Logger,
}

impl DailyRun {
    pub fn new(
        scraper: QuoteScraper,
        store: Arc<dyn TrackingStore>,
        sink: Arc<dyn MessageSink>,
        logger: Logger,
    ) -> Self {
        Self {
            scraper,
            detector: ChangeDetector::new(store.clone()).with_logger(logger.clone()),
            store,
            sink,
            logger: logger.with_prefix("[run]"),
        }
    }

    pub async fn run<R: Rng + ?Sized>(&self, today: NaiveDate, rng: &mut R) -> RunOutcome {
        let Some(acquired) = self.scraper.acquire(today, rng).await else {
            self.logger.error("❌ No quote available, sending apology");
            let apology_sent = match self.sink.send_text(apology_message()).await {
                Ok(()) => true,
                Err(e) => {
                    self.logger.error(&format!("Failed to send apology: {}", e));
                    false
                }
            };
            return RunOutcome::NoQuote { apology_sent };
        };
        let quote = acquired.quote;

        let fingerprint = match self.detector.check(&quote).await {
            ChangeStatus::Unchanged { .. } => {
                self.logger.info("⏭️ Quote unchanged since last delivery, skipping");
                return RunOutcome::Skipped;
            }
            ChangeStatus::New { fingerprint } => fingerprint,
        };

        let message = format_message(&quote);
        if let Err(e) = self.sink.send_text(&message).await {
            self.logger
                .error(&format!("❌ Failed to send quote via {}: {}", self.sink.name(), e));
            return RunOutcome::SendFailed;
        }

        let record = TrackingRecord::delivered(&quote, fingerprint, Utc::now());
        if let Err(e) = self.store.save(&record).await {
            self.logger
                .warn(&format!("Quote sent but tracking record not saved: {}", e));
        }

        self.logger.info(&format!("✅ Sent \"{}\"", quote.title));
        RunOutcome::Sent {
            origin: acquired.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dq_core::{Error, FetchedPage, PageSource, QuoteRecord, Result};
    use dq_scrapers::FallbackPool;
    use dq_storage::{fingerprint, MemoryStore};
    use rand::rngs::mock::StepRng;
    use std::sync::Mutex;

    const PAGE: &str = "<div>Monday, June 2, 2025</div><h2>Stay the Course</h2>\
                        <p>Keep going even when the road gets hard.</p>\
                        <p>Every small step forward adds up over time.</p>\
                        <p>Ralph Marston</p>";

    struct StaticPage(Option<&'static str>);

    #[async_trait]
    impl PageSource for StaticPage {
        fn url(&self) -> &str {
            "https://quotes.test/"
        }

        async fn fetch_page(&self) -> Result<FetchedPage> {
            match self.0 {
                Some(html) => Ok(FetchedPage {
                    url: self.url().to_string(),
                    status: 200,
                    body: html.as_bytes().to_vec(),
                }),
                None => Err(Error::Network("unreachable".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingSink {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send_text(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(Error::Delivery("HTTP 500".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn daily(page: Option<&'static str>, store: &MemoryStore, sink: &Arc<RecordingSink>) -> DailyRun {
        DailyRun::new(
            QuoteScraper::new(Arc::new(StaticPage(page))),
            Arc::new(store.clone()),
            sink.clone(),
            Logger::new(),
        )
    }

    fn live_quote() -> QuoteRecord {
        QuoteRecord {
            date_label: "Monday, June 2, 2025".to_string(),
            title: "Stay the Course".to_string(),
            body: "Keep going even when the road gets hard.\n\nEvery small step forward adds up over time."
                .to_string(),
            author: "Ralph Marston".to_string(),
            fetch_date: today(),
        }
    }

    #[tokio::test]
    async fn test_first_run_sends_and_records() {
        let store = MemoryStore::new();
        let sink = Arc::new(RecordingSink::default());

        let outcome = daily(Some(PAGE), &store, &sink).run(today(), &mut StepRng::new(0, 0)).await;

        assert_eq!(outcome, RunOutcome::Sent { origin: QuoteOrigin::Live });
        assert_eq!(sink.sent(), vec![format_message(&live_quote())]);
        let record = store.current().await.unwrap();
        assert_eq!(record.fingerprint, fingerprint(&live_quote()));
        assert_eq!(record.title, "Stay the Course");
    }

    #[tokio::test]
    async fn test_unchanged_quote_is_skipped_without_rewrite() {
        let quote = live_quote();
        let stored = TrackingRecord::delivered(&quote, fingerprint(&quote), Utc::now());
        let store = MemoryStore::with_record(stored.clone());
        let sink = Arc::new(RecordingSink::default());

        let outcome = daily(Some(PAGE), &store, &sink).run(today(), &mut StepRng::new(0, 0)).await;

        assert_eq!(outcome, RunOutcome::Skipped);
        assert!(sink.sent().is_empty());
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.current().await, Some(stored));
    }

    #[tokio::test]
    async fn test_send_failure_keeps_previous_record() {
        let mut old = live_quote();
        old.title = "Yesterday".to_string();
        let stored = TrackingRecord::delivered(&old, fingerprint(&old), Utc::now());
        let store = MemoryStore::with_record(stored.clone());
        let sink = Arc::new(RecordingSink::failing());

        let outcome = daily(Some(PAGE), &store, &sink).run(today(), &mut StepRng::new(0, 0)).await;

        assert_eq!(outcome, RunOutcome::SendFailed);
        assert_eq!(sink.sent().len(), 1);
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.current().await, Some(stored));
    }

    #[tokio::test]
    async fn test_fetch_failure_sends_fallback() {
        let store = MemoryStore::new();
        let sink = Arc::new(RecordingSink::default());

        let outcome = daily(None, &store, &sink).run(today(), &mut StepRng::new(0, 0)).await;

        assert_eq!(outcome, RunOutcome::Sent { origin: QuoteOrigin::Fallback });
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("<b>Persistence Pays</b>"));
        assert_eq!(store.current().await.unwrap().title, "Persistence Pays");
    }

    #[tokio::test]
    async fn test_no_quote_sends_apology() {
        let store = MemoryStore::new();
        let sink = Arc::new(RecordingSink::default());
        let run = DailyRun::new(
            QuoteScraper::new(Arc::new(StaticPage(None))).with_fallback(FallbackPool::new(Vec::new())),
            Arc::new(store.clone()),
            sink.clone(),
            Logger::new(),
        );

        let outcome = run.run(today(), &mut StepRng::new(0, 0)).await;

        assert_eq!(outcome, RunOutcome::NoQuote { apology_sent: true });
        assert_eq!(sink.sent(), vec![apology_message().to_string()]);
        assert!(store.current().await.is_none());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(RunOutcome::Skipped.to_string(), "No new quote, skipped");
        assert_eq!(
            RunOutcome::Sent { origin: QuoteOrigin::Live }.to_string(),
            "Quote sent successfully"
        );
    }
}
