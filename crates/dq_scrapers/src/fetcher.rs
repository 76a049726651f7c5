use std::time::Duration;

use async_trait::async_trait;
use dq_core::{Error, FetchedPage, Logger, PageSource, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tokio::time::sleep;
use url::Url;

pub const GREATDAY_URL: &str = "https://www.greatday.com/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fixed-count retry with a constant pause between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

enum AttemptError {
    Transient(String),
    Fatal(String),
}

/// Reads the quote page with browser-like headers.
pub struct PageFetcher {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
    logger: Logger,
}

impl PageFetcher {
    pub fn new(url: &str) -> Result<Self> {
        Url::parse(url).map_err(|e| Error::Network(format!("Invalid URL {}: {}", url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            retry: RetryPolicy::default(),
            logger: Logger::new().with_prefix("[fetcher]"),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.with_prefix("[fetcher]");
        self
    }

    async fn attempt(&self) -> std::result::Result<FetchedPage, AttemptError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("HTTP {} from {}", status, self.url);
            return Err(if is_transient(status) {
                AttemptError::Transient(message)
            } else {
                AttemptError::Fatal(message)
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        Ok(FetchedPage {
            url: self.url.clone(),
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

#[async_trait]
impl PageSource for PageFetcher {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self) -> Result<FetchedPage> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            self.logger
                .info(&format!("Fetching {} (attempt {}/{})", self.url, attempt, attempts));

            match self.attempt().await {
                Ok(page) => {
                    self.logger.info(&format!(
                        "Response status: {} ({} bytes)",
                        page.status,
                        page.body.len()
                    ));
                    return Ok(page);
                }
                Err(AttemptError::Fatal(message)) => {
                    self.logger.error(&message);
                    return Err(Error::Network(message));
                }
                Err(AttemptError::Transient(message)) => {
                    self.logger.warn(&format!("Attempt {} failed: {}", attempt, message));
                    last_error = Some(message);
                    if attempt < attempts {
                        sleep(self.retry.delay).await;
                    }
                }
            }
        }

        Err(Error::Network(format!(
            "Giving up on {} after {} attempts: {}",
            self.url,
            attempts,
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}
