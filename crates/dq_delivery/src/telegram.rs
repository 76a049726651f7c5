use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use dq_core::types::char_prefix;
use dq_core::{Error, Logger, MessageSink, Result};
use serde::Deserialize;
use url::Url;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Longest text sent as-is.
pub const MAX_MESSAGE_CHARS: usize = 4000;
const TRUNCATED_CHARS: usize = 3990;
pub const TRUNCATION_MARKER: &str = "\n\n(...)";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cuts oversize text down so it fits in one Telegram message.
///
/// The cut never lands inside an HTML entity or tag, and tags left open by
/// the cut are closed again so the result still parses as Telegram HTML.
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }

    let mut head = markup_safe_prefix(char_prefix(text, TRUNCATED_CHARS));
    let mut closers = closing_tags(head);
    while head.chars().count() + closers.chars().count() > TRUNCATED_CHARS {
        let len = head.chars().count();
        head = markup_safe_prefix(char_prefix(head, len.saturating_sub(1)));
        closers = closing_tags(head);
    }
    format!("{}{}{}", head, closers, TRUNCATION_MARKER)
}

/// Drops a trailing tag or entity that the cut left unterminated.
fn markup_safe_prefix(head: &str) -> &str {
    let mut head = head;
    if let Some(lt) = head.rfind('<') {
        if !head[lt..].contains('>') {
            head = &head[..lt];
        }
    }
    if let Some(amp) = head.rfind('&') {
        if !head[amp..].contains(';') {
            head = &head[..amp];
        }
    }
    head
}

fn closing_tags(head: &str) -> String {
    let mut open: Vec<&str> = Vec::new();
    let mut rest = head;
    while let Some(lt) = rest.find('<') {
        let Some(gt) = rest[lt..].find('>') else {
            break;
        };
        let tag = &rest[lt + 1..lt + gt];
        match tag.strip_prefix('/') {
            Some(name) => {
                if let Some(pos) = open.iter().rposition(|open_name| *open_name == name.trim()) {
                    open.truncate(pos);
                }
            }
            None => open.extend(tag.split_whitespace().next()),
        }
        rest = &rest[lt + gt + 1..];
    }
    open.iter().rev().map(|name| format!("</{}>", name)).collect()
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
    logger: Logger,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramClient {
    pub fn new(token: &str, chat_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: TELEGRAM_API_URL.to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            logger: Logger::new().with_prefix("[telegram]"),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| Error::Delivery(format!("Invalid API URL {}: {}", base_url, e)))?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.with_prefix("[telegram]");
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let text = truncate_message(text);
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text.as_str()),
            ("parse_mode", "HTML"),
            ("disable_web_page_preview", "true"),
        ];

        self.logger.info(&format!(
            "Sending message to chat {} (length: {})",
            self.chat_id,
            text.chars().count()
        ));

        // reqwest errors carry the request URL, which contains the token.
        let response = self
            .client
            .post(self.send_message_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        self.logger.info(&format!("Telegram response status: {}", status));

        let body = response
            .text()
            .await
            .map_err(|e| Error::Delivery(format!("reading response failed: {}", e.without_url())))?;

        if status != reqwest::StatusCode::OK {
            return Err(Error::Delivery(format!("HTTP {}: {}", status, body)));
        }

        let reply: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Delivery(format!("unexpected response {}: {}", body, e)))?;
        if !reply.ok {
            return Err(Error::Delivery(format!(
                "API error: {}",
                reply.description.unwrap_or(body)
            )));
        }

        self.logger.info("✅ Message sent successfully");
        Ok(())
    }
}
