use async_trait::async_trait;
use crate::types::FetchedPage;
use crate::Result;

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Returns the URL this source reads from
    fn url(&self) -> &str;

    /// Fetches the raw page
    async fn fetch_page(&self) -> Result<FetchedPage>;
}
