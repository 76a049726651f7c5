use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Name of the destination, used in logs
    fn name(&self) -> &str;

    /// Sends one formatted text message
    async fn send_text(&self, text: &str) -> Result<()>;
}
