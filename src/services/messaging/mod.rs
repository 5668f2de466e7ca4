pub mod telegram;

use async_trait::async_trait;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send_message(&self, chat_id: &str, body: &str) -> anyhow::Result<()>;

    // Same text with no markup parsing.
    async fn send_plain_message(&self, chat_id: &str, body: &str) -> anyhow::Result<()> {
        self.send_message(chat_id, body).await
    }

    async fn send_typing(&self, _chat_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
