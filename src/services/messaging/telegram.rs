use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::MessagingProvider;
use crate::models::IncomingMessage;
use crate::services::conversation;
use crate::state::AppState;

const API_BASE: &str = "https://api.telegram.org";
const LONG_POLL_SECS: u64 = 30;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

impl Update {
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;
        let text = message.text?;
        let user_id = message
            .from
            .map(|u| u.id)
            .unwrap_or(message.chat.id);
        Some(IncomingMessage::new(
            text,
            message.chat.id.to_string(),
            user_id.to_string(),
        ))
    }
}

pub struct TelegramBot {
    token: String,
    client: reqwest::Client,
}

impl TelegramBot {
    pub fn new(token: String, client: reqwest::Client) -> Self {
        Self { token, client }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> anyhow::Result<T> {
        let mut req = self.client.post(self.method_url(method)).json(&body);
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let resp: ApiResponse<T> = req
            .send()
            .await
            .with_context(|| format!("failed to call Telegram {method}"))?
            .json()
            .await
            .with_context(|| format!("failed to parse Telegram {method} response"))?;

        if !resp.ok {
            anyhow::bail!(
                "Telegram {method} failed: {}",
                resp.description.unwrap_or_default()
            );
        }
        resp.result
            .ok_or_else(|| anyhow::anyhow!("Telegram {method} returned no result"))
    }

    pub async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": LONG_POLL_SECS,
                "allowed_updates": ["message"],
            }),
            Some(Duration::from_secs(LONG_POLL_SECS + 10)),
        )
        .await
    }

    async fn send_text(&self, chat_id: &str, body: &str, markdown: bool) -> anyhow::Result<()> {
        let mut payload = json!({ "chat_id": chat_id, "text": body });
        if markdown {
            payload["parse_mode"] = json!("Markdown");
        }
        let _: serde_json::Value = self.call("sendMessage", payload, None).await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingProvider for TelegramBot {
    async fn send_message(&self, chat_id: &str, body: &str) -> anyhow::Result<()> {
        self.send_text(chat_id, body, true).await
    }

    async fn send_plain_message(&self, chat_id: &str, body: &str) -> anyhow::Result<()> {
        self.send_text(chat_id, body, false).await
    }

    async fn send_typing(&self, chat_id: &str) -> anyhow::Result<()> {
        let _: bool = self
            .call(
                "sendChatAction",
                json!({ "chat_id": chat_id, "action": "typing" }),
                None,
            )
            .await?;
        Ok(())
    }
}

pub async fn handle_update(state: &Arc<AppState>, update: Update) {
    let Some(incoming) = update.into_incoming() else {
        return;
    };

    let Some(messaging) = state.messaging.as_ref() else {
        tracing::warn!("telegram update received but no messaging provider configured");
        return;
    };

    if let Err(e) = messaging.send_typing(&incoming.conversation_id).await {
        tracing::debug!(error = %e, "failed to send typing indicator");
    }

    let reply = conversation::respond(state, &incoming).await;

    deliver(messaging.as_ref(), &incoming.conversation_id, &reply).await;
}

// A reply Telegram refuses to parse as Markdown is resent once as plain text.
pub async fn deliver(messaging: &dyn MessagingProvider, chat_id: &str, reply: &str) {
    let Err(e) = messaging.send_message(chat_id, reply).await else {
        return;
    };
    tracing::warn!(error = %format!("{e:#}"), %chat_id, "markdown reply rejected, resending as plain text");

    if let Err(e) = messaging.send_plain_message(chat_id, reply).await {
        tracing::error!(error = %format!("{e:#}"), %chat_id, "failed to send reply");
    }
}

pub async fn run_polling(state: Arc<AppState>, bot: Arc<TelegramBot>) {
    tracing::info!("telegram long polling started");
    let mut offset = 0;

    loop {
        match bot.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        handle_update(&state, update).await;
                    });
                }
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "telegram polling failed");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct StrictMarkdown {
        attempts: Mutex<Vec<(&'static str, String)>>,
        reject_plain: bool,
    }

    #[async_trait]
    impl MessagingProvider for StrictMarkdown {
        async fn send_message(&self, _chat_id: &str, body: &str) -> anyhow::Result<()> {
            self.attempts.lock().unwrap().push(("markdown", body.to_string()));
            if body.contains('_') {
                anyhow::bail!("Telegram sendMessage failed: Bad Request: can't parse entities");
            }
            Ok(())
        }

        async fn send_plain_message(&self, _chat_id: &str, body: &str) -> anyhow::Result<()> {
            self.attempts.lock().unwrap().push(("plain", body.to_string()));
            if self.reject_plain {
                anyhow::bail!("Telegram sendMessage failed: chat not found");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_deliver_resends_rejected_markdown_as_plain_text() {
        let messaging = StrictMarkdown::default();
        deliver(&messaging, "42", "use snake_case_names").await;

        assert_eq!(
            *messaging.attempts.lock().unwrap(),
            vec![
                ("markdown", "use snake_case_names".to_string()),
                ("plain", "use snake_case_names".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_deliver_sends_once_when_markdown_accepted() {
        let messaging = StrictMarkdown::default();
        deliver(&messaging, "42", "📅 **Upcoming Events:**").await;

        assert_eq!(messaging.attempts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deliver_gives_up_after_plain_retry() {
        let messaging = StrictMarkdown {
            reject_plain: true,
            ..Default::default()
        };
        deliver(&messaging, "42", "a_b").await;

        assert_eq!(messaging.attempts.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_api_response_without_result() {
        let resp: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request"}"#)
                .unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.description.as_deref(), Some("Bad Request"));

        let resp: ApiResponse<bool> = serde_json::from_str(r#"{"ok":true,"result":true}"#).unwrap();
        assert_eq!(resp.result, Some(true));
    }

    #[test]
    fn test_update_into_incoming() {
        let update: Update = serde_json::from_str(
            r#"{"update_id":10,"message":{"message_id":1,"chat":{"id":-42,"type":"group"},"from":{"id":7,"is_bot":false,"first_name":"A"},"text":"show my tasks"}}"#,
        )
        .unwrap();
        let incoming = update.into_incoming().unwrap();
        assert_eq!(incoming.text, "show my tasks");
        assert_eq!(incoming.conversation_id, "-42");
        assert_eq!(incoming.user_id, "7");
    }

    #[test]
    fn test_non_text_update_is_skipped() {
        let update: Update = serde_json::from_str(
            r#"{"update_id":11,"message":{"message_id":2,"chat":{"id":5},"sticker":{}}}"#,
        )
        .unwrap();
        assert!(update.into_incoming().is_none());

        let update: Update = serde_json::from_str(r#"{"update_id":12}"#).unwrap();
        assert!(update.into_incoming().is_none());
    }
}
