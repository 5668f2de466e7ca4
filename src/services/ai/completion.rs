use crate::models::ExternalResult;

use super::{ChatRequest, LlmProvider, Message};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant integrated with Gmail, Google Calendar, and Tasks. \
You can help users manage their emails, schedule events, and organize tasks. Be concise and helpful.";

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct CompletionClient {
    provider: Box<dyn LlmProvider>,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn build_request(&self, prompt: &str, context: Option<&str>) -> ChatRequest {
        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
            messages.push(Message::system(format!("Context: {ctx}")));
        }
        messages.push(Message::user(prompt));

        ChatRequest {
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub async fn complete(&self, prompt: &str, context: Option<&str>) -> ExternalResult<String> {
        let request = self.build_request(prompt, context);
        match self.provider.chat(&request).await {
            Ok(text) => ExternalResult::Success(text),
            Err(e) => {
                let message = format!("{e:#}");
                tracing::error!(error = %message, "AI chat error");
                ExternalResult::Error(message)
            }
        }
    }
}
