use std::env;

use chrono_tz::Tz;

const DEFAULT_LLM_BASE_URL: &str = "https://openai.inference.de-txl.ionos.com/v1";
const DEFAULT_LLM_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct";

#[derive(Clone, Debug, PartialEq)]
pub enum TelegramMode {
    Polling,
    Webhook,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub timezone: Tz,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub telegram_bot_token: String,
    pub telegram_mode: TelegramMode,
    pub telegram_webhook_secret: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_refresh_token: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_or("PORT", 5000),
            timezone: parse_timezone(&env::var("TIMEZONE").unwrap_or_default()),
            llm_api_key: env::var("LLM_API_KEY")
                .or_else(|_| env::var("IONOS_API_KEY"))
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .unwrap_or_default(),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_max_tokens: parse_or("LLM_MAX_TOKENS", 1000),
            llm_temperature: parse_or("LLM_TEMPERATURE", 0.7),
            llm_timeout_secs: parse_or("LLM_TIMEOUT_SECS", 30),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_mode: match env::var("TELEGRAM_MODE").as_deref() {
                Ok("webhook") => TelegramMode::Webhook,
                _ => TelegramMode::Polling,
            },
            telegram_webhook_secret: env::var("TELEGRAM_WEBHOOK_SECRET").unwrap_or_default(),
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_refresh_token: env::var("GOOGLE_REFRESH_TOKEN").unwrap_or_default(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub fn parse_timezone(name: &str) -> Tz {
    let name = name.trim();
    if name.is_empty() {
        return Tz::UTC;
    }
    name.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = name, "unknown TIMEZONE, falling back to UTC");
        Tz::UTC
    })
}
