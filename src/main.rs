use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use deskbot::config::{AppConfig, TelegramMode};
use deskbot::services::ai::completion::CompletionClient;
use deskbot::services::ai::openai::OpenAiCompatibleProvider;
use deskbot::services::dispatcher::Dispatcher;
use deskbot::services::google::auth::GoogleAuth;
use deskbot::services::google::calendar::GoogleCalendarClient;
use deskbot::services::google::gmail::GmailClient;
use deskbot::services::google::tasks::GoogleTasksClient;
use deskbot::services::messaging::telegram::{self, TelegramBot};
use deskbot::services::messaging::MessagingProvider;
use deskbot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    anyhow::ensure!(
        !config.llm_api_key.is_empty(),
        "LLM_API_KEY (or IONOS_API_KEY / OPENAI_API_KEY) must be set"
    );
    anyhow::ensure!(
        !config.google_client_id.is_empty()
            && !config.google_client_secret.is_empty()
            && !config.google_refresh_token.is_empty(),
        "GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REFRESH_TOKEN must be set"
    );

    let provider = OpenAiCompatibleProvider::new(
        config.llm_base_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    tracing::info!(
        "using LLM endpoint {} (model: {})",
        config.llm_base_url,
        provider.model()
    );
    let completion = CompletionClient::new(Box::new(provider))
        .with_sampling(config.llm_max_tokens, config.llm_temperature);

    let http = reqwest::Client::new();
    let auth = Arc::new(GoogleAuth::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_refresh_token.clone(),
        http.clone(),
    ));
    let dispatcher = Dispatcher::new(
        Arc::new(GmailClient::new(Arc::clone(&auth), http.clone())),
        Arc::new(GoogleCalendarClient::new(Arc::clone(&auth), http.clone())),
        Arc::new(GoogleTasksClient::new(Arc::clone(&auth), http.clone())),
    );

    let bot = (!config.telegram_bot_token.is_empty())
        .then(|| Arc::new(TelegramBot::new(config.telegram_bot_token.clone(), http.clone())));
    if bot.is_none() {
        tracing::warn!("TELEGRAM_BOT_TOKEN not set, only the HTTP webhook is available");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        completion,
        dispatcher,
        messaging: bot
            .clone()
            .map(|b| b as Arc<dyn MessagingProvider>),
    });

    if let Some(bot) = bot {
        if config.telegram_mode == TelegramMode::Polling {
            tokio::spawn(telegram::run_polling(Arc::clone(&state), bot));
        } else {
            tracing::info!("telegram webhook mode, expecting updates on /webhook/telegram");
        }
    }

    let app = deskbot::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(timezone = config.timezone.name(), "starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
