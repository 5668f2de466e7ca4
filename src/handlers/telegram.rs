use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::errors::AppError;
use crate::services::messaging::telegram::{handle_update, Update};
use crate::state::AppState;

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

fn check_secret(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    // No secret configured: accept everything (local development).
    if expected.is_empty() {
        return Ok(());
    }

    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided != expected {
        tracing::warn!("invalid Telegram webhook secret");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// POST /webhook/telegram
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> Result<StatusCode, AppError> {
    check_secret(&headers, &state.config.telegram_webhook_secret)?;

    if state.messaging.is_none() {
        return Err(AppError::Config(
            "TELEGRAM_BOT_TOKEN is not set".to_string(),
        ));
    }

    tracing::info!(update_id = update.update_id, "incoming Telegram update");

    // Telegram retries on non-2xx, so delivery failures are only logged.
    handle_update(&state, update).await;

    Ok(StatusCode::OK)
}
