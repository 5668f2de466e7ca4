use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::IncomingMessage;
use crate::services::conversation;
use crate::state::AppState;

const ANONYMOUS: &str = "webhook";

#[derive(Deserialize)]
pub struct MessageRequest {
    pub text: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// POST /message
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let incoming = IncomingMessage::new(
        text,
        payload.conversation_id.unwrap_or_else(|| ANONYMOUS.to_string()),
        payload.user_id.unwrap_or_else(|| ANONYMOUS.to_string()),
    );

    tracing::info!(chat_id = %incoming.conversation_id, "incoming webhook message");

    match conversation::process_message(&state, &incoming).await {
        Ok(reply) => Ok(Json(MessageResponse {
            reply,
            success: true,
            error: None,
        })),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "conversation processing failed");
            Ok(Json(MessageResponse {
                reply: conversation::TURN_FAILED.to_string(),
                success: false,
                error: Some(e.to_string()),
            }))
        }
    }
}
