use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::Instrument;

use crate::models::{ExternalResult, IncomingMessage, Intent};
use crate::services::ai::extraction::{extract_event, extract_task};
use crate::services::ai::intent::classify;
use crate::services::commands::{parse_command, run_command};
use crate::state::AppState;

pub const MAIL_RESULTS: u32 = 3;
pub const CALENDAR_RESULTS: u32 = 5;

pub const CHAT_FALLBACK: &str = "Sorry, I could not process your request.";
pub const TURN_FAILED: &str = "❌ Sorry, I encountered an error processing your message.";

pub async fn respond(state: &Arc<AppState>, message: &IncomingMessage) -> String {
    let turn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "turn",
        %turn_id,
        chat_id = %message.conversation_id,
        user_id = %message.user_id,
    );

    async {
        match process_message(state, message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "error processing message");
                TURN_FAILED.to_string()
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn process_message(
    state: &Arc<AppState>,
    message: &IncomingMessage,
) -> anyhow::Result<String> {
    let text = message.text.trim();
    anyhow::ensure!(!text.is_empty(), "received an empty message");

    if let Some(command) = parse_command(text) {
        return Ok(run_command(&state.dispatcher, command).await);
    }

    let intent = classify(text);
    tracing::info!(intent = intent.as_str(), "processing message");

    let dispatcher = &state.dispatcher;
    let reply = match intent {
        Intent::SearchMail { query } => dispatcher.search_mail(&query, MAIL_RESULTS).await,
        Intent::CreateEvent { text } => {
            let now = current_time(state.config.timezone);
            let resolved = extract_event(&state.completion, &text, now).await;
            dispatcher.create_event(&resolved).await
        }
        Intent::CreateTask { text } => match extract_task(&text) {
            Ok(draft) => dispatcher.create_task(&draft).await,
            Err(e) => format!("❌ {e}"),
        },
        Intent::ViewCalendar => dispatcher.view_calendar(CALENDAR_RESULTS).await,
        Intent::ViewTasks => dispatcher.view_tasks().await,
        Intent::Chat => {
            let context = message.context_line();
            match state.completion.complete(text, Some(&context)).await {
                ExternalResult::Success(reply) => reply,
                ExternalResult::Error(_) => CHAT_FALLBACK.to_string(),
            }
        }
    };

    Ok(reply)
}

pub fn current_time(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}
