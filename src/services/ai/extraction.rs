use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::models::{DraftError, DraftOrigin, EventDraft, ExternalResult, ResolvedEvent, TaskDraft};
use crate::services::ai::completion::CompletionClient;
use crate::services::fallback::build_fallback_event;

pub const MAX_JSON_SCAN: usize = 16 * 1024;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

static TASK_BOILERPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)add task|task:").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable timestamp `{0}`")]
    InvalidTimestamp(String),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExtractionError {
    #[error("Please specify a task title.")]
    EmptyTaskTitle,
}

#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

pub fn event_prompt(message: &str, now: DateTime<Tz>) -> String {
    format!(
        r#"Extract calendar event details from the user's message.

User message: "{message}"
Current date/time: {now} ({tz})

Return ONLY a JSON object (no markdown, no explanation) with exactly these fields:
{{"title": "short event title", "start_time": "YYYY-MM-DDTHH:MM:SS", "end_time": "YYYY-MM-DDTHH:MM:SS", "description": "optional details or null"}}

Rules:
- If no date is mentioned, use tomorrow.
- If no time is mentioned, use 10:00.
- If no duration is mentioned, the event lasts 1 hour.
- Use the 24-hour clock and the {tz} timezone."#,
        now = now.to_rfc3339(),
        tz = now.timezone().name(),
    )
}

// Returns the first top-level `{...}` slice by counting brace depth. Braces
// inside JSON strings are not special-cased.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;

    for (offset, ch) in text[start..].char_indices() {
        if offset > MAX_JSON_SCAN {
            return None;
        }
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

pub fn parse_event_response(response: &str, tz: Tz) -> Result<EventDraft, ParseFailure> {
    let json = find_json_object(response).ok_or(ParseFailure::NoJsonObject)?;
    let raw: RawEvent = serde_json::from_str(json)?;

    let title = required(raw.title, "title")?;
    let start = parse_timestamp(&required(raw.start_time, "start_time")?, tz)?;
    let end = parse_timestamp(&required(raw.end_time, "end_time")?, tz)?;
    let description = raw.description.filter(|d| !d.trim().is_empty());

    Ok(EventDraft::new(title, start, end, description)?)
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ParseFailure> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ParseFailure::MissingField(field))
}

pub fn parse_timestamp(value: &str, tz: Tz) -> Result<DateTime<Tz>, ParseFailure> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&tz));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| naive.and_local_timezone(tz).earliest())
        .ok_or_else(|| ParseFailure::InvalidTimestamp(value.to_string()))
}

pub async fn extract_event(
    completion: &CompletionClient,
    message: &str,
    now: DateTime<Tz>,
) -> ResolvedEvent {
    let prompt = event_prompt(message, now);

    let failure = match completion.complete(&prompt, Some("Event extraction")).await {
        ExternalResult::Success(response) => match parse_event_response(&response, now.timezone()) {
            Ok(draft) => {
                return ResolvedEvent {
                    draft,
                    origin: DraftOrigin::Llm,
                }
            }
            Err(e) => e.to_string(),
        },
        ExternalResult::Error(e) => e,
    };

    tracing::warn!(reason = %failure, "LLM event extraction failed, using fallback parser");

    ResolvedEvent {
        draft: build_fallback_event(message, now),
        origin: DraftOrigin::Fallback,
    }
}

pub fn extract_task(message: &str) -> Result<TaskDraft, ExtractionError> {
    let stripped = TASK_BOILERPLATE.replace_all(message, "");
    let title = stripped
        .trim()
        .trim_start_matches([':', '-'])
        .trim()
        .to_string();

    if title.is_empty() {
        return Err(ExtractionError::EmptyTaskTitle);
    }

    Ok(TaskDraft {
        title,
        notes: None,
        due: None,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Timelike};

    use super::*;
    use crate::services::ai::{ChatRequest, LlmProvider};

    struct CannedLlm {
        reply: anyhow::Result<String>,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn chat(&self, _request: &ChatRequest) -> anyhow::Result<String> {
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn completion(reply: anyhow::Result<&str>) -> CompletionClient {
        CompletionClient::new(Box::new(CannedLlm {
            reply: reply.map(|s| s.to_string()),
        }))
    }

    fn now() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2025, 6, 16, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_find_json_object_in_prose() {
        let text = "Sure! Here you go:\n```json\n{\"a\": {\"b\": 1}}\n```\nAnything else? {\"c\": 2}";
        assert_eq!(find_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_find_json_object_unbalanced() {
        assert_eq!(find_json_object("{\"a\": 1"), None);
        assert_eq!(find_json_object("no braces here"), None);
    }

    #[test]
    fn test_find_json_object_is_bounded() {
        let huge = format!("{{\"a\": \"{}\"", "x".repeat(MAX_JSON_SCAN * 2));
        let text = format!("{huge}}}");
        assert_eq!(find_json_object(&text), None);
    }

    #[test]
    fn test_parse_event_response_valid() {
        let response = r#"{"title":"Design review","start_time":"2025-06-17T14:00:00","end_time":"2025-06-17T15:30:00","description":null}"#;
        let draft = parse_event_response(response, Tz::UTC).unwrap();
        assert_eq!(draft.title, "Design review");
        assert_eq!(draft.start_time.hour(), 14);
        assert_eq!(draft.duration(), Duration::minutes(90));
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_parse_event_response_rfc3339_converted() {
        let response = r#"{"title":"Call","start_time":"2025-06-17T14:00:00Z","end_time":"2025-06-17T15:00:00Z"}"#;
        let draft = parse_event_response(response, chrono_tz::Europe::Berlin).unwrap();
        assert_eq!(draft.start_time.hour(), 16);
    }

    #[test]
    fn test_parse_event_response_missing_end() {
        let response = r#"{"title":"Call","start_time":"2025-06-17T14:00:00"}"#;
        let err = parse_event_response(response, Tz::UTC).unwrap_err();
        assert!(matches!(err, ParseFailure::MissingField("end_time")));
    }

    #[test]
    fn test_parse_event_response_blank_title() {
        let response = r#"{"title":"  ","start_time":"2025-06-17T14:00:00","end_time":"2025-06-17T15:00:00"}"#;
        let err = parse_event_response(response, Tz::UTC).unwrap_err();
        assert!(matches!(err, ParseFailure::MissingField("title")));
    }

    #[test]
    fn test_parse_event_response_end_before_start() {
        let response = r#"{"title":"Call","start_time":"2025-06-17T14:00:00","end_time":"2025-06-17T13:00:00"}"#;
        let err = parse_event_response(response, Tz::UTC).unwrap_err();
        assert!(matches!(err, ParseFailure::Draft(DraftError::EndNotAfterStart { .. })));
    }

    #[test]
    fn test_parse_event_response_malformed() {
        assert!(matches!(
            parse_event_response("{title: Call}", Tz::UTC),
            Err(ParseFailure::InvalidJson(_))
        ));
        assert!(matches!(
            parse_event_response(r#"{"title":"Call","start_time":"soon","end_time":"later"}"#, Tz::UTC),
            Err(ParseFailure::InvalidTimestamp(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_event_uses_llm_draft() {
        let llm = completion(Ok(
            "Here it is: {\"title\":\"Team sync\",\"start_time\":\"2025-06-17 14:30\",\"end_time\":\"2025-06-17 16:30\",\"description\":\"weekly\"}",
        ));
        let resolved = extract_event(&llm, "Team sync tomorrow at 14:30 for 2 hours", now()).await;
        assert_eq!(resolved.origin, DraftOrigin::Llm);
        assert_eq!(resolved.draft.title, "Team sync");
        assert_eq!(resolved.draft.description.as_deref(), Some("weekly"));
    }

    #[tokio::test]
    async fn test_missing_end_time_defers_to_fallback() {
        let llm = completion(Ok(
            r#"{"title":"LLM title","start_time":"2025-06-17T09:00:00"}"#,
        ));
        let resolved = extract_event(&llm, "Team sync tomorrow at 14:30 for 2 hours", now()).await;
        assert_eq!(resolved.origin, DraftOrigin::Fallback);
        assert_eq!(resolved.draft.title, "Team sync");
        assert_eq!(resolved.draft.start_time.hour(), 14);
        assert_eq!(resolved.draft.duration(), Duration::hours(2));
    }

    #[tokio::test]
    async fn test_llm_error_defers_to_fallback() {
        let llm = completion(Err(anyhow::anyhow!("AI API error: 500")));
        let resolved = extract_event(&llm, "quick chat", now()).await;
        assert_eq!(resolved.origin, DraftOrigin::Fallback);
        assert_eq!(resolved.draft.title, "quick chat");
        assert!(resolved.draft.end_time > resolved.draft.start_time);
    }

    #[tokio::test]
    async fn test_prose_reply_defers_to_fallback() {
        let llm = completion(Ok("I'm not sure what you mean."));
        let resolved = extract_event(&llm, "call at 9pm", now()).await;
        assert_eq!(resolved.origin, DraftOrigin::Fallback);
        assert_eq!(resolved.draft.start_time.hour(), 21);
    }

    #[test]
    fn test_event_prompt_mentions_defaults() {
        let prompt = event_prompt("lunch with Sam", now());
        assert!(prompt.contains("lunch with Sam"));
        assert!(prompt.contains("2025-06-16T08:00:00+00:00"));
        assert!(prompt.contains("tomorrow"));
        assert!(prompt.contains("10:00"));
        assert!(prompt.contains("1 hour"));
        assert!(prompt.contains("24-hour"));
    }

    #[test]
    fn test_extract_task_strips_boilerplate() {
        assert_eq!(extract_task("Add task: Review documents").unwrap().title, "Review documents");
        assert_eq!(extract_task("task: buy milk").unwrap().title, "buy milk");
        assert_eq!(extract_task("todo call the bank").unwrap().title, "todo call the bank");
    }

    #[test]
    fn test_extract_task_empty_title() {
        assert_eq!(extract_task("add task"), Err(ExtractionError::EmptyTaskTitle));
        assert_eq!(extract_task("  Task:  "), Err(ExtractionError::EmptyTaskTitle));
    }
}
