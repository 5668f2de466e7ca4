use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DraftError {
    #[error("event end {end} is not after start {start}")]
    EndNotAfterStart { start: String, end: String },

    #[error("event title is empty")]
    EmptyTitle,
}

// `end_time > start_time` holds for every value built through `EventDraft::new`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub start_time: DateTime<Tz>,
    pub end_time: DateTime<Tz>,
    pub description: Option<String>,
}

impl EventDraft {
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Tz>,
        end_time: DateTime<Tz>,
        description: Option<String>,
    ) -> Result<Self, DraftError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if end_time <= start_time {
            return Err(DraftError::EndNotAfterStart {
                start: start_time.to_rfc3339(),
                end: end_time.to_rfc3339(),
            });
        }
        Ok(Self {
            title,
            start_time,
            end_time,
            description,
        })
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DraftOrigin {
    Llm,
    Fallback,
}

impl DraftOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftOrigin::Llm => "llm",
            DraftOrigin::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedEvent {
    pub draft: EventDraft,
    pub origin: DraftOrigin,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: Option<String>,
    pub due: Option<NaiveDate>,
}
