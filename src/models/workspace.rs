use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum ExternalResult<T> {
    Success(T),
    Error(String),
}

impl<T> ExternalResult<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, ExternalResult::Error(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ExternalResult::Success(v) => Some(v),
            ExternalResult::Error(_) => None,
        }
    }
}

impl<T> From<anyhow::Result<T>> for ExternalResult<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(v) => ExternalResult::Success(v),
            Err(e) => ExternalResult::Error(format!("{e:#}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailSummary {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EventTime {
    pub fn display(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("No time")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(rename = "htmlLink", default)]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
}

impl TaskItem {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskList {
    pub list_name: String,
    pub list_id: String,
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedTask {
    pub id: String,
}
