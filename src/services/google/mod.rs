pub mod auth;
pub mod calendar;
pub mod gmail;
pub mod tasks;

use async_trait::async_trait;

use crate::models::{
    CalendarEvent, CreatedEvent, CreatedTask, EmailSummary, EventDraft, ExternalResult, TaskDraft,
    TaskList,
};

#[async_trait]
pub trait MailService: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> ExternalResult<Vec<EmailSummary>>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn list_upcoming(&self, limit: u32) -> ExternalResult<Vec<CalendarEvent>>;
    async fn insert(&self, draft: &EventDraft) -> ExternalResult<CreatedEvent>;
}

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_all(&self) -> ExternalResult<Vec<TaskList>>;
    // `list_id = None` selects the default list.
    async fn insert(&self, draft: &TaskDraft, list_id: Option<&str>) -> ExternalResult<CreatedTask>;
}

pub(crate) fn envelope<T>(operation: &str, result: anyhow::Result<T>) -> ExternalResult<T> {
    if let Err(e) = &result {
        tracing::error!(operation, error = %format!("{e:#}"), "google API call failed");
    }
    result.into()
}
