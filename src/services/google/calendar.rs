use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::json;

use super::auth::GoogleAuth;
use super::{envelope, CalendarService};
use crate::models::{CalendarEvent, CreatedEvent, EventDraft, ExternalResult};

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

pub struct GoogleCalendarClient {
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(auth: Arc<GoogleAuth>, client: reqwest::Client) -> Self {
        Self { auth, client }
    }

    async fn list_inner(&self, limit: u32) -> anyhow::Result<Vec<CalendarEvent>> {
        let token = self.auth.access_token().await?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = limit.to_string();

        let list: EventList = self
            .client
            .get(EVENTS_URL)
            .bearer_auth(&token)
            .query(&[
                ("timeMin", now.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .context("Calendar list request failed")?
            .error_for_status()
            .context("Calendar list returned error")?
            .json()
            .await
            .context("failed to parse Calendar list response")?;

        Ok(list.items)
    }

    async fn insert_inner(&self, draft: &EventDraft) -> anyhow::Result<CreatedEvent> {
        let token = self.auth.access_token().await?;

        let created: CreatedEvent = self
            .client
            .post(EVENTS_URL)
            .bearer_auth(&token)
            .json(&event_body(draft))
            .send()
            .await
            .context("Calendar insert request failed")?
            .error_for_status()
            .context("Calendar insert returned error")?
            .json()
            .await
            .context("failed to parse created event")?;

        Ok(created)
    }
}

pub fn event_body(draft: &EventDraft) -> serde_json::Value {
    let tz: Tz = draft.start_time.timezone();
    json!({
        "summary": draft.title,
        "description": draft.description.clone().unwrap_or_default(),
        "start": {
            "dateTime": draft.start_time.to_rfc3339_opts(SecondsFormat::Secs, false),
            "timeZone": tz.name(),
        },
        "end": {
            "dateTime": draft.end_time.to_rfc3339_opts(SecondsFormat::Secs, false),
            "timeZone": tz.name(),
        },
    })
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn list_upcoming(&self, limit: u32) -> ExternalResult<Vec<CalendarEvent>> {
        envelope("calendar.list", self.list_inner(limit).await)
    }

    async fn insert(&self, draft: &EventDraft) -> ExternalResult<CreatedEvent> {
        envelope("calendar.insert", self.insert_inner(draft).await)
    }
}
