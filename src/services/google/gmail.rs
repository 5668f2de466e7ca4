use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::auth::GoogleAuth;
use super::{envelope, MailService};
use crate::models::{EmailSummary, ExternalResult};

const MESSAGES_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages";

#[derive(Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
struct MessageDetail {
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Payload,
}

#[derive(Deserialize, Default)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl Payload {
    fn header(&self, name: &str, default: &str) -> String {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.clone())
            .unwrap_or_else(|| default.to_string())
    }
}

pub struct GmailClient {
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl GmailClient {
    pub fn new(auth: Arc<GoogleAuth>, client: reqwest::Client) -> Self {
        Self { auth, client }
    }

    async fn search_inner(&self, query: &str, limit: u32) -> anyhow::Result<Vec<EmailSummary>> {
        let token = self.auth.access_token().await?;
        let max_results = limit.to_string();

        let list: MessageList = self
            .client
            .get(MESSAGES_URL)
            .bearer_auth(&token)
            .query(&[("q", query), ("maxResults", max_results.as_str())])
            .send()
            .await
            .context("Gmail list request failed")?
            .error_for_status()
            .context("Gmail list returned error")?
            .json()
            .await
            .context("failed to parse Gmail list response")?;

        let mut results = Vec::with_capacity(list.messages.len());
        for msg in list.messages {
            let detail: MessageDetail = self
                .client
                .get(format!("{MESSAGES_URL}/{}", msg.id))
                .bearer_auth(&token)
                .query(&[
                    ("format", "metadata"),
                    ("metadataHeaders", "Subject"),
                    ("metadataHeaders", "From"),
                    ("metadataHeaders", "Date"),
                ])
                .send()
                .await
                .context("Gmail get request failed")?
                .error_for_status()
                .context("Gmail get returned error")?
                .json()
                .await
                .context("failed to parse Gmail message")?;

            results.push(EmailSummary {
                subject: detail.payload.header("Subject", "No Subject"),
                from: detail.payload.header("From", "Unknown"),
                date: detail.payload.header("Date", "Unknown"),
                snippet: detail.snippet,
                id: msg.id,
            });
        }

        Ok(results)
    }
}

#[async_trait]
impl MailService for GmailClient {
    async fn search(&self, query: &str, limit: u32) -> ExternalResult<Vec<EmailSummary>> {
        envelope("gmail.search", self.search_inner(query, limit).await)
    }
}
