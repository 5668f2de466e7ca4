use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::auth::GoogleAuth;
use super::{envelope, TaskService};
use crate::models::{CreatedTask, ExternalResult, TaskDraft, TaskItem, TaskList};

const API_URL: &str = "https://tasks.googleapis.com/tasks/v1";
const DEFAULT_LIST: &str = "@default";

#[derive(Deserialize)]
struct TaskListsResponse {
    #[serde(default)]
    items: Vec<TaskListRef>,
}

#[derive(Deserialize)]
struct TaskListRef {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct TasksResponse {
    #[serde(default)]
    items: Vec<TaskItem>,
}

pub struct GoogleTasksClient {
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl GoogleTasksClient {
    pub fn new(auth: Arc<GoogleAuth>, client: reqwest::Client) -> Self {
        Self { auth, client }
    }

    async fn task_lists(&self, token: &str) -> anyhow::Result<Vec<TaskListRef>> {
        let resp: TaskListsResponse = self
            .client
            .get(format!("{API_URL}/users/@me/lists"))
            .bearer_auth(token)
            .send()
            .await
            .context("Tasks list request failed")?
            .error_for_status()
            .context("Tasks list returned error")?
            .json()
            .await
            .context("failed to parse task lists")?;

        Ok(resp.items)
    }

    async fn list_all_inner(&self) -> anyhow::Result<Vec<TaskList>> {
        let token = self.auth.access_token().await?;

        let mut all = Vec::new();
        for list in self.task_lists(&token).await? {
            let tasks: TasksResponse = self
                .client
                .get(format!("{API_URL}/lists/{}/tasks", list.id))
                .bearer_auth(&token)
                .send()
                .await
                .context("Tasks request failed")?
                .error_for_status()
                .context("Tasks request returned error")?
                .json()
                .await
                .context("failed to parse tasks")?;

            all.push(TaskList {
                list_name: list.title,
                list_id: list.id,
                tasks: tasks.items,
            });
        }

        Ok(all)
    }

    async fn insert_inner(&self, draft: &TaskDraft, list_id: Option<&str>) -> anyhow::Result<CreatedTask> {
        let token = self.auth.access_token().await?;

        let list_id = match list_id {
            Some(id) => id.to_string(),
            None => self
                .task_lists(&token)
                .await?
                .into_iter()
                .next()
                .map(|l| l.id)
                .unwrap_or_else(|| DEFAULT_LIST.to_string()),
        };

        let created: CreatedTask = self
            .client
            .post(format!("{API_URL}/lists/{list_id}/tasks"))
            .bearer_auth(&token)
            .json(&task_body(draft))
            .send()
            .await
            .context("Tasks insert request failed")?
            .error_for_status()
            .context("Tasks insert returned error")?
            .json()
            .await
            .context("failed to parse created task")?;

        Ok(created)
    }
}

pub fn task_body(draft: &TaskDraft) -> serde_json::Value {
    let mut body = json!({
        "title": draft.title,
        "notes": draft.notes.clone().unwrap_or_default(),
    });
    if let Some(due) = draft.due {
        body["due"] = json!(format!("{}T00:00:00.000Z", due.format("%Y-%m-%d")));
    }
    body
}

#[async_trait]
impl TaskService for GoogleTasksClient {
    async fn list_all(&self) -> ExternalResult<Vec<TaskList>> {
        envelope("tasks.list", self.list_all_inner().await)
    }

    async fn insert(&self, draft: &TaskDraft, list_id: Option<&str>) -> ExternalResult<CreatedTask> {
        envelope("tasks.insert", self.insert_inner(draft, list_id).await)
    }
}
