use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    SearchMail { query: String },
    CreateEvent { text: String },
    CreateTask { text: String },
    ViewCalendar,
    ViewTasks,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    SearchMail,
    CreateEvent,
    ViewCalendar,
    CreateTask,
    ViewTasks,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SearchMail { .. } => "search_mail",
            Intent::CreateEvent { .. } => "create_event",
            Intent::CreateTask { .. } => "create_task",
            Intent::ViewCalendar => "view_calendar",
            Intent::ViewTasks => "view_tasks",
            Intent::Chat => "chat",
        }
    }
}

impl IntentKind {
    pub fn into_intent(self, text: &str) -> Intent {
        match self {
            IntentKind::SearchMail => Intent::SearchMail {
                query: text.to_string(),
            },
            IntentKind::CreateEvent => Intent::CreateEvent {
                text: text.to_string(),
            },
            IntentKind::CreateTask => Intent::CreateTask {
                text: text.to_string(),
            },
            IntentKind::ViewCalendar => Intent::ViewCalendar,
            IntentKind::ViewTasks => Intent::ViewTasks,
        }
    }
}
