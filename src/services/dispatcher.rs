use std::sync::Arc;

use crate::models::{
    CalendarEvent, EmailSummary, ExternalResult, ResolvedEvent, TaskDraft, TaskList,
};
use crate::services::google::{CalendarService, MailService, TaskService};

pub const SNIPPET_CHARS: usize = 100;
pub const DESCRIPTION_CHARS: usize = 50;
pub const TASKS_PER_LIST: usize = 5;

pub struct Dispatcher {
    mail: Arc<dyn MailService>,
    calendar: Arc<dyn CalendarService>,
    tasks: Arc<dyn TaskService>,
}

impl Dispatcher {
    pub fn new(
        mail: Arc<dyn MailService>,
        calendar: Arc<dyn CalendarService>,
        tasks: Arc<dyn TaskService>,
    ) -> Self {
        Self {
            mail,
            calendar,
            tasks,
        }
    }

    pub async fn search_mail(&self, query: &str, limit: u32) -> String {
        match self.mail.search(query, limit).await {
            ExternalResult::Error(e) => format!("❌ Gmail Error: {e}"),
            ExternalResult::Success(emails) if emails.is_empty() => {
                "📭 No emails found matching your search.".to_string()
            }
            ExternalResult::Success(emails) => format_emails(&emails),
        }
    }

    pub async fn create_event(&self, resolved: &ResolvedEvent) -> String {
        let draft = &resolved.draft;
        tracing::info!(
            title = %draft.title,
            origin = resolved.origin.as_str(),
            "creating calendar event"
        );

        match self.calendar.insert(draft).await {
            ExternalResult::Error(e) => format!("❌ Error creating calendar event: {e}"),
            ExternalResult::Success(created) => {
                let mut reply = format!(
                    "📅 **Event created:** {}\n🕐 {} – {}\n",
                    draft.title,
                    draft.start_time.format("%a %b %-d, %H:%M"),
                    draft.end_time.format("%H:%M %Z"),
                );
                if let Some(link) = created.html_link.filter(|l| !l.is_empty()) {
                    reply.push_str(&format!("🔗 {link}\n"));
                }
                reply
            }
        }
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> String {
        tracing::info!(title = %draft.title, "creating task");

        match self.tasks.insert(draft, None).await {
            ExternalResult::Error(e) => format!("❌ Error creating task: {e}"),
            ExternalResult::Success(_) => format!("✅ Task created: {}", draft.title),
        }
    }

    pub async fn view_calendar(&self, limit: u32) -> String {
        match self.calendar.list_upcoming(limit).await {
            ExternalResult::Error(e) => format!("❌ Calendar Error: {e}"),
            ExternalResult::Success(events) if events.is_empty() => {
                "📅 No upcoming events found.".to_string()
            }
            ExternalResult::Success(events) => format_events(&events, usize::MAX, false),
        }
    }

    pub async fn view_tasks(&self) -> String {
        match self.tasks.list_all().await {
            ExternalResult::Error(e) => format!("❌ Tasks Error: {e}"),
            ExternalResult::Success(lists) => format_tasks(&lists),
        }
    }

    pub fn mail(&self) -> &dyn MailService {
        self.mail.as_ref()
    }

    pub fn calendar(&self) -> &dyn CalendarService {
        self.calendar.as_ref()
    }

    pub fn tasks(&self) -> &dyn TaskService {
        self.tasks.as_ref()
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn format_emails(emails: &[EmailSummary]) -> String {
    let mut reply = format!("📧 **Found {} emails:**\n\n", emails.len());
    for (i, email) in emails.iter().enumerate() {
        reply.push_str(&format!("**{}.** {}\n", i + 1, email.subject));
        reply.push_str(&format!("📨 {}\n", email.from));
        reply.push_str(&format!("💬 {}...\n\n", truncate(&email.snippet, SNIPPET_CHARS)));
    }
    reply
}

pub fn format_events(events: &[CalendarEvent], show: usize, with_description: bool) -> String {
    let mut reply = "📅 **Upcoming Events:**\n\n".to_string();
    for (i, event) in events.iter().take(show).enumerate() {
        let title = event.summary.as_deref().unwrap_or("No Title");
        reply.push_str(&format!("**{}.** {}\n🕐 {}\n", i + 1, title, event.start.display()));
        if with_description {
            if let Some(desc) = event.description.as_deref().filter(|d| !d.is_empty()) {
                reply.push_str(&format!("📝 {}...\n", truncate(desc, DESCRIPTION_CHARS)));
            }
        }
        reply.push('\n');
    }
    reply
}

pub fn format_tasks(lists: &[TaskList]) -> String {
    let mut reply = "✅ **Your Tasks:**\n\n".to_string();
    let mut count = 0;
    for list in lists {
        for task in list.tasks.iter().take(TASKS_PER_LIST) {
            count += 1;
            reply.push_str(&format!(
                "{} {}\n",
                status_icon(task.is_completed()),
                task.title.as_deref().unwrap_or("No Title")
            ));
        }
    }

    if count == 0 {
        "✅ No tasks found.".to_string()
    } else {
        reply
    }
}

pub fn format_tasks_grouped(lists: &[TaskList]) -> String {
    let mut reply = "✅ **Your Tasks:**\n\n".to_string();
    let mut count = 0;
    for list in lists.iter().filter(|l| !l.tasks.is_empty()) {
        reply.push_str(&format!("📋 **{}:**\n", list.list_name));
        for task in list.tasks.iter().take(TASKS_PER_LIST) {
            count += 1;
            reply.push_str(&format!(
                "{} {}\n",
                status_icon(task.is_completed()),
                task.title.as_deref().unwrap_or("No Title")
            ));
            if let Some(due) = task.due.as_deref() {
                reply.push_str(&format!("   📅 Due: {due}\n"));
            }
        }
        reply.push('\n');
    }

    if count == 0 {
        "✅ No tasks found. You're all caught up!".to_string()
    } else {
        reply
    }
}

fn status_icon(completed: bool) -> &'static str {
    if completed {
        "✅"
    } else {
        "⏳"
    }
}
