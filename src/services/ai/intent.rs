use crate::models::{Intent, IntentKind};

pub const MAIL_KEYWORDS: &[&str] = &["email", "gmail", "mail", "inbox"];
pub const CREATE_EVENT_KEYWORDS: &[&str] = &["meeting", "appointment", "schedule", "calendar event"];
pub const VIEW_CALENDAR_KEYWORDS: &[&str] = &["calendar", "agenda"];
// Mail, event and calendar rules run first, so the bare verbs only catch what is left.
pub const CREATE_TASK_KEYWORDS: &[&str] = &[
    "add",
    "create",
    "new task",
    "task:",
    "todo",
    "to-do",
    "reminder",
    "remind me",
];
pub const VIEW_TASKS_KEYWORDS: &[&str] = &["task"];

pub const RULES: &[(IntentKind, &[&str])] = &[
    (IntentKind::SearchMail, MAIL_KEYWORDS),
    (IntentKind::CreateEvent, CREATE_EVENT_KEYWORDS),
    (IntentKind::ViewCalendar, VIEW_CALENDAR_KEYWORDS),
    (IntentKind::CreateTask, CREATE_TASK_KEYWORDS),
    (IntentKind::ViewTasks, VIEW_TASKS_KEYWORDS),
];

pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(kind, _)| kind.into_intent(message))
        .unwrap_or(Intent::Chat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_keywords() {
        let text = "Any Email from Alice about the invoice?";
        assert_eq!(
            classify(text),
            Intent::SearchMail {
                query: text.to_string()
            }
        );
        assert!(matches!(classify("check my inbox"), Intent::SearchMail { .. }));
    }

    #[test]
    fn test_mail_beats_schedule() {
        let text = "mail Bob to schedule the review";
        assert_eq!(
            classify(text),
            Intent::SearchMail {
                query: text.to_string()
            }
        );
    }

    #[test]
    fn test_schedule_a_meeting_is_event_creation() {
        let text = "Schedule a meeting with Dana tomorrow at 2pm";
        assert_eq!(
            classify(text),
            Intent::CreateEvent {
                text: text.to_string()
            }
        );
    }

    #[test]
    fn test_calendar_event_beats_calendar_view() {
        assert!(matches!(
            classify("add a calendar event for Friday"),
            Intent::CreateEvent { .. }
        ));
        assert_eq!(classify("what's on my calendar?"), Intent::ViewCalendar);
    }

    #[test]
    fn test_task_creation_and_view() {
        assert_eq!(
            classify("Add task: Review documents"),
            Intent::CreateTask {
                text: "Add task: Review documents".to_string()
            }
        );
        assert!(matches!(
            classify("remind me to call John"),
            Intent::CreateTask { .. }
        ));
        assert_eq!(classify("show my tasks"), Intent::ViewTasks);
    }

    #[test]
    fn test_task_creation_without_contiguous_phrase() {
        for text in [
            "Add a task to buy milk",
            "create a task to call John",
            "add buy groceries",
        ] {
            assert_eq!(
                classify(text),
                Intent::CreateTask {
                    text: text.to_string()
                },
                "{text}"
            );
        }
        assert!(matches!(
            classify("add a meeting with Dana on Friday"),
            Intent::CreateEvent { .. }
        ));
    }

    #[test]
    fn test_no_keyword_is_chat() {
        assert_eq!(classify("what's the capital of France?"), Intent::Chat);
        assert_eq!(classify(""), Intent::Chat);
    }

    #[test]
    fn test_classification_is_idempotent() {
        for text in [
            "email from Bob",
            "schedule standup",
            "calendar",
            "todo: buy milk",
            "tasks please",
            "hello",
        ] {
            assert_eq!(classify(text), classify(text));
        }
    }

    #[test]
    fn test_keyword_sets_are_disjoint() {
        let all: Vec<&str> = RULES.iter().flat_map(|(_, kws)| kws.iter().copied()).collect();
        let mut dedup = all.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(all.len(), dedup.len());
    }
}
