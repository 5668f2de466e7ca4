use crate::models::ExternalResult;
use crate::services::dispatcher::{
    format_events, format_tasks_grouped, truncate, Dispatcher, SNIPPET_CHARS,
};

const DEFAULT_GMAIL_QUERY: &str = "is:unread";
const GMAIL_LIMIT: u32 = 5;
const CALENDAR_FETCH: u32 = 10;
const CALENDAR_SHOW: usize = 5;

pub const WELCOME: &str = "🤖 **AI Assistant Ready!**

I can help you with:
• 💬 **Chat** - Ask me anything
• 📧 **Gmail** - Search and read emails
• 📅 **Calendar** - Create and view events
• ✅ **Tasks** - Manage your to-do list

**Commands:**
/help - Show this help
/gmail [query] - Search Gmail
/calendar - View upcoming events
/tasks - View your tasks

Just send me a message to start chatting!";

pub const HELP: &str = "🔧 **Available Commands:**

📧 **Gmail Commands:**
• `/gmail search term` - Search emails
• `/gmail unread` - Show unread emails
• `/gmail from:sender@email.com` - Emails from specific sender

📅 **Calendar Commands:**
• `/calendar` - Show upcoming events
• `Schedule meeting tomorrow 2pm` - Create event (via chat)

✅ **Task Commands:**
• `/tasks` - Show all tasks
• `Add task: Review documents` - Create task (via chat)

💬 **Chat Examples:**
• \"What emails did I get today?\"
• \"Schedule a meeting for Friday\"
• \"Add a reminder to call John\"

Just type naturally and I'll understand what you want to do!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Gmail { query: String },
    Calendar,
    Tasks,
    Unknown(String),
}

pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;

    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or(head).to_lowercase();

    let command = match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "gmail" => Command::Gmail {
            query: if args.is_empty() {
                DEFAULT_GMAIL_QUERY.to_string()
            } else {
                args.to_string()
            },
        },
        "calendar" => Command::Calendar,
        "tasks" => Command::Tasks,
        _ => Command::Unknown(name),
    };
    Some(command)
}

pub async fn run_command(dispatcher: &Dispatcher, command: Command) -> String {
    tracing::info!(command = ?command, "running slash command");

    match command {
        Command::Start => WELCOME.to_string(),
        Command::Help => HELP.to_string(),
        Command::Gmail { query } => gmail(dispatcher, &query).await,
        Command::Calendar => match dispatcher.calendar().list_upcoming(CALENDAR_FETCH).await {
            ExternalResult::Error(e) => format!("❌ Error: {e}"),
            ExternalResult::Success(events) if events.is_empty() => {
                "📅 No upcoming events found.".to_string()
            }
            ExternalResult::Success(events) => format_events(&events, CALENDAR_SHOW, true),
        },
        Command::Tasks => match dispatcher.tasks().list_all().await {
            ExternalResult::Error(e) => format!("❌ Error: {e}"),
            ExternalResult::Success(lists) => format_tasks_grouped(&lists),
        },
        Command::Unknown(name) => {
            format!("❓ Unknown command /{name}. Send /help to see what I can do.")
        }
    }
}

async fn gmail(dispatcher: &Dispatcher, query: &str) -> String {
    let emails = match dispatcher.mail().search(query, GMAIL_LIMIT).await {
        ExternalResult::Error(e) => return format!("❌ Error: {e}"),
        ExternalResult::Success(emails) => emails,
    };

    if emails.is_empty() {
        return "📭 No emails found for your query.".to_string();
    }

    let mut reply = format!("📧 **Gmail Results for '{query}':**\n\n");
    for (i, email) in emails.iter().enumerate() {
        reply.push_str(&format!("**{}.** {}\n", i + 1, email.subject));
        reply.push_str(&format!("📨 From: {}\n", email.from));
        reply.push_str(&format!("📅 {}\n", email.date));
        reply.push_str(&format!("💬 {}...\n\n", truncate(&email.snippet, SNIPPET_CHARS)));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("a/b"), None);
    }

    #[test]
    fn test_parse_gmail_defaults_to_unread() {
        assert_eq!(
            parse_command("/gmail"),
            Some(Command::Gmail {
                query: "is:unread".to_string()
            })
        );
        assert_eq!(
            parse_command("/gmail   from:bob@example.com  "),
            Some(Command::Gmail {
                query: "from:bob@example.com".to_string()
            })
        );
    }

    #[test]
    fn test_parse_bot_suffix_and_case() {
        assert_eq!(parse_command("/Calendar@deskbot"), Some(Command::Calendar));
        assert_eq!(parse_command("/tasks"), Some(Command::Tasks));
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(
            parse_command("/weather now"),
            Some(Command::Unknown("weather".to_string()))
        );
    }
}
