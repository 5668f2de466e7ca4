pub mod draft;
pub mod intent;
pub mod message;
pub mod workspace;

pub use draft::{DraftError, DraftOrigin, EventDraft, ResolvedEvent, TaskDraft};
pub use intent::{Intent, IntentKind};
pub use message::IncomingMessage;
pub use workspace::{
    CalendarEvent, CreatedEvent, CreatedTask, EmailSummary, EventTime, ExternalResult, TaskItem,
    TaskList,
};
