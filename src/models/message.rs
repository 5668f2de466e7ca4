use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomingMessage {
    pub text: String,
    pub conversation_id: String,
    pub user_id: String,
}

impl IncomingMessage {
    pub fn new(
        text: impl Into<String>,
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn context_line(&self) -> String {
        format!("User ID: {}, Chat ID: {}", self.user_id, self.conversation_id)
    }
}
