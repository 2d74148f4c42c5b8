// Chat message types shared across the pipeline and the upstream client

use serde::{Deserialize, Serialize};

/// System prompt prepended to every upstream conversation
pub const SYSTEM_PROMPT: &str = "You are a helpful healthcare assistant for a patient portal. \
Provide general health information and education. Always remind users to consult their \
healthcare provider for medical advice, diagnosis, or treatment. Never provide specific \
medical diagnoses. If someone describes a medical emergency, direct them to call 911 or \
emergency services immediately. Keep responses concise and easy to understand.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation turn, as exchanged with the portal and the upstream API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Build the message list for one upstream call: system prompt first, the
/// caller's history in its original order, then the new user message.
///
/// The history slice is cloned, never mutated.
pub fn assemble_conversation(history: &[ChatMessage], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let msg = ChatMessage::assistant("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);

        let parsed: ChatMessage = serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert_eq!(parsed.role, Role::User);
    }

    #[test]
    fn test_assemble_conversation_order() {
        let history = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer"),
        ];

        let messages = assemble_conversation(&history, "second question");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].content, "first question");
        assert_eq!(messages[2].content, "first answer");
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "second question");
    }

    #[test]
    fn test_assemble_leaves_history_untouched() {
        let history = vec![ChatMessage::user("only turn")];
        let before = history.clone();

        let _ = assemble_conversation(&history, "next");

        assert_eq!(history, before);
    }

    #[test]
    fn test_assemble_with_empty_history() {
        let messages = assemble_conversation(&[], "hello");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "hello");
    }
}
