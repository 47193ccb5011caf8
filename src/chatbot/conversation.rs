use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub at: DateTime<Utc>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.at.to_rfc3339(), self.role, self.content)
    }
}

/// Bounded, thread-safe conversation history. The oldest turns are dropped
/// once `max_messages` is reached.
pub struct Conversation {
    messages: RwLock<VecDeque<Message>>,
    max_messages: usize,
}

impl Conversation {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::with_capacity(max_messages)),
            max_messages,
        }
    }

    pub fn push(&self, role: Role, content: impl Into<String>, symbol: Option<&str>) {
        let mut messages = self.messages.write();
        messages.push_back(Message {
            role,
            content: content.into(),
            symbol: symbol.map(str::to_string),
            at: Utc::now(),
        });
        while messages.len() > self.max_messages {
            messages.pop_front();
        }
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.messages.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let conv = Conversation::new(3);
        for i in 0..5 {
            conv.push(Role::User, format!("q{i}"), Some("AAPL"));
        }
        let history = conv.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "q2");
        assert_eq!(history[2].content, "q4");
    }

    #[test]
    fn message_display_includes_role() {
        let conv = Conversation::new(10);
        assert_eq!(conv.len(), 0);
        conv.push(Role::Assistant, "hello", None);
        let rendered = conv.history()[0].to_string();
        assert!(rendered.contains("assistant: hello"));
    }
}
