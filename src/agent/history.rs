//! Conversation history.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Role-tagged messages plus the system prompt they are sent with.
///
/// With `keep_history` off, each new user message replaces everything
/// before it, so the model only ever sees the latest exchange.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    system_prompt: String,
    keep_history: bool,
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new(system_prompt: impl Into<String>, keep_history: bool) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            keep_history,
            messages: Vec::new(),
        }
    }

    pub fn add_message(&mut self, role: Role, text: impl Into<String>) {
        let message = ChatMessage::new(role, text);
        if !self.keep_history && role == Role::User {
            self.messages.clear();
        }
        self.messages.push(message);
    }

    /// Append an instruction to the system prompt on its own line.
    pub fn add_dynamic_system_prompt(&mut self, instruction: &str) {
        self.system_prompt.push('\n');
        self.system_prompt.push_str(instruction);
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn keeps_history(&self) -> bool {
        self.keep_history
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
