// src/types.rs
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Message shape sent to the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: Role::System, content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }

    pub fn assistant(content: &str) -> Self {
        Self { role: Role::Assistant, content: content.to_string() }
    }
}

/// One entry of a persisted conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub ts: String,
}

impl StoredMessage {
    pub fn now(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            ts: Utc::now().to_rfc3339(),
        }
    }

    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage { role: self.role, content: self.content.clone() }
    }

    pub fn speaker(&self) -> &'static str {
        match self.role {
            Role::User => "You",
            _ => "Bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub preferred_language: Option<String>,
    pub created_at: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: None,
            preferred_language: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub helpful: String,
    pub ts: String,
}
