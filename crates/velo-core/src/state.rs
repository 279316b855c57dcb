//! UI-agnostic conversation types
//!
//! These are shared between the core pipeline and any front-end (the terminal
//! client today) and double as the JSON wire format of the chat backend.

use serde::{Deserialize, Serialize};

/// A chat message in the conversation with the advisor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A source excerpt attached to one assistant reply, referenced by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /api/chat/completion`
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
}

/// Successful reply from the completion endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionReply {
    pub response: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}
