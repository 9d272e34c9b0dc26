// src/chat.rs
//! Embedded assistant chat.
//!
//! The completion API is a third-party service consumed through one POST
//! endpoint. The widget keeps its conversation in memory for the lifetime
//! of the session; a failed completion degrades to a system notice in the
//! transcript instead of surfacing an error.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::fetch::ApiClient;
use crate::types::response::ChatReply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    /// Local notices (e.g. "assistant unavailable"); never sent upstream.
    System,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: ChatRole,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<WireMessage<'a>>,
}

/// Client for the completion endpoint.
pub struct ChatClient {
    api: ApiClient,
}

impl ChatClient {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout_seconds)?,
        })
    }

    pub fn with_token(base_url: String, timeout_seconds: u64, token: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::with_token(base_url, timeout_seconds, Some(token))?,
        })
    }

    /// Send the conversation so far and return the assistant's reply.
    /// Local system notices are filtered out of the payload.
    pub async fn complete(&self, history: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            messages: history
                .iter()
                .filter(|message| message.role != ChatRole::System)
                .map(|message| WireMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
        };
        let reply: ChatReply = self.api.post_json("/completions", &request).await?;
        Ok(reply.reply)
    }
}

/// Conversation state behind the chat launcher.
#[derive(Debug, Default)]
pub struct ChatWidget {
    open: bool,
    messages: Vec<ChatMessage>,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's message and the assistant's answer. On failure the
    /// transcript gets a system notice and the widget stays usable.
    pub async fn send(&mut self, client: &ChatClient, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.messages.push(ChatMessage::new(ChatRole::User, text));

        match client.complete(&self.messages).await {
            Ok(reply) => {
                self.messages
                    .push(ChatMessage::new(ChatRole::Assistant, reply));
            }
            Err(e) => {
                error!("Chat completion failed: {e:#}");
                self.messages.push(ChatMessage::new(
                    ChatRole::System,
                    "The assistant is unavailable right now. Try again in a moment.",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut widget = ChatWidget::new();
        assert!(!widget.is_open());
        assert!(widget.toggle());
        assert!(!widget.toggle());
    }

    #[tokio::test]
    async fn test_blank_input_is_dropped() {
        let client = ChatClient::new("http://localhost:9".to_string(), 1).unwrap();
        let mut widget = ChatWidget::new();
        widget.send(&client, "   ").await;
        assert!(widget.messages().is_empty());
    }

    #[tokio::test]
    async fn test_failed_completion_leaves_system_notice() {
        // Port 9 (discard) refuses connections; the completion call fails.
        let client = ChatClient::new("http://localhost:9".to_string(), 1).unwrap();
        let mut widget = ChatWidget::new();
        widget.send(&client, "hello").await;

        let roles: Vec<ChatRole> = widget.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::System]);
    }

    #[test]
    fn test_system_messages_excluded_from_payload() {
        let history = vec![
            ChatMessage::new(ChatRole::User, "hi"),
            ChatMessage::new(ChatRole::System, "assistant unavailable"),
            ChatMessage::new(ChatRole::User, "still there?"),
        ];
        let request = CompletionRequest {
            messages: history
                .iter()
                .filter(|message| message.role != ChatRole::System)
                .map(|message| WireMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
        };
        assert_eq!(request.messages.len(), 2);
    }
}
