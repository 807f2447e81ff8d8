//! Chat request types.

use serde::{Deserialize, Serialize};
use vitae_rig::chat::{ChatMessage, Role};

use crate::handler::{ErrorKind, Result};

/// A single message of the conversation sent by the client.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequestMessage {
    /// Author of the message.
    pub role: Role,
    /// Plain-text content.
    pub content: String,
}

impl From<ChatRequestMessage> for ChatMessage {
    fn from(message: ChatRequestMessage) -> Self {
        ChatMessage::new(message.role, message.content)
    }
}

/// Request payload for streaming an answer.
///
/// Unknown top-level fields are ignored.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, ending with the user's question.
    pub messages: Vec<ChatRequestMessage>,
}

impl ChatRequest {
    /// Splits the conversation into the question and its history.
    ///
    /// The question is the content of the last message, which must come from
    /// the user. The history keeps the order and roles of the messages before
    /// it.
    pub fn into_query(self) -> Result<(String, Vec<ChatMessage>)> {
        let mut messages = self.messages;

        let Some(last) = messages.pop() else {
            return Err(ErrorKind::BadRequest.with_message("No messages provided"));
        };

        if last.role != Role::User {
            return Err(ErrorKind::BadRequest
                .with_message("Last message must be from user")
                .with_context(format!("last message role: {}", last.role)));
        }

        let history = messages.into_iter().map(ChatMessage::from).collect();
        Ok((last.content, history))
    }
}
