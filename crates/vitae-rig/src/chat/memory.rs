//! Token-bounded conversation memory.
//!
//! A [`ChatMemoryBuffer`] holds the conversation of a single request and hands
//! the model the most recent window of it that fits into a token budget.

use super::message::{ChatMessage, Role};
use crate::TRACING_TARGET_MEMORY;

/// Default token budget of a memory buffer.
pub const DEFAULT_TOKEN_LIMIT: usize = 512;

/// Estimates the number of tokens in a text (roughly 4 bytes per token).
#[inline]
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Conversation memory that trims the oldest messages to stay within a token budget.
#[derive(Debug, Clone)]
pub struct ChatMemoryBuffer {
    token_limit: usize,
    messages: Vec<ChatMessage>,
}

impl ChatMemoryBuffer {
    /// Creates an empty buffer with the given token budget.
    pub fn new(token_limit: usize) -> Self {
        Self {
            token_limit,
            messages: Vec::new(),
        }
    }

    /// Returns the token budget.
    #[inline]
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Replaces the stored conversation.
    pub fn set(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Appends a message.
    pub fn put(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Returns every stored message.
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Removes all messages.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// Returns the most recent messages that fit into the budget left after
    /// `initial_token_count` tokens are already spent (e.g. on the system prompt).
    ///
    /// The latest message is always returned, even if it alone exceeds the
    /// budget. A trimmed window never starts with an assistant message.
    pub fn get(&self, initial_token_count: usize) -> Vec<ChatMessage> {
        let Some(last) = self.messages.last() else {
            return Vec::new();
        };

        let budget = self.token_limit.saturating_sub(initial_token_count);
        let mut used = estimate_tokens(&last.content);
        let mut start = self.messages.len() - 1;

        while start > 0 {
            let cost = estimate_tokens(&self.messages[start - 1].content);
            if used + cost > budget {
                break;
            }
            used += cost;
            start -= 1;
        }

        if start > 0 {
            while start < self.messages.len() - 1 && self.messages[start].role == Role::Assistant {
                used -= estimate_tokens(&self.messages[start].content);
                start += 1;
            }

            tracing::debug!(
                target: TRACING_TARGET_MEMORY,
                dropped = start,
                kept = self.messages.len() - start,
                tokens = used,
                token_limit = self.token_limit,
                "Trimmed conversation to fit token budget"
            );
        }

        self.messages[start..].to_vec()
    }
}

impl Default for ChatMemoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tokens: usize) -> String {
        "abcd".repeat(tokens)
    }

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("hi"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn returns_everything_within_budget() {
        let mut memory = ChatMemoryBuffer::default();
        memory.set(vec![
            ChatMessage::assistant("Hello, how can I help?"),
            ChatMessage::user("hi"),
        ]);
        memory.put(ChatMessage::user("What is your experience?"));

        let window = memory.get(0);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].role, Role::Assistant);
        assert_eq!(window[2].content, "What is your experience?");
    }

    #[test]
    fn trims_oldest_messages_first() {
        let mut memory = ChatMemoryBuffer::new(10);
        memory.set(vec![
            ChatMessage::user(text(4)),
            ChatMessage::user(text(4)),
            ChatMessage::user(text(4)),
        ]);

        let window = memory.get(0);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn initial_tokens_reduce_the_window() {
        let mut memory = ChatMemoryBuffer::new(10);
        memory.set(vec![ChatMessage::user(text(4)), ChatMessage::user(text(4))]);

        assert_eq!(memory.get(0).len(), 2);
        assert_eq!(memory.get(3).len(), 1);
    }

    #[test]
    fn trimmed_window_does_not_start_with_assistant() {
        let mut memory = ChatMemoryBuffer::new(12);
        memory.set(vec![
            ChatMessage::user(text(4)),
            ChatMessage::assistant(text(4)),
            ChatMessage::user(text(4)),
            ChatMessage::assistant(text(2)),
            ChatMessage::user(text(2)),
        ]);

        let window = memory.get(0);
        assert_eq!(window.first().map(|m| m.role), Some(Role::User));
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn latest_message_survives_overflow() {
        let mut memory = ChatMemoryBuffer::new(4);
        memory.set(vec![ChatMessage::user("hi")]);
        memory.put(ChatMessage::user(text(50)));

        let window = memory.get(100);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].content.len(), 200);
    }

    #[test]
    fn empty_memory_returns_nothing() {
        let mut memory = ChatMemoryBuffer::default();
        assert!(memory.get(0).is_empty());

        memory.put(ChatMessage::user("hi"));
        memory.reset();
        assert!(memory.all().is_empty());
    }
}
