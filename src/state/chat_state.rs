//! ChatState - Chat Session with the Backend Agent

use crate::constants::CHAT_FALLBACK;
use crate::domain::api::{ApiOutcome, ChatReply};

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

/// Transcript plus the server-assigned conversation thread
#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    thread_id: Option<String>,
    pending: usize,
}

impl ChatState {
    /// Record a user message; returns the query to send, or `None` for blank input
    pub fn begin(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }

        self.messages.push(ChatMessage {
            sender: Sender::User,
            text: input.to_string(),
        });
        self.pending += 1;
        Some(input.to_string())
    }

    /// Record the bot's answer (or the fallback) and returns its text
    pub fn apply(&mut self, outcome: ApiOutcome<ChatReply>) -> &str {
        self.pending = self.pending.saturating_sub(1);
        let text = match outcome {
            ApiOutcome::Ready(reply) => {
                if let Some(thread_id) = reply.thread_id.filter(|t| !t.is_empty()) {
                    self.thread_id = Some(thread_id);
                }
                reply.response
            }
            ApiOutcome::Failed { reason } => {
                tracing::error!("Chat error: {}", reason);
                CHAT_FALLBACK.to_string()
            }
        };

        self.messages.push(ChatMessage {
            sender: Sender::Bot,
            text,
        });
        self.messages
            .last()
            .map(|m| m.text.as_str())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn is_waiting(&self) -> bool {
        self.pending > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_ignored() {
        let mut chat = ChatState::default();
        assert_eq!(chat.begin("   "), None);
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_thread_id_is_kept_for_follow_ups() {
        let mut chat = ChatState::default();
        assert_eq!(chat.begin("How are emissions?").as_deref(), Some("How are emissions?"));
        assert!(chat.is_waiting());

        let text = chat.apply(ApiOutcome::Ready(ChatReply {
            response: "Emissions are stable.".to_string(),
            thread_id: Some("thread-1".to_string()),
        }));
        assert_eq!(text, "Emissions are stable.");
        assert_eq!(chat.thread_id(), Some("thread-1"));
        assert!(!chat.is_waiting());

        chat.begin("And waste?");
        chat.apply(ApiOutcome::Ready(ChatReply {
            response: "Waste is at 58%.".to_string(),
            thread_id: None,
        }));
        assert_eq!(chat.thread_id(), Some("thread-1"));
        assert_eq!(chat.messages().len(), 4);
    }

    #[test]
    fn test_failure_appends_fallback() {
        let mut chat = ChatState::default();
        chat.begin("hello");
        chat.apply(ApiOutcome::Failed { reason: "offline".into() });
        let last = chat.messages().last().expect("message");
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, CHAT_FALLBACK);
    }
}
