//! Conversation messages and the ordered transcript they form.
//!
//! The transcript is supplied by the caller on every request and is treated
//! as an immutable snapshot. Its order is the only notion of time the engine
//! has; messages are never edited after construction.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person describing their symptoms.
    User,
    /// The intake assistant.
    Assistant,
}

/// A single turn of the conversation.
///
/// Text is always non-blank; use [`Message::new`] which rejects blank input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    text: String,
}

impl Message {
    /// Creates a message, returning `None` when the text is empty or whitespace.
    pub fn new(role: Role, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { role, text })
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Option<Self> {
        Self::new(Role::User, text)
    }

    /// Creates an assistant message.
    pub fn assistant(text: impl Into<String>) -> Option<Self> {
        Self::new(Role::Assistant, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Ordered, append-only sequence of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transcript from raw role/text records.
    ///
    /// Records with blank text are dropped; the relative order of the
    /// remaining records is preserved.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (Role, S)>,
        S: Into<String>,
    {
        let messages = records
            .into_iter()
            .filter_map(|(role, text)| Message::new(role, text))
            .collect();
        Self { messages }
    }

    /// Returns a new transcript with `message` appended.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user-authored turns.
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }

    /// All user-authored text, lower-cased and joined by single spaces.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.text().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }
}
