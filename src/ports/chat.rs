use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Action;

pub type ChatId = i64;

/// Chat transport error type
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Response parsing error: {0}")]
    Parse(String),
}

/// A rendered message, addressable for edits and deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: i64,
}

/// Inline button carrying an action token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: &Action) -> Self {
        Self {
            label: label.into(),
            token: action.to_string(),
        }
    }

    pub fn back(action: &Action) -> Self {
        Self::new("🔙 Back", action)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    pub fn button(self, label: impl Into<String>, action: &Action) -> Self {
        self.row(vec![Button::new(label, action)])
    }

    /// Keyboard holding a single Back button
    pub fn back_to(action: &Action) -> Self {
        Self::new().row(vec![Button::back(action)])
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.token.as_str())
            .collect()
    }
}

/// Outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub markdown: bool,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            markdown: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            markdown: true,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Who sent an inbound event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    pub id: String,
    pub username: Option<String>,
}

/// Inbound event from the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        from: UserIdentity,
        chat_id: ChatId,
        name: String,
    },
    Text {
        from: UserIdentity,
        chat_id: ChatId,
        text: String,
        message: MessageRef,
    },
    Button {
        from: UserIdentity,
        chat_id: ChatId,
        token: String,
        callback_id: String,
        message: Option<MessageRef>,
    },
}

impl InboundEvent {
    pub fn user(&self) -> &UserIdentity {
        match self {
            InboundEvent::Command { from, .. }
            | InboundEvent::Text { from, .. }
            | InboundEvent::Button { from, .. } => from,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            InboundEvent::Command { chat_id, .. }
            | InboundEvent::Text { chat_id, .. }
            | InboundEvent::Button { chat_id, .. } => *chat_id,
        }
    }
}

/// Chat transport port trait
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageRef, ChatError>;

    /// Replace the text and keyboard of an existing message
    async fn edit_message(&self, target: MessageRef, message: &OutboundMessage)
        -> Result<(), ChatError>;

    async fn delete_message(&self, target: MessageRef) -> Result<(), ChatError>;

    /// Acknowledge a button press so the client stops its spinner
    async fn acknowledge(&self, callback_id: &str) -> Result<(), ChatError>;
}

/// Source of inbound events (long polling, webhooks, test scripts)
#[async_trait]
pub trait EventSource: Send {
    async fn next_batch(&mut self) -> Result<Vec<InboundEvent>, ChatError>;
}
