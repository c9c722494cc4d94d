//! Telegram Bot API wire types (the subset the bot uses).

use serde::{Deserialize, Serialize};

use crate::ports::{InboundEvent, Keyboard, MessageRef, UserIdentity};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.label.clone(),
                            callback_data: b.token.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
        }
    }
}

impl Message {
    pub fn reference(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat.id,
            message_id: self.message_id,
        }
    }
}

/// `/start@my_bot args` -> `start`
fn command_name(text: &str) -> Option<String> {
    let first = text.strip_prefix('/')?.split_whitespace().next()?;
    let name = first.split('@').next().unwrap_or(first);
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

/// Convert an update into an inbound event; updates the bot does not
/// handle (stickers, edits, channel posts) yield `None`.
pub fn to_event(update: Update) -> Option<InboundEvent> {
    if let Some(query) = update.callback_query {
        let message = query.message.as_ref().map(Message::reference);
        let chat_id = message.map(|m| m.chat_id).unwrap_or(query.from.id);
        return Some(InboundEvent::Button {
            from: UserIdentity::from(&query.from),
            chat_id,
            token: query.data.unwrap_or_default(),
            callback_id: query.id,
            message,
        });
    }

    let message = update.message?;
    let from = UserIdentity::from(message.from.as_ref()?);
    let text = message.text.clone()?;

    if let Some(name) = command_name(&text) {
        return Some(InboundEvent::Command {
            from,
            chat_id: message.chat.id,
            name,
        });
    }

    Some(InboundEvent::Text {
        from,
        chat_id: message.chat.id,
        text,
        message: message.reference(),
    })
}
