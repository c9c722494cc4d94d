//! Telegram Bot API Client
//!
//! Implements [`ChatTransport`] with `sendMessage`, `editMessageText`,
//! `deleteMessage` and `answerCallbackQuery`, and an [`EventSource`] over
//! `getUpdates` long polling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::types::{to_event, ApiResponse, InlineKeyboardMarkup, Message, Update};
use crate::ports::{
    ChatError, ChatId, ChatTransport, EventSource, InboundEvent, MessageRef, OutboundMessage,
};

/// Configuration for the TelegramClient
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_url: String,
    /// Bot token (secret)
    pub bot_token: String,
    /// Long-poll timeout passed to getUpdates
    pub poll_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            poll_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    config: TelegramConfig,
    http: Client,
}

impl TelegramClient {
    pub fn with_config(config: TelegramConfig) -> Result<Self, ChatError> {
        // must outlive the long poll
        let http = Client::builder()
            .timeout(config.poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(|e| ChatError::Http(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, ChatError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            // reqwest errors embed the URL, which carries the token
            .map_err(|e| ChatError::Http(e.without_url().to_string()))?;

        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.without_url().to_string()))?;

        if !parsed.ok {
            return Err(ChatError::Api {
                code: parsed.error_code.unwrap_or_default(),
                description: parsed.description.unwrap_or_default(),
            });
        }
        parsed
            .result
            .ok_or_else(|| ChatError::Parse(format!("{} returned no result", method)))
    }

    fn message_body(message: &OutboundMessage) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("text".into(), json!(message.text));
        if message.markdown {
            body.insert("parse_mode".into(), json!("Markdown"));
        }
        if let Some(keyboard) = &message.keyboard {
            body.insert(
                "reply_markup".into(),
                json!(InlineKeyboardMarkup::from(keyboard)),
            );
        }
        body
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ChatError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": self.config.poll_timeout.as_secs(),
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    /// Long-polling event source starting from the next unseen update
    pub fn poller(&self) -> TelegramPoller {
        TelegramPoller {
            client: self.clone(),
            offset: 0,
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageRef, ChatError> {
        let mut body = Self::message_body(message);
        body.insert("chat_id".into(), json!(chat_id));

        let sent: Message = self.call("sendMessage", Value::Object(body)).await?;
        Ok(sent.reference())
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        message: &OutboundMessage,
    ) -> Result<(), ChatError> {
        let mut body = Self::message_body(message);
        body.insert("chat_id".into(), json!(target.chat_id));
        body.insert("message_id".into(), json!(target.message_id));

        match self
            .call::<Value>("editMessageText", Value::Object(body))
            .await
        {
            Ok(_) => Ok(()),
            // re-rendering an unchanged screen is not an error
            Err(ChatError::Api { description, .. })
                if description.contains("message is not modified") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_message(&self, target: MessageRef) -> Result<(), ChatError> {
        self.call::<bool>(
            "deleteMessage",
            json!({ "chat_id": target.chat_id, "message_id": target.message_id }),
        )
        .await
        .map(|_| ())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), ChatError> {
        self.call::<bool>(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_id }),
        )
        .await
        .map(|_| ())
    }
}

/// `getUpdates` long poller
pub struct TelegramPoller {
    client: TelegramClient,
    offset: i64,
}

#[async_trait]
impl EventSource for TelegramPoller {
    async fn next_batch(&mut self) -> Result<Vec<InboundEvent>, ChatError> {
        let updates = self.client.get_updates(self.offset).await?;

        let mut events = Vec::with_capacity(updates.len());
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            let update_id = update.update_id;
            match to_event(update) {
                Some(event) => events.push(event),
                None => debug!("Skipping unsupported update {}", update_id),
            }
        }

        if !events.is_empty() {
            debug!("Received {} events (next offset {})", events.len(), self.offset);
        }
        Ok(events)
    }
}
