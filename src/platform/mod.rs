pub mod max;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::menu::Button;

pub type ChatId = i64;

/// Opaque resumption token of the update feed
pub type Marker = i64;

/// The four calls the bot makes against the messaging platform.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn get_bot_info(&self) -> Result<BotInfo, ApiError>;

    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageAck, ApiError>;

    /// Must be called exactly once per button press so the client clears its spinner.
    async fn answer_callback(
        &self,
        callback_id: &str,
        notification: &str,
    ) -> Result<(), ApiError>;

    /// Long poll: the server holds the request for up to `timeout` seconds.
    async fn fetch_updates(
        &self,
        marker: Option<Marker>,
        timeout: u32,
        limit: u32,
    ) -> Result<UpdateBatch, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotInfo {
    pub user_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageAck {
    pub mid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    InlineKeyboard { payload: KeyboardPayload },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardPayload {
    pub buttons: Vec<Vec<Button>>,
}

impl Attachment {
    pub fn inline_keyboard(buttons: Vec<Vec<Button>>) -> Self {
        Attachment::InlineKeyboard {
            payload: KeyboardPayload { buttons },
        }
    }
}

/// One `GET /updates` response
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    pub updates: Vec<Update>,
    pub marker: Option<Marker>,
}

/// An event from the long-polling feed.
///
/// Fields are optional on the wire; the router decides what is required.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    BotStarted(BotStarted),
    MessageCreated(MessageCreated),
    MessageCallback(MessageCallback),
    Unsupported { update_type: String },
    Malformed { update_type: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotStarted {
    pub timestamp: Option<i64>,
    pub chat_id: Option<ChatId>,
    pub user: Option<User>,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageCreated {
    pub timestamp: Option<i64>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageCallback {
    pub timestamp: Option<i64>,
    pub callback: Option<Callback>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub user_id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Message {
    pub sender: Option<User>,
    pub recipient: Option<Recipient>,
    pub body: Option<MessageBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Recipient {
    pub chat_id: Option<ChatId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageBody {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Callback {
    pub callback_id: Option<String>,
    pub payload: Option<String>,
    pub user: Option<User>,
}

impl Message {
    pub fn chat_id(&self) -> Option<ChatId> {
        self.recipient.as_ref().and_then(|r| r.chat_id)
    }
}

impl Update {
    /// Decode one element of the `updates` array. Never fails: unknown kinds
    /// and undecodable bodies become `Unsupported` / `Malformed`.
    pub fn from_value(value: Value) -> Self {
        let update_type = value
            .get("update_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let decoded = match update_type.as_str() {
            "bot_started" => serde_json::from_value(value).map(Update::BotStarted),
            "message_created" => serde_json::from_value(value).map(Update::MessageCreated),
            "message_callback" => serde_json::from_value(value).map(Update::MessageCallback),
            _ => return Update::Unsupported { update_type },
        };

        decoded.unwrap_or_else(|e| Update::Malformed {
            update_type,
            reason: e.to_string(),
        })
    }

    pub fn kind(&self) -> &str {
        match self {
            Update::BotStarted(_) => "bot_started",
            Update::MessageCreated(_) => "message_created",
            Update::MessageCallback(_) => "message_callback",
            Update::Unsupported { update_type } | Update::Malformed { update_type, .. } => {
                update_type.as_str()
            }
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let millis = match self {
            Update::BotStarted(u) => u.timestamp,
            Update::MessageCreated(u) => u.timestamp,
            Update::MessageCallback(u) => u.timestamp,
            _ => None,
        }?;
        DateTime::from_timestamp_millis(millis)
    }
}
