//! Recording fake of [`Platform`] shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::platform::{
    Attachment, BotInfo, ChatId, Marker, MessageAck, OutboundMessage, Platform, UpdateBatch,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ack {
        callback_id: String,
        notification: String,
    },
    Send {
        chat_id: ChatId,
        message: OutboundMessage,
    },
    Fetch { marker: Option<Marker> },
}

pub fn has_keyboard(message: &OutboundMessage) -> bool {
    message
        .attachments
        .iter()
        .any(|a| matches!(a, Attachment::InlineKeyboard { .. }))
}

pub fn protocol_error(endpoint: &'static str) -> ApiError {
    ApiError::Protocol {
        endpoint,
        status: 503,
        code: Some("service.unavailable".to_string()),
        message: None,
    }
}

#[derive(Default)]
pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    fetches: Mutex<VecDeque<Result<UpdateBatch, ApiError>>>,
    exhausted: Mutex<Option<oneshot::Sender<()>>>,
    fail_sends: bool,
    fail_acks: bool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the results of successive `fetch_updates` calls. Once they run
    /// out, the returned receiver fires and further fetches never complete.
    pub fn with_fetches(
        fetches: Vec<Result<UpdateBatch, ApiError>>,
    ) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let platform = Self {
            fetches: Mutex::new(fetches.into()),
            exhausted: Mutex::new(Some(tx)),
            ..Self::default()
        };
        (platform, rx)
    }

    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn failing_acks() -> Self {
        Self {
            fail_acks: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn acks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Ack { notification, .. } => Some(notification),
                _ => None,
            })
            .collect()
    }

    pub fn fetch_markers(&self) -> Vec<Option<Marker>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Fetch { marker } => Some(marker),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn get_bot_info(&self) -> Result<BotInfo, ApiError> {
        Ok(BotInfo {
            user_id: 1000,
            name: "FAQ bot".to_string(),
            username: Some("faq_bot".to_string()),
        })
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageAck, ApiError> {
        self.record(Call::Send {
            chat_id,
            message: message.clone(),
        });
        if self.fail_sends {
            return Err(protocol_error("POST /messages"));
        }
        Ok(MessageAck::default())
    }

    async fn answer_callback(&self, callback_id: &str, notification: &str) -> Result<(), ApiError> {
        self.record(Call::Ack {
            callback_id: callback_id.to_string(),
            notification: notification.to_string(),
        });
        if self.fail_acks {
            return Err(protocol_error("POST /answers"));
        }
        Ok(())
    }

    async fn fetch_updates(
        &self,
        marker: Option<Marker>,
        _timeout: u32,
        _limit: u32,
    ) -> Result<UpdateBatch, ApiError> {
        self.record(Call::Fetch { marker });
        let next = self.fetches.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                let exhausted = self.exhausted.lock().unwrap().take();
                if let Some(tx) = exhausted {
                    let _ = tx.send(());
                }
                std::future::pending().await
            }
        }
    }
}
