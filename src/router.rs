use tracing::{info, warn};

use crate::actions::Responder;
use crate::error::RoutingAnomaly;
use crate::platform::{ChatId, Message, Update, User};

const DEFAULT_NAME: &str = "Guest";

/// An update that carries everything its handler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BotStarted {
        chat_id: ChatId,
        user_name: String,
        start_payload: Option<String>,
    },
    MessageReceived {
        chat_id: ChatId,
        sender_id: Option<i64>,
        sender_name: String,
        text: String,
    },
    ButtonPressed {
        callback_id: String,
        payload: String,
        chat_id: ChatId,
        user_name: String,
    },
}

fn display_name(user: Option<&User>) -> String {
    user.and_then(|u| u.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

fn missing(update_type: &'static str, field: &'static str) -> RoutingAnomaly {
    RoutingAnomaly::MissingField { update_type, field }
}

/// Check that an update has the fields its handler requires.
pub fn classify(update: Update) -> Result<Event, RoutingAnomaly> {
    match update {
        Update::BotStarted(started) => {
            let Some(chat_id) = started.chat_id else {
                return Err(missing("bot_started", "chat_id"));
            };
            Ok(Event::BotStarted {
                chat_id,
                user_name: display_name(started.user.as_ref()),
                start_payload: started.payload.filter(|p| !p.is_empty()),
            })
        }
        Update::MessageCreated(created) => {
            let message = created.message.unwrap_or_default();
            let Some(chat_id) = message.chat_id() else {
                return Err(missing("message_created", "chat_id"));
            };
            Ok(Event::MessageReceived {
                chat_id,
                sender_id: message.sender.as_ref().and_then(|s| s.user_id),
                sender_name: display_name(message.sender.as_ref()),
                text: message.body.and_then(|b| b.text).unwrap_or_default(),
            })
        }
        Update::MessageCallback(pressed) => {
            let callback = pressed.callback.unwrap_or_default();
            let Some(callback_id) = callback.callback_id.filter(|id| !id.is_empty()) else {
                return Err(missing("message_callback", "callback_id"));
            };
            let Some(chat_id) = pressed.message.as_ref().and_then(Message::chat_id) else {
                return Err(missing("message_callback", "chat_id"));
            };
            Ok(Event::ButtonPressed {
                callback_id,
                payload: callback.payload.unwrap_or_default(),
                chat_id,
                user_name: display_name(callback.user.as_ref()),
            })
        }
        Update::Unsupported { update_type } => Err(RoutingAnomaly::Unsupported(update_type)),
        Update::Malformed {
            update_type,
            reason,
        } => Err(RoutingAnomaly::Malformed {
            update_type,
            reason,
        }),
    }
}

/// Dispatches each update to the matching [`Responder`] action.
pub struct Router {
    responder: Responder,
    /// Messages authored by this id are the bot's own and are skipped
    bot_user_id: Option<i64>,
}

impl Router {
    pub fn new(responder: Responder, bot_user_id: Option<i64>) -> Self {
        Self {
            responder,
            bot_user_id,
        }
    }

    pub async fn route(&self, update: Update) {
        let kind = update.kind().to_string();
        match update.timestamp() {
            Some(ts) => info!("Received {} update (at {})", kind, ts.to_rfc3339()),
            None => info!("Received {} update", kind),
        }

        let event = match classify(update) {
            Ok(event) => event,
            Err(anomaly) => {
                warn!("Dropping update: {}", anomaly);
                return;
            }
        };

        match event {
            Event::BotStarted {
                chat_id,
                user_name,
                start_payload,
            } => {
                info!("User {} (chat_id={}) started the bot", user_name, chat_id);
                if let Some(payload) = start_payload {
                    info!("  start payload: {}", payload);
                }
                self.responder.welcome(chat_id).await;
            }
            Event::MessageReceived {
                chat_id,
                sender_id,
                sender_name,
                text,
            } => {
                if sender_id.is_some() && sender_id == self.bot_user_id {
                    return;
                }
                info!("Message from {}: {}", sender_name, preview(&text));
                self.responder.unsupported_text(chat_id).await;
            }
            Event::ButtonPressed {
                callback_id,
                payload,
                chat_id,
                user_name,
            } => {
                info!("{} pressed button '{}'", user_name, payload);
                self.responder
                    .handle_callback(&callback_id, &payload, chat_id)
                    .await;
            }
        }
    }
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 50;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    }
}
