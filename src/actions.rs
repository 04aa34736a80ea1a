use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{QaCatalog, QaEntry};
use crate::config::{PacingConfig, Texts};
use crate::error::ApiError;
use crate::menu::{ButtonMenu, Menus, BACK_TO_MAIN, CONTACT_CURATOR, END_DIALOG, SHOW_FAQ};
use crate::platform::{ChatId, MessageAck, OutboundMessage, Platform};

/// What a button press asks for. Resolved from the payload alone: the bot
/// keeps no per-chat state, so every press is handled from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction<'a> {
    EndDialog,
    ContactCurator,
    ShowFaq,
    BackToMain,
    Answer(&'a QaEntry),
    NotFound,
}

impl<'a> CallbackAction<'a> {
    pub fn resolve(payload: &str, catalog: &'a QaCatalog, curator_enabled: bool) -> Self {
        match payload {
            END_DIALOG => CallbackAction::EndDialog,
            CONTACT_CURATOR if curator_enabled => CallbackAction::ContactCurator,
            SHOW_FAQ => CallbackAction::ShowFaq,
            BACK_TO_MAIN => CallbackAction::BackToMain,
            id => catalog
                .lookup(id)
                .map(CallbackAction::Answer)
                .unwrap_or(CallbackAction::NotFound),
        }
    }
}

/// Produces the bot's outbound messages. Every handler targets one chat and
/// swallows API failures after logging them.
pub struct Responder {
    platform: Arc<dyn Platform>,
    catalog: Arc<QaCatalog>,
    menus: Menus,
    texts: Texts,
    pacing: PacingConfig,
    curator_url: Option<String>,
}

impl Responder {
    pub fn new(
        platform: Arc<dyn Platform>,
        catalog: Arc<QaCatalog>,
        menus: Menus,
        texts: Texts,
        pacing: PacingConfig,
        curator_url: Option<String>,
    ) -> Self {
        Self {
            platform,
            catalog,
            menus,
            texts,
            pacing,
            curator_url,
        }
    }

    pub async fn welcome(&self, chat_id: ChatId) {
        if self
            .send_menu(chat_id, &self.texts.welcome, &self.menus.home)
            .await
            .is_some()
        {
            info!("Sent welcome to chat_id={}", chat_id);
        }
    }

    pub async fn unsupported_text(&self, chat_id: ChatId) {
        if self
            .send_menu(chat_id, &self.texts.unsupported_text, &self.menus.home)
            .await
            .is_some()
        {
            info!("Sent text-not-supported notice to chat_id={}", chat_id);
        }
    }

    pub async fn show_home_menu(&self, chat_id: ChatId) {
        if self
            .send_menu(chat_id, &self.texts.home_menu, &self.menus.home)
            .await
            .is_some()
        {
            info!("Sent main menu to chat_id={}", chat_id);
        }
    }

    pub async fn show_questions_menu(&self, chat_id: ChatId) {
        if self
            .send_menu(chat_id, &self.texts.questions_menu, &self.menus.questions)
            .await
            .is_some()
        {
            info!("Sent question menu to chat_id={}", chat_id);
        }
    }

    pub async fn farewell(&self, chat_id: ChatId) {
        let message = OutboundMessage::text(&self.texts.farewell);
        if self.send(chat_id, &message).await.is_some() {
            info!("Sent farewell to chat_id={}", chat_id);
        }
    }

    pub async fn curator_link(&self, chat_id: ChatId) {
        let Some(url) = &self.curator_url else {
            warn!("Curator link requested but no curator_url is configured");
            return;
        };
        let message = OutboundMessage::text(self.texts.curator_contact.replace("{url}", url));
        if self.send(chat_id, &message).await.is_some() {
            info!("Sent curator link to chat_id={}", chat_id);
        }
    }

    /// Handle a button press: acknowledge exactly once, then follow up.
    pub async fn handle_callback(&self, callback_id: &str, payload: &str, chat_id: ChatId) {
        let action = CallbackAction::resolve(payload, &self.catalog, self.curator_url.is_some());

        let notification = match action {
            CallbackAction::EndDialog => &self.texts.notify_end,
            CallbackAction::ContactCurator => &self.texts.notify_curator,
            CallbackAction::ShowFaq => &self.texts.notify_show_faq,
            CallbackAction::BackToMain => &self.texts.notify_back,
            CallbackAction::Answer(_) => &self.texts.notify_loading,
            CallbackAction::NotFound => &self.texts.notify_not_found,
        };
        let acked = self.platform.answer_callback(callback_id, notification);
        settle("answer callback", acked.await);

        match action {
            CallbackAction::EndDialog => {
                info!("User ended the dialog (chat_id={})", chat_id);
                self.pause(self.pacing.ack_delay()).await;
                self.farewell(chat_id).await;
            }
            CallbackAction::ContactCurator => {
                info!("User asked for the curator (chat_id={})", chat_id);
                self.pause(self.pacing.ack_delay()).await;
                self.curator_link(chat_id).await;
            }
            CallbackAction::ShowFaq => {
                info!("User opened the FAQ (chat_id={})", chat_id);
                self.pause(self.pacing.ack_delay()).await;
                self.show_questions_menu(chat_id).await;
            }
            CallbackAction::BackToMain => {
                info!("User returned to the main menu (chat_id={})", chat_id);
                self.pause(self.pacing.ack_delay()).await;
                self.show_home_menu(chat_id).await;
            }
            CallbackAction::Answer(entry) => {
                info!("Answering '{}' (chat_id={})", entry.question, chat_id);
                self.pause(self.pacing.ack_delay()).await;
                let answer = OutboundMessage::text(&entry.answer);
                self.send(chat_id, &answer).await;
                self.pause(self.pacing.menu_delay()).await;
                self.show_questions_menu(chat_id).await;
            }
            CallbackAction::NotFound => {
                warn!("No answer for payload '{}' (chat_id={})", payload, chat_id);
            }
        }
    }

    async fn send_menu(
        &self,
        chat_id: ChatId,
        text: &str,
        menu: &ButtonMenu,
    ) -> Option<MessageAck> {
        let keyboard = menu.to_attachment();
        let message = OutboundMessage::text(text).with_attachment(keyboard);
        self.send(chat_id, &message).await
    }

    async fn send(&self, chat_id: ChatId, message: &OutboundMessage) -> Option<MessageAck> {
        let sent = self.platform.send_message(chat_id, message).await;
        let ack = settle("send message", sent)?;
        if let Some(mid) = &ack.mid {
            debug!("Delivered {} to chat_id={}", mid, chat_id);
        }
        Some(ack)
    }

    async fn pause(&self, delay: std::time::Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Log a failed platform call and turn it into absence.
fn settle<T>(op: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to {}: {}", op, e);
            None
        }
    }
}
