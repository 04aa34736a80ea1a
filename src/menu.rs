use serde::Serialize;

use crate::catalog::QaCatalog;
use crate::config::{MenuConfig, MenuLayout};
use crate::platform::Attachment;

pub const END_DIALOG: &str = "end_dialog";
pub const SHOW_FAQ: &str = "show_faq";
pub const CONTACT_CURATOR: &str = "contact_curator";
pub const BACK_TO_MAIN: &str = "back_to_main";

/// Service payloads that a question id may never take.
pub const RESERVED_PAYLOADS: [&str; 4] = [END_DIALOG, SHOW_FAQ, CONTACT_CURATOR, BACK_TO_MAIN];

/// A single inline keyboard button, serialized in the platform's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    Callback { text: String, payload: String },
    Link { text: String, url: String },
}

impl Button {
    pub fn callback(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Button::Callback {
            text: text.into(),
            payload: payload.into(),
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Link {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Ordered rows of buttons
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ButtonMenu {
    pub rows: Vec<Vec<Button>>,
}

impl ButtonMenu {
    pub fn to_attachment(&self) -> Attachment {
        Attachment::inline_keyboard(self.rows.clone())
    }
}

/// The two menus the bot ever shows, built once at startup.
#[derive(Debug, Clone)]
pub struct Menus {
    /// Shown on start, on free text and on `back_to_main`
    pub home: ButtonMenu,
    /// Shown after an answer and on `show_faq`
    pub questions: ButtonMenu,
}

impl Menus {
    pub fn build(catalog: &QaCatalog, config: &MenuConfig) -> Self {
        match config.layout {
            MenuLayout::Flat => {
                let main = build_main_menu(catalog, config);
                Self {
                    home: main.clone(),
                    questions: main,
                }
            }
            MenuLayout::Sectioned => Self {
                home: build_sections_menu(config),
                questions: build_faq_menu(catalog, config),
            },
        }
    }
}

fn question_rows(catalog: &QaCatalog) -> Vec<Vec<Button>> {
    catalog
        .entries()
        .iter()
        .map(|entry| vec![Button::callback(&entry.question, &entry.id)])
        .collect()
}

/// One row per question in catalog order, then a single row of service buttons.
pub fn build_main_menu(catalog: &QaCatalog, config: &MenuConfig) -> ButtonMenu {
    let mut rows = question_rows(catalog);

    let mut service = Vec::new();
    if config.curator_url.is_some() {
        service.push(Button::callback(&config.curator_button, CONTACT_CURATOR));
    }
    if let Some(url) = &config.channel_url {
        service.push(Button::link(&config.channel_button, url));
    }
    service.push(Button::callback(&config.end_button, END_DIALOG));
    rows.push(service);

    ButtonMenu { rows }
}

/// Top level of the sectioned layout: one service action per row.
pub fn build_sections_menu(config: &MenuConfig) -> ButtonMenu {
    let mut actions = vec![Button::callback(&config.faq_button, SHOW_FAQ)];
    if config.curator_url.is_some() {
        actions.push(Button::callback(&config.curator_button, CONTACT_CURATOR));
    }
    if let Some(url) = &config.channel_url {
        actions.push(Button::link(&config.channel_button, url));
    }
    actions.push(Button::callback(&config.end_button, END_DIALOG));

    let rows = actions.into_iter().map(|button| vec![button]).collect();
    ButtonMenu { rows }
}

/// Question list of the sectioned layout, closed by a "back" row.
pub fn build_faq_menu(catalog: &QaCatalog, config: &MenuConfig) -> ButtonMenu {
    let mut rows = question_rows(catalog);
    rows.push(vec![Button::callback(&config.back_button, BACK_TO_MAIN)]);
    ButtonMenu { rows }
}
