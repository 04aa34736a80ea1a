use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const TOKEN_ENV: &str = "BOT_TOKEN";
pub const CONFIG_ENV: &str = "FAQBOT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "faqbot.toml";

const WELCOME: &str = "Hello! I'm the help desk assistant bot and I can answer the most \
                       common questions.\n\nWhat are you interested in?";
const CURATOR_CONTACT: &str = "For a personal consultation, message the curator:\n\n{url}\n\n\
                               The curator will reply as soon as possible.";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub faq: FaqConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub texts: Texts,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Must exceed the long-poll timeout, otherwise every idle poll fails
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u32,
    #[serde(default = "default_poll_limit")]
    pub limit: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

/// UI pacing between an acknowledgement and the messages that follow it.
#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    #[serde(default = "default_ack_delay_ms")]
    pub ack_delay_ms: u64,
    #[serde(default = "default_menu_delay_ms")]
    pub menu_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FaqConfig {
    #[serde(default = "default_faq_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MenuLayout {
    /// Questions and service buttons in a single menu
    #[default]
    Flat,
    /// A section menu leading to a separate question list
    Sectioned,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuConfig {
    #[serde(default)]
    pub layout: MenuLayout,
    /// External discussion channel, shown as a link button
    #[serde(default)]
    pub channel_url: Option<String>,
    /// Where `contact_curator` points; the button is hidden when unset
    #[serde(default)]
    pub curator_url: Option<String>,
    #[serde(default = "default_faq_button")]
    pub faq_button: String,
    #[serde(default = "default_curator_button")]
    pub curator_button: String,
    #[serde(default = "default_channel_button")]
    pub channel_button: String,
    #[serde(default = "default_end_button")]
    pub end_button: String,
    #[serde(default = "default_back_button")]
    pub back_button: String,
}

/// Every user-visible string the bot sends.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Texts {
    pub welcome: String,
    pub home_menu: String,
    pub questions_menu: String,
    pub unsupported_text: String,
    pub farewell: String,
    /// `{url}` is replaced with the curator link
    pub curator_contact: String,
    pub notify_end: String,
    pub notify_curator: String,
    pub notify_show_faq: String,
    pub notify_back: String,
    pub notify_loading: String,
    pub notify_not_found: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_poll_timeout_secs(),
            limit: default_poll_limit(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            ack_delay_ms: default_ack_delay_ms(),
            menu_delay_ms: default_menu_delay_ms(),
        }
    }
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            path: default_faq_path(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            layout: MenuLayout::default(),
            channel_url: None,
            curator_url: None,
            faq_button: default_faq_button(),
            curator_button: default_curator_button(),
            channel_button: default_channel_button(),
            end_button: default_end_button(),
            back_button: default_back_button(),
        }
    }
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            welcome: WELCOME.to_string(),
            home_menu: "Choose a section:".to_string(),
            questions_menu: "Choose the question you are interested in:".to_string(),
            unsupported_text: "I don't read text messages, please use the buttons.".to_string(),
            farewell: "Thank you for reaching out! Glad we could help.".to_string(),
            curator_contact: CURATOR_CONTACT.to_string(),
            notify_end: "Ending the dialog...".to_string(),
            notify_curator: "Opening the curator chat...".to_string(),
            notify_show_faq: "Opening the FAQ...".to_string(),
            notify_back: "Back to the main menu...".to_string(),
            notify_loading: "Loading...".to_string(),
            notify_not_found: "Sorry, nothing was found.".to_string(),
        }
    }
}

fn default_base_url() -> String {
    "https://platform-api.max.ru".to_string()
}

fn default_request_timeout_secs() -> u64 {
    45
}

fn default_poll_timeout_secs() -> u32 {
    30
}

fn default_poll_limit() -> u32 {
    100
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_ack_delay_ms() -> u64 {
    300
}

fn default_menu_delay_ms() -> u64 {
    500
}

fn default_faq_path() -> PathBuf {
    PathBuf::from("qa_data.json")
}

fn default_faq_button() -> String {
    "📝 Frequently asked questions".to_string()
}

fn default_curator_button() -> String {
    "📲 Chat with a curator".to_string()
}

fn default_channel_button() -> String {
    "💬 Still have questions?".to_string()
}

fn default_end_button() -> String {
    "👋 End dialog".to_string()
}

fn default_back_button() -> String {
    "🔙 Back to main menu".to_string()
}

impl PollingConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl PacingConfig {
    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }

    pub fn menu_delay(&self) -> Duration {
        Duration::from_millis(self.menu_delay_ms)
    }
}

impl Config {
    /// Load settings from `FAQBOT_CONFIG` or `faqbot.toml`.
    ///
    /// A missing default file yields the built-in defaults; a file named
    /// explicitly through the environment must exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_ENV).ok();
        Self::load_or_default(explicit.as_deref(), Path::new(DEFAULT_CONFIG_PATH))
    }

    fn load_or_default(explicit: Option<&str>, fallback: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.is_empty() => Self::load(Path::new(path)),
            _ if fallback.exists() => Self::load(fallback),
            _ => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(invalid("api.base_url", "must not be empty"));
        }
        if self.polling.limit == 0 || self.polling.limit > 1000 {
            return Err(invalid(
                "polling.limit",
                format!("{} is outside 1..=1000", self.polling.limit),
            ));
        }
        if self.polling.timeout_secs > 90 {
            return Err(invalid(
                "polling.timeout_secs",
                format!("{}s exceeds the maximum of 90s", self.polling.timeout_secs),
            ));
        }
        if self.api.request_timeout_secs <= u64::from(self.polling.timeout_secs) {
            return Err(invalid(
                "api.request_timeout_secs",
                format!(
                    "{} must be greater than polling.timeout_secs ({})",
                    self.api.request_timeout_secs, self.polling.timeout_secs
                ),
            ));
        }
        for (key, url) in [
            ("menu.channel_url", &self.menu.channel_url),
            ("menu.curator_url", &self.menu.curator_url),
        ] {
            if matches!(url, Some(u) if u.trim().is_empty()) {
                return Err(invalid(key, "must not be empty when set"));
            }
        }
        Ok(())
    }

    /// FAQ file: CLI argument first, then `[faq] path`.
    pub fn faq_path(&self, cli_arg: Option<PathBuf>) -> PathBuf {
        cli_arg.unwrap_or_else(|| self.faq.path.clone())
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

/// Read the bot access token from `BOT_TOKEN`.
pub fn resolve_token() -> Result<String, ConfigError> {
    token_from(std::env::var(TOKEN_ENV).ok())
}

fn token_from(value: Option<String>) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ConfigError::MissingToken),
    }
}
