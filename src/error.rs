use std::path::PathBuf;

use thiserror::Error;

/// Startup failures: bad settings, FAQ source or credential.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set; export the bot access token before starting")]
    MissingToken,

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}: missing top-level `questions` key", .path.display())]
    MissingQuestions { path: PathBuf },

    #[error("question #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate question id '{0}'")]
    DuplicateId(String),

    #[error("question id '{0}' collides with a reserved button payload")]
    ReservedId(String),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failure of a single call to the messaging platform.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{endpoint}: request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint}: HTTP {status} (code: {}, message: {})",
        .code.as_deref().unwrap_or("-"),
        .message.as_deref().unwrap_or("-"))]
    Protocol {
        endpoint: &'static str,
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("{endpoint}: unexpected response body: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Why an update was dropped without reaching a handler.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RoutingAnomaly {
    #[error("unsupported update type '{0}'")]
    Unsupported(String),

    #[error("malformed {update_type} update: {reason}")]
    Malformed { update_type: String, reason: String },

    #[error("{update_type} update without {field}")]
    MissingField {
        update_type: &'static str,
        field: &'static str,
    },
}
