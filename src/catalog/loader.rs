use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::{QaCatalog, QaEntry};
use crate::error::ConfigError;
use crate::menu::RESERVED_PAYLOADS;

#[derive(Debug, Deserialize)]
struct QaFile {
    questions: Option<Vec<QaEntry>>,
}

/// Load the FAQ catalog from a JSON file.
///
/// Expected shape:
/// ```json
/// { "questions": [ { "id": "price", "question": "How much?", "answer": "..." } ] }
/// ```
///
/// Ids must be non-empty, unique and must not shadow one of the service
/// button payloads.
pub fn load_catalog(path: &Path) -> Result<QaCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = parse_catalog(&content, path)?;
    if catalog.is_empty() {
        warn!(
            "FAQ file {} has no questions; the menu will only hold service buttons",
            path.display()
        );
    }
    info!("Loaded {} questions from {}", catalog.len(), path.display());
    Ok(catalog)
}

fn parse_catalog(content: &str, path: &Path) -> Result<QaCatalog, ConfigError> {
    let file: QaFile = serde_json::from_str(content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = file.questions.ok_or_else(|| ConfigError::MissingQuestions {
        path: path.to_path_buf(),
    })?;

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.id.is_empty() {
            return Err(ConfigError::EmptyId { index });
        }
        if RESERVED_PAYLOADS.contains(&entry.id.as_str()) {
            return Err(ConfigError::ReservedId(entry.id.clone()));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(ConfigError::DuplicateId(entry.id.clone()));
        }
    }

    Ok(QaCatalog::from_entries(entries))
}
