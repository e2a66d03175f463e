// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for accessfix

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

/// Scan-fatal failures. Any of these marks the whole scan as failed.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Scan timed out after {0:?}")]
    Timeout(Duration),

    #[error("Scan aborted: {0}")]
    Aborted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The content could not be interpreted as markup, even leniently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("content contains no markup")]
    NoMarkup,

    #[error("content looks like binary data")]
    Binary,

    #[error("tree parser recovered from {count} errors (limit {limit})")]
    TooManyErrors { count: usize, limit: usize },
}

/// A single rule failed on a parsed document. Never scan-fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule {rule} failed: {message}")]
    Evaluation { rule: String, message: String },

    #[error("rule {rule} panicked: {message}")]
    Panicked { rule: String, message: String },
}

impl RuleError {
    pub fn evaluation(rule: &str, message: impl Into<String>) -> Self {
        RuleError::Evaluation {
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    /// Id of the rule that failed
    pub fn rule(&self) -> &str {
        match self {
            RuleError::Evaluation { rule, .. } | RuleError::Panicked { rule, .. } => rule,
        }
    }
}
