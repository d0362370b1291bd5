use crate::logging::codes::{self, Code};
use std::path::PathBuf;
use thiserror::Error;

/// Failures while building or loading a correction table
#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("Failed to read correction rules '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid correction rule TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Correction table would hold {count} rules, limit is {limit}")]
    TooManyRules { count: usize, limit: usize },

    #[error("Invalid correction rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },
}

impl CorrectionError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::configuration::CONFIG_FILE_UNREADABLE,
            Self::Parse(_) | Self::InvalidRule { .. } => codes::corrections::INVALID_RULE_TABLE,
            Self::TooManyRules { .. } => codes::corrections::RULE_TABLE_TOO_LARGE,
        }
    }
}
