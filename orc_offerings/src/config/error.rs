use crate::logging::codes::{self, Code};
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid term shorthand '{value}' for {field}")]
    InvalidTerm { field: &'static str, value: String },

    #[error("Protected window is empty: {start} is after {end}")]
    InvalidWindow { start: String, end: String },
}

impl ConfigError {
    pub fn invalid_term(field: &'static str, value: &str) -> Self {
        Self::InvalidTerm {
            field,
            value: value.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::configuration::CONFIG_FILE_UNREADABLE,
            Self::Parse(_) => codes::configuration::CONFIG_PARSE_ERROR,
            Self::InvalidTerm { .. } | Self::InvalidWindow { .. } => {
                codes::configuration::INVALID_PREFERENCE
            }
        }
    }
}
