// RUNTIME PREFERENCES

use super::error::ConfigError;
use crate::model::Term;
use crate::reconcile::ProtectedWindow;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperPreferences {
    /// Catalog year used when a document does not state its own
    pub catalog_year: i32,

    /// Whether to debug-log every classified token
    pub trace_tokens: bool,

    /// Whether `Varies`/`vary` triggers the topic scan
    pub enable_topic_scan: bool,

    /// Whether the built-in departmental corrections are loaded
    pub use_builtin_corrections: bool,

    /// Extra correction rules appended after the built-in table
    pub corrections_file: Option<PathBuf>,
}

impl Default for ScraperPreferences {
    fn default() -> Self {
        Self {
            catalog_year: env::var(env_vars::SCRAPER_CATALOG_YEAR)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| chrono::Local::now().year()),
            trace_tokens: env::var(env_vars::SCRAPER_TRACE_TOKENS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_topic_scan: env::var(env_vars::SCRAPER_ENABLE_TOPIC_SCAN)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            use_builtin_corrections: env::var(env_vars::SCRAPER_BUILTIN_CORRECTIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            corrections_file: env::var(env_vars::SCRAPER_CORRECTIONS_FILE)
                .ok()
                .map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationPreferences {
    /// Oldest representable term, catalog shorthand
    pub oldest_term: String,

    /// Newest term whose timetable is locked, catalog shorthand
    pub lock_term: String,

    /// Whether to log each deleted offering
    pub log_deletions: bool,
}

impl Default for ReconciliationPreferences {
    fn default() -> Self {
        Self {
            oldest_term: env::var(env_vars::RECONCILE_OLDEST_TERM)
                .unwrap_or_else(|_| "05W".to_string()),
            lock_term: env::var(env_vars::RECONCILE_LOCK_TERM)
                .unwrap_or_else(|_| "13F".to_string()),
            log_deletions: env::var(env_vars::RECONCILE_LOG_DELETIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl ReconciliationPreferences {
    /// Resolve the configured shorthands into the protected window
    pub fn protected_window(&self) -> Result<ProtectedWindow, ConfigError> {
        let start = Term::from_shorthand(&self.oldest_term)
            .ok_or_else(|| ConfigError::invalid_term("oldest_term", &self.oldest_term))?;
        let end = Term::from_shorthand(&self.lock_term)
            .ok_or_else(|| ConfigError::invalid_term("lock_term", &self.lock_term))?;

        if start > end {
            return Err(ConfigError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(ProtectedWindow::new(start, end))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Whether to attach the department and course number to events
    pub include_course_context: bool,

    /// Optional log file, appended to
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_course_context: env::var(env_vars::LOGGING_INCLUDE_COURSE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_file: env::var(env_vars::LOGGING_FILE).ok().map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scraper: ScraperPreferences,
    pub reconciliation: ReconciliationPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML; missing sections fall back to the environment defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.reconciliation.protected_window()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Scraper
    pub const SCRAPER_CATALOG_YEAR: &str = "ORC_SCRAPER_CATALOG_YEAR";
    pub const SCRAPER_TRACE_TOKENS: &str = "ORC_SCRAPER_TRACE_TOKENS";
    pub const SCRAPER_ENABLE_TOPIC_SCAN: &str = "ORC_SCRAPER_ENABLE_TOPIC_SCAN";
    pub const SCRAPER_BUILTIN_CORRECTIONS: &str = "ORC_SCRAPER_BUILTIN_CORRECTIONS";
    pub const SCRAPER_CORRECTIONS_FILE: &str = "ORC_SCRAPER_CORRECTIONS_FILE";

    // Reconciliation
    pub const RECONCILE_OLDEST_TERM: &str = "ORC_RECONCILE_OLDEST_TERM";
    pub const RECONCILE_LOCK_TERM: &str = "ORC_RECONCILE_LOCK_TERM";
    pub const RECONCILE_LOG_DELETIONS: &str = "ORC_RECONCILE_LOG_DELETIONS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ORC_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ORC_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ORC_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_COURSE_CONTEXT: &str = "ORC_LOGGING_INCLUDE_COURSE_CONTEXT";
    pub const LOGGING_FILE: &str = "ORC_LOGGING_FILE";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Season;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_default_window_resolves() {
        let prefs = ReconciliationPreferences {
            oldest_term: "05W".to_string(),
            lock_term: "13F".to_string(),
            log_deletions: false,
        };
        let window = prefs.protected_window().unwrap();
        assert_eq!(window.start(), Term::new(2005, Season::Winter));
        assert_eq!(window.end(), Term::new(2013, Season::Fall));
    }

    #[test]
    fn test_reversed_window_rejected() {
        let prefs = ReconciliationPreferences {
            oldest_term: "14F".to_string(),
            lock_term: "13F".to_string(),
            log_deletions: false,
        };
        assert_matches!(
            prefs.protected_window(),
            Err(ConfigError::InvalidWindow { .. })
        );
    }

    #[test]
    fn test_from_toml_str_partial_sections() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [scraper]
            catalog_year = 2013
            trace_tokens = true

            [reconciliation]
            oldest_term = "06W"
            lock_term = "12F"

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.scraper.catalog_year, 2013);
        assert!(config.scraper.trace_tokens);
        assert_eq!(config.reconciliation.lock_term, "12F");
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_from_toml_str_bad_term() {
        let result = RuntimeConfig::from_toml_str(
            r#"
            [reconciliation]
            oldest_term = "fall"
            lock_term = "13F"
            "#,
        );
        assert_matches!(
            result,
            Err(ConfigError::InvalidTerm {
                field: "oldest_term",
                ..
            })
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scraper]\ncatalog_year = 2012").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.scraper.catalog_year, 2012);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuntimeConfig::load(dir.path().join("absent.toml"));
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }
}
