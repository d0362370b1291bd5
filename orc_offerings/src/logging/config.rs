//! Logging configuration: compile-time buffer limits plus runtime preferences

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::path::PathBuf;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; only the first call takes effect
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn include_course_context() -> bool {
    get_runtime_preferences().include_course_context
}

pub fn log_file() -> Option<PathBuf> {
    get_runtime_preferences().log_file
}

pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_course() -> usize {
    MAX_LOG_EVENTS_PER_COURSE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

pub fn get_config_summary() -> String {
    let prefs = get_runtime_preferences();
    format!(
        "=== Logging Configuration ===\n\
         Source: {}\n\
         Min level: {}\n\
         Structured: {}\n\
         Console: {}\n\
         Course context: {}\n\
         Buffer size: {}\n\
         Max events per course: {}\n",
        crate::config::build_info::source_info(),
        prefs.min_log_level.as_str(),
        prefs.use_structured_logging,
        prefs.enable_console_logging,
        prefs.include_course_context,
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_COURSE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_come_from_profile() {
        assert_eq!(get_log_buffer_size(), LOG_BUFFER_SIZE);
        assert!(get_max_log_events_per_course() <= get_log_buffer_size());
    }

    #[test]
    fn test_summary_mentions_source() {
        let summary = get_config_summary();
        assert!(summary.contains("Logging Configuration"));
        assert!(summary.contains(".toml"));
    }
}
