//! Global logging for the offering scraper
//!
//! Thread-safe global logger with a per-thread course context, per-course
//! event collection for batches, and a macro interface.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{CollectionSummary, CourseContext, CourseEventCollector};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

use crate::config::runtime::LoggingPreferences;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_COLLECTOR: OnceLock<Arc<CourseEventCollector>> = OnceLock::new();

thread_local! {
    static COURSE_CONTEXT: RefCell<Option<CourseContext>> = RefCell::new(None);
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the environment-derived preferences
pub fn init_global_logging() -> Result<(), String> {
    let service = Arc::new(LoggingService::with_config());
    init_global_logging_with_service(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    if debug_enabled() {
        service.log_event(LogEvent::debug(&config::get_config_summary()));
    }
    Ok(())
}

/// Install explicit preferences, then initialize
pub fn init_global_logging_with_preferences(
    preferences: LoggingPreferences,
) -> Result<(), String> {
    config::init_runtime_preferences(preferences)?;
    init_global_logging()
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    // The collector may outlive a failed logger init in tests; ignore a second set
    let _ = GLOBAL_COLLECTOR.set(Arc::new(CourseEventCollector::new()));
    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_collector() -> Option<&'static CourseEventCollector> {
    GLOBAL_COLLECTOR.get().map(|collector| collector.as_ref())
}

/// Used by `log_debug!` to skip formatting when debug output is off
pub fn debug_enabled() -> bool {
    is_initialized() && config::get_min_log_level() >= LogLevel::Debug
}

// ============================================================================
// COURSE CONTEXT
// ============================================================================

pub fn set_course_context(department: &str, number: &str) {
    let context = CourseContext::new(department, number);

    if let Some(collector) = try_get_global_collector() {
        collector.record_course(&context);
    }

    COURSE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_course_context() {
    COURSE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the course context set, restoring the previous context afterwards
pub fn with_course_context<F, R>(department: &str, number: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_course_context();
    set_course_context(department, number);
    let result = f();
    COURSE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_course_context() -> Option<CourseContext> {
    COURSE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_course(event: LogEvent) -> (LogEvent, Option<String>) {
    match get_current_course_context() {
        Some(course) => {
            let key = course.key();
            let event = if config::include_course_context() {
                event.with_context("course", &key)
            } else {
                event
            };
            (event, Some(key))
        }
        None => (event, None),
    }
}

fn dispatch(event: LogEvent, collect: bool) {
    let (event, course_key) = attach_course(event);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if collect {
        if let (Some(key), Some(collector)) = (course_key, try_get_global_collector()) {
            collector.record_event(&key, event);
        }
    }
}

fn with_pairs(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(with_pairs(LogEvent::error(code, message), context), true);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(with_pairs(LogEvent::success(code, message), context), false);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(with_pairs(LogEvent::info(message), context), false);
}

pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    dispatch(with_pairs(event, context), true);
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(with_pairs(LogEvent::debug(message), context), false);
}

// ============================================================================
// REPORTING
// ============================================================================

pub fn get_collection_summary() -> CollectionSummary {
    try_get_global_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn course_report() -> String {
    try_get_global_collector()
        .map(collector::format_course_report)
        .unwrap_or_else(|| "No course collector available".to_string())
}
