//! Per-course event collection for catalog batches

use super::config;
use super::events::LogEvent;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// The course currently being processed on this thread
#[derive(Debug, Clone)]
pub struct CourseContext {
    pub department: String,
    pub number: String,
    pub started: Instant,
}

impl CourseContext {
    pub fn new(department: &str, number: &str) -> Self {
        Self {
            department: department.to_string(),
            number: number.to_string(),
            started: Instant::now(),
        }
    }

    /// `DEPT NUMBER`
    pub fn key(&self) -> String {
        format!("{} {}", self.department, self.number)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectionSummary {
    pub total_courses: usize,
    pub courses_with_errors: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub dropped_events: usize,
}

impl CollectionSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

#[derive(Default)]
struct CollectorState {
    events: BTreeMap<String, Vec<LogEvent>>,
    total: usize,
    dropped: usize,
}

/// Warnings and errors grouped by course, bounded by the compile-time limits
#[derive(Default)]
pub struct CourseEventCollector {
    state: Mutex<CollectorState>,
}

impl CourseEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make a course visible in the summary even if it logs nothing
    pub fn record_course(&self, context: &CourseContext) {
        self.lock().events.entry(context.key()).or_default();
    }

    pub fn record_event(&self, course_key: &str, event: LogEvent) {
        let mut state = self.lock();
        let per_course = config::get_max_log_events_per_course();

        if state.total >= config::get_log_buffer_size()
            || state
                .events
                .get(course_key)
                .map_or(false, |events| events.len() >= per_course)
        {
            state.dropped += 1;
            return;
        }

        state.total += 1;
        state
            .events
            .entry(course_key.to_string())
            .or_default()
            .push(event);
    }

    pub fn get_course_events(&self, course_key: &str) -> Vec<LogEvent> {
        self.lock()
            .events
            .get(course_key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_courses_with_errors(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.is_error()))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn get_summary(&self) -> CollectionSummary {
        let state = self.lock();
        let mut summary = CollectionSummary {
            total_courses: state.events.len(),
            dropped_events: state.dropped,
            ..Default::default()
        };

        for events in state.events.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            summary.total_errors += errors;
            summary.total_warnings += events.iter().filter(|e| e.is_warning()).count();
            if errors > 0 {
                summary.courses_with_errors += 1;
            }
        }

        summary
    }

    pub fn clear(&self) {
        *self.lock() = CollectorState::default();
    }
}

/// Human-readable report of every course that logged warnings or errors
pub fn format_course_report(collector: &CourseEventCollector) -> String {
    let state = collector.lock();
    let mut output = String::new();

    for (course, events) in &state.events {
        if events.is_empty() {
            continue;
        }
        output.push_str(&format!("{}:\n", course));
        for event in events {
            output.push_str(&format!("  {}\n", event.format()));
        }
    }

    drop(state);
    let summary = collector.get_summary();
    output.push_str(&format!(
        "{} courses, {} with errors, {} errors, {} warnings",
        summary.total_courses,
        summary.courses_with_errors,
        summary.total_errors,
        summary.total_warnings
    ));
    if summary.dropped_events > 0 {
        output.push_str(&format!(" ({} events dropped)", summary.dropped_events));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_events_grouped_by_course() {
        let collector = CourseEventCollector::new();
        collector.record_course(&CourseContext::new("MATH", "3"));
        collector.record_event(
            "COSC 1",
            LogEvent::error(codes::writer::OFFERING_WRITE_FAILED, "failed"),
        );
        collector.record_event("COSC 1", LogEvent::warning("odd token"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_courses, 2);
        assert_eq!(summary.courses_with_errors, 1);
        assert_eq!(summary.total_warnings, 1);
        assert_eq!(collector.get_courses_with_errors(), vec!["COSC 1".to_string()]);
    }

    #[test]
    fn test_per_course_cap() {
        let collector = CourseEventCollector::new();
        let cap = config::get_max_log_events_per_course();
        for i in 0..cap + 3 {
            collector.record_event("SPAN 9", LogEvent::warning(&format!("w{}", i)));
        }
        assert_eq!(collector.get_course_events("SPAN 9").len(), cap);
        assert_eq!(collector.get_summary().dropped_events, 3);
    }

    #[test]
    fn test_report_lists_course() {
        let collector = CourseEventCollector::new();
        collector.record_event("GOVT 60", LogEvent::warning("redirect ignored"));
        let report = format_course_report(&collector);
        assert!(report.contains("GOVT 60:"));
        assert!(report.contains("redirect ignored"));
        assert!(report.ends_with("0 errors, 1 warnings"));
    }
}
