//! Batch processing of a full catalog pass
//!
//! Runs every entry of a [`DocumentProvider`] through an [`OfferingScraper`],
//! sequentially or across scoped worker threads sharing the scraper, and
//! closes the pass. Per-course failures are collected, never fatal.

use crate::config::compile_time::batch_processing::{MAX_COURSES_PER_BATCH, MAX_WORKER_THREADS};
use crate::logging::{self, codes};
use crate::pipeline::{CompletedPass, CourseError, CourseOutcome, OfferingScraper, ReconcileError};
use crate::store::{CatalogStore, CourseEntry, DocumentProvider, StoreError};
use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    /// Refuse providers with more entries; `None` uses the compile-time cap
    pub max_courses: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            max_courses: None,
            progress_reporting: false,
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    pub fn sequential() -> Self {
        Self {
            max_threads: 1,
            ..Self::default()
        }
    }

    fn thread_count(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }

    fn course_limit(&self) -> usize {
        self.max_courses
            .unwrap_or(MAX_COURSES_PER_BATCH)
            .min(MAX_COURSES_PER_BATCH)
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_courses: Vec<CourseOutcome>,
    pub failed_courses: Vec<(String, CourseError)>,
    pub processing_duration: Duration,
    pub courses_processed: usize,
    pub courses_discovered: usize,
    completed_pass: Option<CompletedPass>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_courses.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_courses.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.courses_processed == 0 {
            0.0
        } else {
            self.successful_courses.len() as f64 / self.courses_processed as f64
        }
    }

    pub fn add_success(&mut self, outcome: CourseOutcome) {
        self.successful_courses.push(outcome);
        self.courses_processed += 1;
    }

    pub fn add_failure(&mut self, course: String, error: CourseError) {
        self.failed_courses.push((course, error));
        self.courses_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_courses.extend(other.successful_courses);
        self.failed_courses.extend(other.failed_courses);
        self.courses_processed += other.courses_processed;
    }

    /// Offerings created across all successful courses
    pub fn offerings_created(&self) -> usize {
        self.successful_courses
            .iter()
            .map(|outcome| outcome.stats().created)
            .sum()
    }

    /// The pass token, present only when every course succeeded
    pub fn take_completed_pass(&mut self) -> Option<CompletedPass> {
        self.completed_pass.take()
    }

    pub fn summary(&self) -> String {
        format!(
            "Catalog pass completed: {} courses processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.courses_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Document provider failed: {0}")]
    Provider(#[source] StoreError),

    #[error("Too many courses: {count} (max: {max})")]
    TooManyCourses { count: usize, max: usize },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },

    #[error("Pass could not start: {0}")]
    Pass(#[from] ReconcileError),
}

impl BatchError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::Provider(_) => codes::batch::PROVIDER_FAILED,
            Self::TooManyCourses { .. } => codes::batch::BATCH_TOO_LARGE,
            Self::ThreadError { .. } => codes::batch::WORKER_PANICKED,
            Self::Pass(e) => e.error_code(),
        }
    }
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Run a whole catalog pass: begin, process every entry, finish.
///
/// When every course succeeded the results carry the [`CompletedPass`] for
/// [`OfferingScraper::reconcile`].
pub fn run_catalog_pass<S, P>(
    scraper: &OfferingScraper<S>,
    provider: &P,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError>
where
    S: CatalogStore,
    P: DocumentProvider + ?Sized,
{
    let start_time = Instant::now();

    let entries = provider.course_entries().map_err(|e| {
        crate::log_error!(codes::batch::PROVIDER_FAILED, "Document provider failed", "error" => e);
        BatchError::Provider(e)
    })?;

    let max = config.course_limit();
    if entries.len() > max {
        return Err(BatchError::TooManyCourses {
            count: entries.len(),
            max,
        });
    }

    scraper.begin_pass()?;

    let mut results = if config.thread_count() == 1 {
        process_sequential(scraper, &entries, config)
    } else {
        process_parallel(scraper, &entries, config)?
    };
    results.courses_discovered = entries.len();
    results.processing_duration = start_time.elapsed();

    for (course, error) in &results.failed_courses {
        crate::log_error!(
            codes::batch::COURSE_FAILED,
            "Course failed during catalog pass",
            "course" => course,
            "error" => error
        );
    }

    // A course may appear once per catalog edition
    let distinct_courses = entries
        .iter()
        .map(|entry| entry.course.id)
        .collect::<HashSet<_>>()
        .len();
    results.completed_pass = scraper
        .finish_pass(distinct_courses)
        .ok()
        .filter(|_| results.failed_courses.is_empty());

    let logged = logging::get_collection_summary();
    crate::log_success!(
        codes::success::BATCH_COMPLETED,
        "Catalog pass processing completed",
        "courses_processed" => results.courses_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "offerings_created" => results.offerings_created(),
        "reconcilable" => results.completed_pass.is_some(),
        "courses_with_errors" => logged.courses_with_errors,
        "warnings" => logged.total_warnings,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    if config.progress_reporting {
        crate::log_info!("Catalog pass course report", "report" => logging::course_report());
    }

    Ok(results)
}

fn process_entry<S: CatalogStore>(
    scraper: &OfferingScraper<S>,
    entry: &CourseEntry,
    results: &mut BatchResults,
) -> bool {
    match scraper.process_course_description(
        &entry.course,
        &entry.department,
        &entry.text,
        &entry.context,
    ) {
        Ok(outcome) => {
            results.add_success(outcome);
            true
        }
        Err(error) => {
            results.add_failure(entry.course.label(), error);
            false
        }
    }
}

fn process_sequential<S: CatalogStore>(
    scraper: &OfferingScraper<S>,
    entries: &[CourseEntry],
    config: &BatchConfig,
) -> BatchResults {
    crate::log_info!("Starting sequential catalog pass", "courses" => entries.len());

    let mut results = BatchResults::new();

    for (index, entry) in entries.iter().enumerate() {
        if config.progress_reporting {
            crate::log_info!(
                "Processing course",
                "index" => index + 1,
                "total" => entries.len(),
                "course" => entry.course.label()
            );
        }

        if !process_entry(scraper, entry, &mut results) && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping catalog pass");
            break;
        }
    }

    results
}

fn process_parallel<S: CatalogStore>(
    scraper: &OfferingScraper<S>,
    entries: &[CourseEntry],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let threads = config.thread_count();
    let chunk_size = calculate_chunk_size(entries.len(), threads);

    crate::log_info!(
        "Starting parallel catalog pass",
        "courses" => entries.len(),
        "threads" => threads,
        "chunk_size" => chunk_size
    );

    let mut results = BatchResults::new();

    for chunk in entries.chunks(chunk_size) {
        results.merge(process_chunk_parallel(scraper, chunk, threads)?);

        if config.progress_reporting {
            crate::log_info!(
                "Catalog pass progress",
                "processed" => results.courses_processed,
                "total" => entries.len()
            );
        }

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping catalog pass");
            break;
        }
    }

    Ok(results)
}

fn process_chunk_parallel<S: CatalogStore>(
    scraper: &OfferingScraper<S>,
    entries: &[CourseEntry],
    threads: usize,
) -> Result<BatchResults, BatchError> {
    let results = Mutex::new(BatchResults::new());
    let per_thread = (entries.len() + threads - 1) / threads;

    let panicked = thread::scope(|scope| {
        let handles: Vec<_> = entries
            .chunks(per_thread.max(1))
            .map(|slice| {
                let results = &results;
                scope.spawn(move || {
                    let mut local = BatchResults::new();
                    for entry in slice {
                        process_entry(scraper, entry, &mut local);
                    }
                    results
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .merge(local);
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(|joined| joined.is_err())
            .count()
    });

    if panicked > 0 {
        crate::log_error!(
            codes::batch::WORKER_PANICKED,
            "Worker thread panicked during catalog pass",
            "workers" => panicked
        );
        return Err(BatchError::ThreadError {
            message: format!("{} worker thread(s) panicked during processing", panicked),
        });
    }

    Ok(results.into_inner().unwrap_or_else(|e| e.into_inner()))
}

/// Courses per chunk; bounded so one chunk never holds too many results
fn calculate_chunk_size(courses: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 200;

    let ideal_chunk_size = (courses + max_threads - 1) / max_threads.max(1);
    ideal_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Course, Department};
    use crate::store::{DescriptionContext, MemoryStore, StoreResult};
    use assert_matches::assert_matches;

    fn entry(store: &MemoryStore, department: &str, number: &str, text: &str) -> CourseEntry {
        let course: Course = store
            .add_course(department, number, &format!("{} {}", department, number))
            .unwrap();
        CourseEntry {
            course,
            department: Department::new(department, ""),
            text: text.to_string(),
            context: DescriptionContext::for_year(2013),
        }
    }

    fn catalog(store: &MemoryStore, courses: usize) -> Vec<CourseEntry> {
        (0..courses)
            .map(|n| entry(store, "COSC", &(n + 1).to_string(), "13F, 14W: 9, 2"))
            .collect()
    }

    struct BrokenProvider;

    impl DocumentProvider for BrokenProvider {
        fn course_entries(&self) -> StoreResult<Vec<CourseEntry>> {
            Err(StoreError::unavailable("catalog site down"))
        }
    }

    #[test]
    fn test_sequential_pass() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store.clone());
        let entries = catalog(&store, 3);
        let config = BatchConfig {
            progress_reporting: true,
            ..BatchConfig::sequential()
        };

        let mut results = run_catalog_pass(&scraper, &entries, &config).unwrap();

        assert_eq!(results.success_count(), 3);
        assert_eq!(results.offerings_created(), 12);
        assert_eq!(results.courses_discovered, 3);
        assert!(results.take_completed_pass().is_some());
    }

    #[test]
    fn test_parallel_pass_matches_sequential() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store.clone());
        let entries = catalog(&store, 25);
        let config = BatchConfig {
            max_threads: 4,
            ..BatchConfig::default()
        };

        let mut results = run_catalog_pass(&scraper, &entries, &config).unwrap();

        assert_eq!(results.success_count(), 25);
        assert_eq!(store.offerings().unwrap().len(), 100);

        let pass = results.take_completed_pass().unwrap();
        let report = scraper.reconcile(pass, &scraper.window()).unwrap();
        assert!(report.deleted.is_empty());
        assert_eq!(report.reset, 100);
    }

    #[test]
    fn test_failed_course_blocks_reconciliation() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store.clone());
        let entries = catalog(&store, 3);
        store.fail_writes_for(entries[1].course.id).unwrap();

        let mut results = run_catalog_pass(&scraper, &entries, &BatchConfig::sequential()).unwrap();

        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.failed_courses[0].0, "COSC 2");
        assert!(results.take_completed_pass().is_none());
    }

    #[test]
    fn test_course_listed_in_several_editions() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store.clone());
        let older = CourseEntry {
            context: DescriptionContext::for_year(2012),
            ..entry(&store, "COSC", "1", "13F: 9")
        };
        let newer = CourseEntry {
            text: "14W: 2".to_string(),
            context: DescriptionContext::for_year(2014),
            ..older.clone()
        };
        let entries = vec![older, newer];

        let mut results = run_catalog_pass(&scraper, &entries, &BatchConfig::sequential()).unwrap();

        assert_eq!(results.success_count(), 2);
        assert_eq!(results.courses_discovered, 2);
        let pass = results.take_completed_pass().unwrap();
        assert_eq!(pass.processed(), 1);
        assert_eq!(store.offerings().unwrap().len(), 2);
    }

    #[test]
    fn test_fail_fast_stops_sequential_pass() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store.clone());
        let entries = catalog(&store, 3);
        store.fail_writes_for(entries[0].course.id).unwrap();
        let config = BatchConfig {
            fail_fast: true,
            ..BatchConfig::sequential()
        };

        let results = run_catalog_pass(&scraper, &entries, &config).unwrap();
        assert_eq!(results.courses_processed, 1);
    }

    #[test]
    fn test_course_limit() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store.clone());
        let entries = catalog(&store, 3);
        let config = BatchConfig {
            max_courses: Some(2),
            ..BatchConfig::sequential()
        };

        assert_matches!(
            run_catalog_pass(&scraper, &entries, &config),
            Err(BatchError::TooManyCourses { count: 3, max: 2 })
        );
    }

    #[test]
    fn test_provider_failure() {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let scraper = OfferingScraper::new(store);

        let error = run_catalog_pass(&scraper, &BrokenProvider, &BatchConfig::sequential())
            .unwrap_err();
        assert_matches!(error, BatchError::Provider(StoreError::Unavailable(_)));
        assert_eq!(error.error_code(), codes::batch::PROVIDER_FAILED);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(0, 4), 1);
        assert_eq!(calculate_chunk_size(2000, 4), 200);
    }

    #[test]
    fn test_batch_results_summary() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.summary().contains("0 courses processed"));
    }
}
