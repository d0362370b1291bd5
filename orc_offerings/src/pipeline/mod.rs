mod error;
mod pass;
mod result;

pub use error::{CourseError, ReconcileError, SetupError};
pub use pass::CompletedPass;
pub use result::CourseOutcome;

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::config::runtime::{ReconciliationPreferences, ScraperPreferences};
use crate::config::RuntimeConfig;
use crate::corrections::CorrectionTable;
use crate::logging::{self, codes};
use crate::machine::{MachineOptions, OfferingMachine};
use crate::model::{Course, CourseId, Department};
use crate::reconcile::{self, ProtectedWindow, SweepReport};
use crate::store::{CatalogStore, DescriptionContext};
use crate::{log_error, log_info, log_success};
use pass::PassTracker;

/// Entry point of the offering core: processes course descriptions against a
/// store and reconciles the store once a pass is complete.
///
/// A pass is `begin_pass`, one `process_course_description` per catalog
/// course, `finish_pass`, then `reconcile`. The sweep only runs with the
/// [`CompletedPass`] of the active pass.
pub struct OfferingScraper<S: CatalogStore> {
    store: S,
    corrections: CorrectionTable,
    scraper: ScraperPreferences,
    reconciliation: ReconciliationPreferences,
    window: ProtectedWindow,
    pass: Mutex<PassTracker>,
}

impl<S: CatalogStore> OfferingScraper<S> {
    /// Built-in corrections, environment preferences and the default window
    pub fn new(store: S) -> Self {
        Self {
            store,
            corrections: CorrectionTable::builtin(),
            scraper: ScraperPreferences::default(),
            reconciliation: ReconciliationPreferences::default(),
            window: ProtectedWindow::default(),
            pass: Mutex::new(PassTracker::default()),
        }
    }

    /// Build from runtime configuration, loading any extra correction rules it names
    pub fn with_config(store: S, config: &RuntimeConfig) -> Result<Self, SetupError> {
        let window = config.reconciliation.protected_window()?;

        let mut corrections = if config.scraper.use_builtin_corrections {
            CorrectionTable::builtin()
        } else {
            CorrectionTable::empty()
        };
        if let Some(path) = &config.scraper.corrections_file {
            let extra = CorrectionTable::load(path)?;
            corrections.extend(extra.rules().iter().cloned())?;
        }

        log_success!(
            codes::success::CORRECTIONS_LOADED,
            "Correction table ready",
            "rules" => corrections.len(),
            "builtin" => config.scraper.use_builtin_corrections
        );

        Ok(Self {
            store,
            corrections,
            scraper: config.scraper.clone(),
            reconciliation: config.reconciliation.clone(),
            window,
            pass: Mutex::new(PassTracker::default()),
        })
    }

    pub fn with_corrections(mut self, corrections: CorrectionTable) -> Self {
        self.corrections = corrections;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn corrections(&self) -> &CorrectionTable {
        &self.corrections
    }

    /// Protected window from configuration
    pub fn window(&self) -> ProtectedWindow {
        self.window
    }

    fn tracker(&self) -> MutexGuard<'_, PassTracker> {
        self.pass.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a pass: clear every touch tag and forget earlier results
    pub fn begin_pass(&self) -> Result<u64, ReconcileError> {
        let reset = self.store.reset_all_touch_states()?;
        self.store.commit()?;

        let id = self.tracker().begin();
        log_success!(
            codes::success::PASS_STARTED,
            "Catalog pass started",
            "pass" => id,
            "touch_tags_reset" => reset
        );
        Ok(id)
    }

    /// Extract offerings from one description and write them.
    ///
    /// Store failures abort this course only; they are returned and recorded
    /// against the active pass.
    pub fn process_course_description(
        &self,
        course: &Course,
        department: &Department,
        text: &str,
        context: &DescriptionContext,
    ) -> Result<CourseOutcome, CourseError> {
        logging::with_course_context(&course.department, &course.number, || {
            let start = Instant::now();
            let options = MachineOptions {
                catalog_year: context.catalog_year.unwrap_or(self.scraper.catalog_year),
                topic_scan: self.scraper.enable_topic_scan,
                trace_tokens: self.scraper.trace_tokens,
            };

            let machine = OfferingMachine::new(
                &self.store,
                &self.corrections,
                department,
                course,
                text,
                context,
                options,
            );

            match machine.run() {
                Ok(outcome) => {
                    let result = CourseOutcome::new(course, outcome, start.elapsed());
                    result.log_success();
                    self.tracker().record_success(course.id);
                    Ok(result)
                }
                Err(fault) => {
                    let error = CourseError::from_fault(course, fault);
                    log_error!(
                        error.error_code(),
                        "Course processing failed",
                        "course" => course.label(),
                        "error" => error
                    );
                    self.tracker().record_failure(course.id, error.to_string());
                    Err(error)
                }
            }
        })
    }

    /// Courses that failed in the active pass, with the reason
    pub fn failed_courses(&self) -> Vec<(CourseId, String)> {
        self.tracker().failures()
    }

    /// Close the processing phase. Refuses if fewer than `expected_courses`
    /// were processed or any course failed.
    pub fn finish_pass(&self, expected_courses: usize) -> Result<CompletedPass, ReconcileError> {
        let result = self.tracker().complete(expected_courses);
        match &result {
            Ok(pass) => log_success!(
                codes::success::PASS_COMPLETED,
                "Catalog pass complete",
                "pass" => pass.id(),
                "courses" => pass.processed()
            ),
            Err(e) => log_error!(e.error_code(), "Catalog pass cannot be reconciled", "error" => e),
        }
        result
    }

    /// Delete stale offerings outside `window` and reset touch tags
    pub fn reconcile(
        &self,
        pass: CompletedPass,
        window: &ProtectedWindow,
    ) -> Result<SweepReport, ReconcileError> {
        let mut tracker = self.tracker();
        tracker.close(&pass)?;

        log_info!("Reconciling offerings", "pass" => pass.id(), "window" => window);
        let report = reconcile::sweep(&self.store, window, self.reconciliation.log_deletions)?;

        log_success!(
            codes::success::SWEEP_COMPLETED,
            "Reconciliation sweep complete",
            "examined" => report.examined,
            "deleted" => report.deleted.len(),
            "preserved_user_entered" => report.preserved_user_entered,
            "reset" => report.reset
        );
        Ok(report)
    }
}
