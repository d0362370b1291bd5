//! End-of-pass reconciliation sweep
//!
//! After every course of a pass has been processed, offerings that were not
//! touched are stale: the catalog no longer lists them. Stale offerings are
//! deleted unless their term lies inside the protected window (owned by the
//! registrar timetable) or a user entered them. Touch tags are then reset for
//! the next pass.

use serde::{Deserialize, Serialize};

use crate::model::{Offering, Season, Term};
use crate::store::{OfferingStore, StoreResult};
use crate::{log_debug, log_info};

/// Inclusive range of terms the sweep never deletes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedWindow {
    start: Term,
    end: Term,
}

impl Default for ProtectedWindow {
    fn default() -> Self {
        Self::new(Term::new(2005, Season::Winter), Term::new(2013, Season::Fall))
    }
}

impl ProtectedWindow {
    pub fn new(start: Term, end: Term) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Term {
        self.start
    }

    pub fn end(&self) -> Term {
        self.end
    }

    pub fn contains(&self, term: Term) -> bool {
        term.in_range(self.start, self.end)
    }
}

impl std::fmt::Display for ProtectedWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Untouched offerings outside the window
    pub examined: usize,
    pub deleted: Vec<Offering>,
    pub preserved_user_entered: usize,
    /// Touch tags cleared afterwards
    pub reset: usize,
}

/// Delete stale system-derived offerings outside `window`, then reset every touch tag
pub fn sweep<S>(store: &S, window: &ProtectedWindow, log_deletions: bool) -> StoreResult<SweepReport>
where
    S: OfferingStore + ?Sized,
{
    let candidates = store.all_untouched_outside_window(window)?;
    let mut report = SweepReport {
        examined: candidates.len(),
        ..SweepReport::default()
    };

    for offering in candidates {
        // Guard against stores that return protected terms
        if window.contains(offering.term) {
            continue;
        }
        if offering.is_user_entered() {
            report.preserved_user_entered += 1;
            continue;
        }

        store.delete_offering(offering.id)?;
        if log_deletions {
            log_info!(
                "Stale offering deleted",
                "offering" => offering.id.0,
                "course" => offering.course.0,
                "term" => offering.term,
                "hour" => offering.hour
            );
        }
        report.deleted.push(offering);
    }

    store.commit()?;
    report.reset = store.reset_all_touch_states()?;
    store.commit()?;

    log_debug!(
        "Sweep finished",
        "examined" => report.examined,
        "deleted" => report.deleted.len(),
        "window" => window
    );

    Ok(report)
}
