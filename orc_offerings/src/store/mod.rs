//! Collaborator traits for reference data, offering persistence and documents.
//!
//! The scraper core only talks to storage through these traits:
//!
//! - [`ReferenceData`]: terms, hours and courses (read-mostly vocabularies)
//! - [`OfferingStore`]: offering records and their touch tags
//! - [`DocumentProvider`]: the catalog entries to process in one pass
//!
//! [`CatalogStore`] is the composite bound used by the pipeline. Every method
//! takes `&self` so one store can be shared across batch workers.

pub mod error;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, DEFAULT_HOURS};

use crate::model::{Course, CourseId, Department, Hour, Offering, OfferingDraft, OfferingId, Season, Term};
use crate::reconcile::ProtectedWindow;
use serde::{Deserialize, Serialize};

/// Read access to the term, hour and course vocabularies
pub trait ReferenceData: Send + Sync {
    /// Exact, case-sensitive hour label lookup
    fn lookup_hour(&self, period: &str) -> StoreResult<Option<Hour>>;

    fn lookup_term(&self, year: i32, season: Season) -> StoreResult<Option<Term>>;

    /// Create a literal hour label; returns the existing hour if one already has this label
    fn create_hour(&self, period: &str) -> StoreResult<Hour>;

    /// Known terms whose year is in `first_year..=last_year`, chronologically
    fn terms_in_years(&self, first_year: i32, last_year: i32) -> StoreResult<Vec<Term>>;

    fn lookup_course(&self, department: &str, number: &str) -> StoreResult<Option<Course>>;
}

/// Persistence of offering records
pub trait OfferingStore: Send + Sync {
    fn find_offering(&self, course: CourseId, term: Term, hour: &Hour)
        -> StoreResult<Option<Offering>>;

    fn find_offering_at_unknown_hour(
        &self,
        course: CourseId,
        term: Term,
    ) -> StoreResult<Option<Offering>>;

    /// Insert a draft without an id, or update the record it names.
    /// Fails with `DuplicateOffering` if another record already holds the triple.
    fn upsert_offering(&self, draft: OfferingDraft) -> StoreResult<Offering>;

    fn delete_offering(&self, id: OfferingId) -> StoreResult<()>;

    fn mark_touched(&self, id: OfferingId) -> StoreResult<()>;

    /// Untouched offerings whose term lies outside `window`, user-entered ones included
    fn all_untouched_outside_window(&self, window: &ProtectedWindow) -> StoreResult<Vec<Offering>>;

    /// Reset every touch tag; returns how many were touched
    fn reset_all_touch_states(&self) -> StoreResult<usize>;

    fn commit(&self) -> StoreResult<()>;
}

/// Everything the scraper needs from storage.
///
/// Automatically implemented for any type implementing both store traits.
pub trait CatalogStore: ReferenceData + OfferingStore {}

impl<T> CatalogStore for T where T: ReferenceData + OfferingStore {}

// ============================================================================
// DOCUMENTS
// ============================================================================

/// Surroundings of one description in its source document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionContext {
    /// Year the catalog was published; `None` falls back to the configured year
    pub catalog_year: Option<i32>,

    /// Neighbouring text fragments, searched by the topic scan
    pub fragments: Vec<String>,
}

impl DescriptionContext {
    pub fn for_year(catalog_year: i32) -> Self {
        Self {
            catalog_year: Some(catalog_year),
            fragments: Vec::new(),
        }
    }

    pub fn with_fragment(mut self, fragment: &str) -> Self {
        self.fragments.push(fragment.to_string());
        self
    }
}

/// One course description to process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub course: Course,
    pub department: Department,
    pub text: String,
    pub context: DescriptionContext,
}

/// Source of the catalog entries for a pass
pub trait DocumentProvider: Send + Sync {
    fn course_entries(&self) -> StoreResult<Vec<CourseEntry>>;
}

impl DocumentProvider for Vec<CourseEntry> {
    fn course_entries(&self) -> StoreResult<Vec<CourseEntry>> {
        Ok(self.clone())
    }
}
