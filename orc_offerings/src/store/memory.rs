//! In-memory catalog store.
//!
//! Implements every collaborator trait over `HashMap`/`BTreeMap` state behind
//! one `RwLock`, so each upsert is atomic and the store can be shared across
//! batch workers. Used by tests and local runs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::error::{StoreError, StoreResult};
use super::{OfferingStore, ReferenceData};
use crate::model::{
    Course, CourseId, Hour, Offering, OfferingDraft, OfferingId, Origin, Season, Term, TouchState,
};
use crate::reconcile::ProtectedWindow;

/// The hour vocabulary of the Dartmouth timetable
pub const DEFAULT_HOURS: &[&str] = &[
    "?", "8", "9", "9L", "9S", "10", "11", "12", "2", "10A", "2A", "3A", "3B", "Arrange", "Check",
    "8AM-9:50AM", "7pm", "D.F.S.P", "D.L.S.A", "FSP", "FS", "LS", "1",
];

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Default)]
struct MemoryData {
    hours: HashSet<String>,
    terms: BTreeSet<Term>,
    courses: HashMap<CourseId, Course>,
    offerings: BTreeMap<OfferingId, Offering>,

    next_course_id: u64,
    next_offering_id: u64,

    commit_count: usize,
    failing_courses: HashSet<CourseId>,
}

impl MemoryData {
    fn find_triple(&self, course: CourseId, term: Term, hour: &Hour) -> Option<&Offering> {
        self.offerings
            .values()
            .find(|o| o.course == course && o.term == term && &o.hour == hour)
    }

    fn check_writable(&self, course: CourseId) -> StoreResult<()> {
        if self.failing_courses.contains(&course) {
            return Err(StoreError::unavailable(format!(
                "writes rejected for course {}",
                course.0
            )));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with [`DEFAULT_HOURS`] and every term from 2005 through 2020
    pub fn with_default_vocabulary() -> StoreResult<Self> {
        let store = Self::new();
        store.seed_hours(DEFAULT_HOURS)?;
        store.seed_terms(2005, 2020)?;
        Ok(store)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MemoryData>> {
        self.data
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryData>> {
        self.data
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Seeding and inspection helpers
    // ------------------------------------------------------------------

    pub fn seed_hours(&self, periods: &[&str]) -> StoreResult<()> {
        let mut data = self.write()?;
        data.hours.extend(periods.iter().map(|p| p.to_string()));
        Ok(())
    }

    /// Add every season of every year in `first_year..=last_year`
    pub fn seed_terms(&self, first_year: i32, last_year: i32) -> StoreResult<()> {
        let mut data = self.write()?;
        for year in first_year..=last_year {
            for season in Season::ALL {
                data.terms.insert(Term::new(year, season));
            }
        }
        Ok(())
    }

    pub fn add_course(&self, department: &str, number: &str, name: &str) -> StoreResult<Course> {
        let mut data = self.write()?;
        data.next_course_id += 1;
        let course = Course {
            id: CourseId(data.next_course_id),
            department: department.to_string(),
            number: number.to_string(),
            name: name.to_string(),
            description: String::new(),
        };
        data.courses.insert(course.id, course.clone());
        Ok(course)
    }

    /// Insert an untouched offering directly, as a previous run or a user would have
    pub fn insert_offering(
        &self,
        course: CourseId,
        term: Term,
        hour: Hour,
        origin: Origin,
    ) -> StoreResult<Offering> {
        self.upsert_offering(OfferingDraft {
            id: None,
            course,
            term,
            hour,
            description: String::new(),
            origin,
            touch: TouchState::Untouched,
        })
    }

    pub fn offerings(&self) -> StoreResult<Vec<Offering>> {
        Ok(self.read()?.offerings.values().cloned().collect())
    }

    pub fn offerings_for(&self, course: CourseId) -> StoreResult<Vec<Offering>> {
        Ok(self
            .read()?
            .offerings
            .values()
            .filter(|o| o.course == course)
            .cloned()
            .collect())
    }

    pub fn hour_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.hours.len())
    }

    pub fn commit_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.commit_count)
    }

    /// Make every offering write for `course` fail with `StoreError::Unavailable`
    pub fn fail_writes_for(&self, course: CourseId) -> StoreResult<()> {
        self.write()?.failing_courses.insert(course);
        Ok(())
    }
}

impl ReferenceData for MemoryStore {
    fn lookup_hour(&self, period: &str) -> StoreResult<Option<Hour>> {
        Ok(self.read()?.hours.get(period).map(|p| Hour::new(p)))
    }

    fn lookup_term(&self, year: i32, season: Season) -> StoreResult<Option<Term>> {
        let term = Term::new(year, season);
        Ok(self.read()?.terms.get(&term).copied())
    }

    fn create_hour(&self, period: &str) -> StoreResult<Hour> {
        let mut data = self.write()?;
        data.hours.insert(period.to_string());
        Ok(Hour::new(period))
    }

    fn terms_in_years(&self, first_year: i32, last_year: i32) -> StoreResult<Vec<Term>> {
        Ok(self
            .read()?
            .terms
            .iter()
            .filter(|t| t.year >= first_year && t.year <= last_year)
            .copied()
            .collect())
    }

    fn lookup_course(&self, department: &str, number: &str) -> StoreResult<Option<Course>> {
        Ok(self
            .read()?
            .courses
            .values()
            .find(|c| c.department == department && c.number == number)
            .cloned())
    }
}

impl OfferingStore for MemoryStore {
    fn find_offering(
        &self,
        course: CourseId,
        term: Term,
        hour: &Hour,
    ) -> StoreResult<Option<Offering>> {
        Ok(self.read()?.find_triple(course, term, hour).cloned())
    }

    fn find_offering_at_unknown_hour(
        &self,
        course: CourseId,
        term: Term,
    ) -> StoreResult<Option<Offering>> {
        Ok(self
            .read()?
            .find_triple(course, term, &Hour::unknown())
            .cloned())
    }

    fn upsert_offering(&self, draft: OfferingDraft) -> StoreResult<Offering> {
        let mut data = self.write()?;
        data.check_writable(draft.course)?;

        if let Some(existing) = data.find_triple(draft.course, draft.term, &draft.hour) {
            if Some(existing.id) != draft.id {
                return Err(StoreError::DuplicateOffering {
                    course: draft.course.0,
                    term: draft.term.to_string(),
                    hour: draft.hour.period.clone(),
                });
            }
        }

        let id = match draft.id {
            Some(id) if data.offerings.contains_key(&id) => id,
            Some(id) => return Err(StoreError::not_found(format!("offering {}", id.0))),
            None => {
                data.next_offering_id += 1;
                OfferingId(data.next_offering_id)
            }
        };

        let offering = Offering {
            id,
            course: draft.course,
            term: draft.term,
            hour: draft.hour,
            description: draft.description,
            origin: draft.origin,
            touch: draft.touch,
        };
        data.offerings.insert(id, offering.clone());
        Ok(offering)
    }

    fn delete_offering(&self, id: OfferingId) -> StoreResult<()> {
        self.write()?
            .offerings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("offering {}", id.0)))
    }

    fn mark_touched(&self, id: OfferingId) -> StoreResult<()> {
        let mut data = self.write()?;
        let course = data
            .offerings
            .get(&id)
            .map(|o| o.course)
            .ok_or_else(|| StoreError::not_found(format!("offering {}", id.0)))?;
        data.check_writable(course)?;
        if let Some(offering) = data.offerings.get_mut(&id) {
            offering.touch = TouchState::Touched;
        }
        Ok(())
    }

    fn all_untouched_outside_window(&self, window: &ProtectedWindow) -> StoreResult<Vec<Offering>> {
        Ok(self
            .read()?
            .offerings
            .values()
            .filter(|o| !o.is_touched() && !window.contains(o.term))
            .cloned()
            .collect())
    }

    fn reset_all_touch_states(&self) -> StoreResult<usize> {
        let mut data = self.write()?;
        let mut reset = 0;
        for offering in data.offerings.values_mut() {
            if offering.is_touched() {
                offering.touch = TouchState::Untouched;
                reset += 1;
            }
        }
        Ok(reset)
    }

    fn commit(&self) -> StoreResult<()> {
        self.write()?.commit_count += 1;
        Ok(())
    }
}
