//! Combinator / writer: turns a closed group into offering records

use serde::{Deserialize, Serialize};

use crate::log_debug;
use crate::machine::Accumulator;
use crate::model::{Course, OfferingDraft};
use crate::store::{OfferingStore, StoreResult};

/// Records affected by one or more flushes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineStats {
    pub created: usize,
    pub upgraded: usize,
    pub touched: usize,
}

impl CombineStats {
    pub fn total(&self) -> usize {
        self.created + self.upgraded + self.touched
    }

    pub fn absorb(&mut self, other: &CombineStats) {
        self.created += other.created;
        self.upgraded += other.upgraded;
        self.touched += other.touched;
    }
}

/// Write every (term, hour) pair of `accumulator` for `course`, then commit.
///
/// Per pair, in order:
/// 1. an offering at the unknown hour is moved to the concrete hour, unless
///    the concrete offering already exists, in which case that one is touched
/// 2. an existing exact offering is touched
/// 3. otherwise a system-derived offering is created, touched
///
/// Returns the fresh accumulator for the next group.
pub fn combine<S>(
    store: &S,
    course: &Course,
    accumulator: Accumulator,
    description: &str,
) -> StoreResult<(Accumulator, CombineStats)>
where
    S: OfferingStore + ?Sized,
{
    let mut stats = CombineStats::default();

    for term in accumulator.terms() {
        for hour in accumulator.hours() {
            let exact = store.find_offering(course.id, *term, hour)?;

            if let Some(unknown) = store.find_offering_at_unknown_hour(course.id, *term)? {
                match exact {
                    Some(existing) => {
                        store.mark_touched(existing.id)?;
                        stats.touched += 1;
                    }
                    None => {
                        let upgraded =
                            store.upsert_offering(OfferingDraft::upgrade(&unknown, hour.clone()))?;
                        log_debug!(
                            "Unknown-hour offering upgraded",
                            "offering" => upgraded.id.0,
                            "term" => term,
                            "hour" => hour
                        );
                        stats.upgraded += 1;
                    }
                }
                continue;
            }

            match exact {
                Some(existing) => {
                    store.mark_touched(existing.id)?;
                    stats.touched += 1;
                }
                None => {
                    store.upsert_offering(OfferingDraft::derived(
                        course.id,
                        *term,
                        hour.clone(),
                        description,
                    ))?;
                    stats.created += 1;
                }
            }
        }
    }

    store.commit()?;

    Ok((Accumulator::after_flush(accumulator.category()), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Category;
    use crate::model::{Hour, Origin, Season, Term};
    use crate::store::MemoryStore;

    fn setup() -> (MemoryStore, Course) {
        let store = MemoryStore::with_default_vocabulary().unwrap();
        let course = store.add_course("COSC", "1", "Introduction to Programming").unwrap();
        (store, course)
    }

    fn group(terms: &[Term], hours: &[&str]) -> Accumulator {
        let mut acc = Accumulator::new();
        for term in terms {
            acc.accept_term(*term);
        }
        for hour in hours {
            acc.accept_hour(Hour::new(hour));
        }
        acc
    }

    #[test]
    fn test_cross_product() {
        let (store, course) = setup();
        let acc = group(
            &[Term::new(2013, Season::Fall), Term::new(2014, Season::Winter)],
            &["9", "2"],
        );

        let (fresh, stats) = combine(&store, &course, acc, "13F, 14W: 9, 2").unwrap();

        assert_eq!(stats.created, 4);
        assert!(fresh.is_empty());
        assert_eq!(fresh.category(), Category::Term);
        assert_eq!(fresh.previous_category(), Category::Hour);

        let offerings = store.offerings_for(course.id).unwrap();
        assert_eq!(offerings.len(), 4);
        assert!(offerings.iter().all(|o| o.is_touched() && !o.is_user_entered()));
        assert!(offerings.iter().all(|o| o.description == "13F, 14W: 9, 2"));
        assert_eq!(store.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_existing_offering_is_touched_not_duplicated() {
        let (store, course) = setup();
        let fall = Term::new(2013, Season::Fall);
        store
            .insert_offering(course.id, fall, Hour::new("9"), Origin::SystemDerived)
            .unwrap();

        let (_, stats) = combine(&store, &course, group(&[fall], &["9"]), "").unwrap();

        assert_eq!(stats, CombineStats { created: 0, upgraded: 0, touched: 1 });
        let offerings = store.offerings_for(course.id).unwrap();
        assert_eq!(offerings.len(), 1);
        assert!(offerings[0].is_touched());
    }

    #[test]
    fn test_unknown_hour_is_upgraded_in_place() {
        let (store, course) = setup();
        let fall = Term::new(2013, Season::Fall);
        let original = store
            .insert_offering(course.id, fall, Hour::unknown(), Origin::UserEntered)
            .unwrap();

        let (_, stats) = combine(&store, &course, group(&[fall], &["10"]), "").unwrap();

        assert_eq!(stats.upgraded, 1);
        let offerings = store.offerings_for(course.id).unwrap();
        assert_eq!(offerings.len(), 1);
        assert_eq!(offerings[0].id, original.id);
        assert_eq!(offerings[0].hour, Hour::new("10"));
        assert!(offerings[0].is_user_entered());
        assert!(offerings[0].is_touched());
    }

    #[test]
    fn test_unknown_hour_left_alone_when_concrete_exists() {
        let (store, course) = setup();
        let fall = Term::new(2013, Season::Fall);
        store
            .insert_offering(course.id, fall, Hour::unknown(), Origin::UserEntered)
            .unwrap();
        store
            .insert_offering(course.id, fall, Hour::new("10"), Origin::SystemDerived)
            .unwrap();

        let (_, stats) = combine(&store, &course, group(&[fall], &["10"]), "").unwrap();

        assert_eq!(stats.touched, 1);
        let offerings = store.offerings_for(course.id).unwrap();
        assert_eq!(offerings.len(), 2);
        let unknown = offerings.iter().find(|o| o.hour.is_unknown()).unwrap();
        assert!(!unknown.is_touched());
    }

    #[test]
    fn test_terms_without_hours_write_nothing() {
        let (store, course) = setup();
        let acc = group(&[Term::new(2013, Season::Fall)], &[]);

        let (_, stats) = combine(&store, &course, acc, "").unwrap();
        assert_eq!(stats.total(), 0);
        assert!(store.offerings_for(course.id).unwrap().is_empty());
    }

    #[test]
    fn test_write_failure_propagates() {
        let (store, course) = setup();
        store.fail_writes_for(course.id).unwrap();
        let acc = group(&[Term::new(2013, Season::Fall)], &["9"]);

        assert!(combine(&store, &course, acc, "").is_err());
    }
}
