//! Pending terms and hours of the group currently being read

use crate::config::compile_time::accumulator::{MAX_HOURS_PER_GROUP, MAX_TERMS_PER_GROUP};
use crate::log_warning;
use crate::logging::codes;
use crate::model::{Hour, Term};

/// Kind of the last accepted token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    None,
    Term,
    Hour,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::None => "NONE",
            Category::Term => "TERM",
            Category::Hour => "HOUR",
        }
    }
}

/// Insertion-ordered, de-duplicated terms and hours plus the category history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    terms: Vec<Term>,
    hours: Vec<Hour>,
    previous: Category,
    current: Category,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            hours: Vec::new(),
            previous: Category::None,
            current: Category::None,
        }
    }

    /// Empty accumulator following a flush: category resets to TERM
    pub fn after_flush(previous: Category) -> Self {
        Self {
            terms: Vec::new(),
            hours: Vec::new(),
            previous,
            current: Category::Term,
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn hours(&self) -> &[Hour] {
        &self.hours
    }

    pub fn category(&self) -> Category {
        self.current
    }

    pub fn previous_category(&self) -> Category {
        self.previous
    }

    pub fn has_terms(&self) -> bool {
        !self.terms.is_empty()
    }

    pub fn has_hours(&self) -> bool {
        !self.hours.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.hours.is_empty()
    }

    /// Number of (term, hour) pairs a flush would write
    pub fn pair_count(&self) -> usize {
        self.terms.len() * self.hours.len()
    }

    /// Append a term without touching the category. Returns false if it was
    /// already present or the group is full.
    pub fn push_term(&mut self, term: Term) -> bool {
        if self.terms.contains(&term) {
            return false;
        }
        if self.terms.len() >= MAX_TERMS_PER_GROUP {
            log_warning!(
                code = codes::classification::ACCUMULATOR_LIMIT_REACHED,
                "Term group full, term dropped",
                "term" => term,
                "limit" => MAX_TERMS_PER_GROUP
            );
            return false;
        }
        self.terms.push(term);
        true
    }

    /// Append an hour without touching the category
    pub fn push_hour(&mut self, hour: Hour) -> bool {
        if self.hours.contains(&hour) {
            return false;
        }
        if self.hours.len() >= MAX_HOURS_PER_GROUP {
            log_warning!(
                code = codes::classification::ACCUMULATOR_LIMIT_REACHED,
                "Hour group full, hour dropped",
                "hour" => hour,
                "limit" => MAX_HOURS_PER_GROUP
            );
            return false;
        }
        self.hours.push(hour);
        true
    }

    pub fn set_category(&mut self, category: Category) {
        self.previous = self.current;
        self.current = category;
    }

    /// Accept a classified term: append it and move to TERM
    pub fn accept_term(&mut self, term: Term) {
        self.push_term(term);
        self.set_category(Category::Term);
    }

    /// Accept a classified hour: append it and move to HOUR
    pub fn accept_hour(&mut self, hour: Hour) {
        self.push_hour(hour);
        self.set_category(Category::Hour);
    }

    /// Accepting a term now would close the current group
    pub fn term_closes_group(&self) -> bool {
        self.current == Category::Hour && self.has_terms()
    }

    /// Drop every term matching `predicate`; returns how many were removed
    pub fn remove_terms<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Term) -> bool,
    {
        let before = self.terms.len();
        self.terms.retain(|t| !predicate(t));
        before - self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Season;

    #[test]
    fn test_push_deduplicates_in_order() {
        let mut acc = Accumulator::new();
        assert!(acc.push_term(Term::new(2013, Season::Fall)));
        assert!(acc.push_term(Term::new(2014, Season::Winter)));
        assert!(!acc.push_term(Term::new(2013, Season::Fall)));
        assert_eq!(
            acc.terms(),
            &[Term::new(2013, Season::Fall), Term::new(2014, Season::Winter)]
        );
        assert_eq!(acc.category(), Category::None);
    }

    #[test]
    fn test_category_transitions() {
        let mut acc = Accumulator::new();
        assert!(!acc.term_closes_group());

        acc.accept_term(Term::new(2013, Season::Fall));
        assert_eq!(acc.category(), Category::Term);
        assert_eq!(acc.previous_category(), Category::None);

        acc.accept_hour(Hour::new("9"));
        assert_eq!(acc.category(), Category::Hour);
        assert_eq!(acc.previous_category(), Category::Term);
        assert!(acc.term_closes_group());
        assert_eq!(acc.pair_count(), 1);
    }

    #[test]
    fn test_hours_without_terms_do_not_close_group() {
        let mut acc = Accumulator::new();
        acc.accept_hour(Hour::new("9L"));
        assert!(!acc.term_closes_group());
    }

    #[test]
    fn test_after_flush_resets_to_term() {
        let acc = Accumulator::after_flush(Category::Hour);
        assert!(acc.is_empty());
        assert_eq!(acc.category(), Category::Term);
        assert_eq!(acc.previous_category(), Category::Hour);
    }

    #[test]
    fn test_remove_terms() {
        let mut acc = Accumulator::new();
        for season in Season::ALL {
            acc.push_term(Term::new(2014, season));
        }
        let removed = acc.remove_terms(|t| t.season == Season::Summer);
        assert_eq!(removed, 1);
        assert_eq!(acc.terms().len(), 3);
    }

    #[test]
    fn test_term_cap() {
        let mut acc = Accumulator::new();
        let mut accepted = 0;
        for year in 0..(MAX_TERMS_PER_GROUP as i32 + 5) {
            if acc.push_term(Term::new(2000 + year, Season::Fall)) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, MAX_TERMS_PER_GROUP);
    }
}
