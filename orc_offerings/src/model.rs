//! Catalog data model: terms, hours, courses, departments and offerings

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TERMS
// ============================================================================

/// Academic season, ordered chronologically within a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Catalog letter: `W`, `S`, `X` (summer) or `F`
    pub fn as_char(&self) -> char {
        match self {
            Season::Winter => 'W',
            Season::Spring => 'S',
            Season::Summer => 'X',
            Season::Fall => 'F',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'W' => Some(Season::Winter),
            'S' => Some(Season::Spring),
            'X' => Some(Season::Summer),
            'F' => Some(Season::Fall),
            _ => None,
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

/// A (year, season) pair. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

impl Term {
    pub fn new(year: i32, season: Season) -> Self {
        Self { year, season }
    }

    /// Parse the catalog shorthand `13F`: two digits for 2000+YY and a season letter
    pub fn from_shorthand(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 3 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
            return None;
        }
        let season = Season::from_char(bytes[2] as char)?;
        let year = 2000 + ((bytes[0] - b'0') as i32) * 10 + (bytes[1] - b'0') as i32;
        Some(Self::new(year, season))
    }

    /// Term spelled by the first three characters, as in `14Fall` or `13F/14W`
    pub fn from_prefix(text: &str) -> Option<Self> {
        text.get(..3).and_then(Self::from_shorthand)
    }

    /// Inclusive range membership
    pub fn in_range(&self, start: Term, end: Term) -> bool {
        start <= *self && *self <= end
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{}", self.year.rem_euclid(100), self.season.as_char())
    }
}

// ============================================================================
// HOURS
// ============================================================================

/// Meeting period label, e.g. `10`, `2A`, `Arrange` or a literal range `3:30-5:30`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hour {
    pub period: String,
}

impl Hour {
    /// Label of the unknown-hour sentinel
    pub const UNKNOWN_PERIOD: &'static str = "?";
    pub const ARRANGE_PERIOD: &'static str = "Arrange";

    pub fn new(period: &str) -> Self {
        Self {
            period: period.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN_PERIOD)
    }

    pub fn is_unknown(&self) -> bool {
        self.period == Self::UNKNOWN_PERIOD
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.period)
    }
}

// ============================================================================
// COURSES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub abbreviation: String,
    pub name: String,
}

impl Department {
    pub fn new(abbreviation: &str, name: &str) -> Self {
        Self {
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    /// Department abbreviation, e.g. `COSC`
    pub department: String,
    /// Course number as printed, e.g. `1`, `10.01`
    pub number: String,
    pub name: String,
    pub description: String,
}

impl Course {
    /// `DEPT NUMBER`, used for log context
    pub fn label(&self) -> String {
        format!("{} {}", self.department, self.number)
    }
}

// ============================================================================
// OFFERINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferingId(pub u64);

/// Who produced an offering. User-entered offerings survive every sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    SystemDerived,
    UserEntered,
}

/// Whether the current pass has produced or confirmed an offering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchState {
    Untouched,
    Touched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub id: OfferingId,
    pub course: CourseId,
    pub term: Term,
    pub hour: Hour,
    pub description: String,
    pub origin: Origin,
    pub touch: TouchState,
}

impl Offering {
    pub fn is_user_entered(&self) -> bool {
        self.origin == Origin::UserEntered
    }

    pub fn is_touched(&self) -> bool {
        self.touch == TouchState::Touched
    }
}

/// Write request for `OfferingStore::upsert_offering`. With an id it updates
/// that record in place, otherwise it inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferingDraft {
    pub id: Option<OfferingId>,
    pub course: CourseId,
    pub term: Term,
    pub hour: Hour,
    pub description: String,
    pub origin: Origin,
    pub touch: TouchState,
}

impl OfferingDraft {
    /// A fresh, touched, system-derived offering
    pub fn derived(course: CourseId, term: Term, hour: Hour, description: &str) -> Self {
        Self {
            id: None,
            course,
            term,
            hour,
            description: description.to_string(),
            origin: Origin::SystemDerived,
            touch: TouchState::Touched,
        }
    }

    /// Move an existing offering to a new hour, keeping id and origin
    pub fn upgrade(existing: &Offering, hour: Hour) -> Self {
        Self {
            id: Some(existing.id),
            course: existing.course,
            term: existing.term,
            hour,
            description: existing.description.clone(),
            origin: existing.origin,
            touch: TouchState::Touched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_shorthand() {
        assert_eq!(
            Term::from_shorthand("13F"),
            Some(Term::new(2013, Season::Fall))
        );
        assert_eq!(
            Term::from_shorthand("05X"),
            Some(Term::new(2005, Season::Summer))
        );
        assert_eq!(Term::from_shorthand("13Q"), None);
        assert_eq!(Term::from_shorthand("113F"), None);
        assert_eq!(Term::from_shorthand("1F"), None);
    }

    #[test]
    fn test_term_prefix() {
        assert_eq!(Term::from_prefix("14Fall"), Some(Term::new(2014, Season::Fall)));
        assert_eq!(Term::from_prefix("13F/14W"), Some(Term::new(2013, Season::Fall)));
        assert_eq!(Term::from_prefix("113F"), None);
        assert_eq!(Term::from_prefix("1F"), None);
    }

    #[test]
    fn test_term_display_round_trips_shorthand() {
        let term = Term::new(2014, Season::Winter);
        assert_eq!(term.to_string(), "14W");
        assert_eq!(Term::from_shorthand(&term.to_string()), Some(term));
    }

    #[test]
    fn test_term_ordering_is_chronological() {
        let mut terms = vec![
            Term::new(2014, Season::Winter),
            Term::new(2013, Season::Fall),
            Term::new(2013, Season::Summer),
            Term::new(2013, Season::Winter),
            Term::new(2013, Season::Spring),
        ];
        terms.sort();
        let shorthand: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        assert_eq!(shorthand, vec!["13W", "13S", "13X", "13F", "14W"]);
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let start = Term::new(2005, Season::Winter);
        let end = Term::new(2013, Season::Fall);
        assert!(start.in_range(start, end));
        assert!(end.in_range(start, end));
        assert!(!Term::new(2014, Season::Winter).in_range(start, end));
        assert!(!Term::new(2004, Season::Fall).in_range(start, end));
    }

    #[test]
    fn test_unknown_hour() {
        assert!(Hour::unknown().is_unknown());
        assert!(!Hour::new("10").is_unknown());
    }
}
