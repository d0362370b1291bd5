//! Correction rule definitions
//!
//! A rule is a conjunction of predicates (course scope, token shape,
//! accumulator state) plus one action. Rules are plain data so tables can be
//! loaded from TOML:
//!
//! ```toml
//! [[rules]]
//! name = "ling-80-swapped-digits"
//! scope = { departments = ["LING"] }
//! token = { kind = "equals", value = "31S" }
//! action = { type = "replace", with = "13S" }
//! ```

use serde::{Deserialize, Serialize};

use crate::machine::Accumulator;
use crate::model::{Course, Term};
use crate::tokens::RawToken;

/// Which courses a rule applies to. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleScope {
    pub departments: Vec<String>,
    /// Departments the rule never applies to, checked after `departments`
    pub excluded_departments: Vec<String>,
    pub course_number: Option<String>,
    pub course_name: Option<NameMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    Exact(String),
    Contains(String),
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(expected) => name == expected,
            NameMatch::Contains(fragment) => name.contains(fragment.as_str()),
        }
    }
}

impl RuleScope {
    pub fn matches(&self, department: &str, course: &Course) -> bool {
        if !self.departments.is_empty() && !self.departments.iter().any(|d| d == department) {
            return false;
        }
        if self.excluded_departments.iter().any(|d| d == department) {
            return false;
        }
        if let Some(number) = &self.course_number {
            if &course.number != number {
                return false;
            }
        }
        if let Some(name) = &self.course_name {
            if !name.matches(&course.name) {
                return false;
            }
        }
        true
    }
}

/// Shape test on the token. All variants except `RawEndsWith` look at the
/// cleaned token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenPredicate {
    Any,
    Equals { value: String },
    Contains { value: String },
    ShorterThan { len: usize },
    Length { len: usize },
    ContainsPeriod,
    RawEndsWith { suffix: String },
}

impl TokenPredicate {
    pub fn matches(&self, token: &RawToken) -> bool {
        let cleaned = token.cleaned.as_str();
        match self {
            TokenPredicate::Any => true,
            TokenPredicate::Equals { value } => cleaned == value,
            TokenPredicate::Contains { value } => cleaned.contains(value.as_str()),
            TokenPredicate::ShorterThan { len } => cleaned.chars().count() < *len,
            TokenPredicate::Length { len } => cleaned.chars().count() == *len,
            TokenPredicate::ContainsPeriod => cleaned.contains('.'),
            TokenPredicate::RawEndsWith { suffix } => token.raw.ends_with(suffix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorCondition {
    /// No term accumulated yet in the current group
    NoTerms,
}

impl AccumulatorCondition {
    pub fn holds(&self, accumulator: &Accumulator) -> bool {
        match self {
            AccumulatorCondition::NoTerms => !accumulator.has_terms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Discard,
    Replace {
        with: String,
    },
    /// Append a known hour to the accumulator, then continue with `with`
    InjectHourThenReplace {
        hour: String,
        with: String,
    },
    /// Append a known term (catalog shorthand) to the accumulator and discard the token
    InjectTermThenDiscard {
        term: String,
    },
    /// Make another course of the same department the active course and
    /// discard the token. The course number is the whole cleaned token, or
    /// its first `prefix` characters.
    RedirectCourse {
        #[serde(default)]
        prefix: Option<usize>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Discard => "discard",
            Action::Replace { .. } => "replace",
            Action::InjectHourThenReplace { .. } => "inject_hour_then_replace",
            Action::InjectTermThenDiscard { .. } => "inject_term_then_discard",
            Action::RedirectCourse { .. } => "redirect_course",
        }
    }

    /// Static problems that would make the action a no-op or ambiguous
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Action::InjectTermThenDiscard { term } if Term::from_shorthand(term).is_none() => {
                Err(format!("'{}' is not a term shorthand", term))
            }
            Action::InjectHourThenReplace { hour, .. } if hour.is_empty() => {
                Err("injected hour is empty".to_string())
            }
            Action::RedirectCourse { prefix: Some(0) } => {
                Err("redirect prefix must be at least one character".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,

    #[serde(default)]
    pub scope: RuleScope,

    pub token: TokenPredicate,

    #[serde(default)]
    pub when: Option<AccumulatorCondition>,

    pub action: Action,
}

impl Rule {
    /// A rule applying to every course
    pub fn new(name: &str, token: TokenPredicate, action: Action) -> Self {
        Self {
            name: name.to_string(),
            scope: RuleScope::default(),
            token,
            when: None,
            action,
        }
    }

    pub fn in_departments(mut self, departments: &[&str]) -> Self {
        self.scope.departments = departments.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn except_departments(mut self, departments: &[&str]) -> Self {
        self.scope.excluded_departments = departments.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn for_course_number(mut self, number: &str) -> Self {
        self.scope.course_number = Some(number.to_string());
        self
    }

    pub fn for_course_named(mut self, name: &str) -> Self {
        self.scope.course_name = Some(NameMatch::Exact(name.to_string()));
        self
    }

    pub fn for_course_name_containing(mut self, fragment: &str) -> Self {
        self.scope.course_name = Some(NameMatch::Contains(fragment.to_string()));
        self
    }

    pub fn when_no_terms(mut self) -> Self {
        self.when = Some(AccumulatorCondition::NoTerms);
        self
    }

    /// Whether every predicate of the rule holds
    pub fn matches(
        &self,
        department: &str,
        course: &Course,
        token: &RawToken,
        accumulator: &Accumulator,
    ) -> bool {
        self.scope.matches(department, course)
            && self.token.matches(token)
            && self.when.map_or(true, |condition| condition.holds(accumulator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseId, Season};

    fn course(department: &str, number: &str, name: &str) -> Course {
        Course {
            id: CourseId(1),
            department: department.to_string(),
            number: number.to_string(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_scope_matching() {
        let latin = course("CLST", "2", "Intermediate Latin");
        let scope = RuleScope {
            departments: vec!["CLST".to_string()],
            course_name: Some(NameMatch::Exact("Intermediate Latin".to_string())),
            ..RuleScope::default()
        };
        assert!(scope.matches("CLST", &latin));
        assert!(!scope.matches("MATH", &latin));
        assert!(RuleScope::default().matches("ANY", &latin));

        let containing = RuleScope {
            course_name: Some(NameMatch::Contains("Latin".to_string())),
            ..RuleScope::default()
        };
        assert!(containing.matches("CLST", &latin));

        let excluding = RuleScope {
            excluded_departments: vec!["CLST".to_string()],
            ..RuleScope::default()
        };
        assert!(!excluding.matches("CLST", &latin));
        assert!(excluding.matches("HIST", &latin));
    }

    #[test]
    fn test_token_predicates() {
        let token = RawToken::new("10.01,");
        assert!(TokenPredicate::ContainsPeriod.matches(&token));
        assert!(TokenPredicate::RawEndsWith { suffix: ",".to_string() }.matches(&token));
        assert!(TokenPredicate::Length { len: 5 }.matches(&token));
        assert!(!TokenPredicate::ShorterThan { len: 3 }.matches(&token));
        assert!(TokenPredicate::ShorterThan { len: 3 }.matches(&RawToken::new("5")));
        assert!(TokenPredicate::Contains { value: "11".to_string() }.matches(&RawToken::new("11:F")));
    }

    #[test]
    fn test_accumulator_condition() {
        let mut acc = Accumulator::new();
        assert!(AccumulatorCondition::NoTerms.holds(&acc));
        acc.accept_term(Term::new(2013, Season::Fall));
        assert!(!AccumulatorCondition::NoTerms.holds(&acc));
    }

    #[test]
    fn test_rule_requires_every_predicate() {
        let rule = Rule::new(
            "chem-redirect",
            TokenPredicate::ShorterThan { len: 3 },
            Action::RedirectCourse { prefix: None },
        )
        .in_departments(&["CHEM"])
        .when_no_terms();

        let chem = course("CHEM", "5", "General Chemistry");
        let mut acc = Accumulator::new();
        assert!(rule.matches("CHEM", &chem, &RawToken::new("6"), &acc));
        assert!(!rule.matches("CHEM", &chem, &RawToken::new("13F"), &acc));

        acc.accept_term(Term::new(2013, Season::Fall));
        assert!(!rule.matches("CHEM", &chem, &RawToken::new("6"), &acc));
    }

    #[test]
    fn test_action_validation() {
        assert!(Action::InjectTermThenDiscard { term: "12W".to_string() }.validate().is_ok());
        assert!(Action::InjectTermThenDiscard { term: "W12".to_string() }.validate().is_err());
        assert!(Action::RedirectCourse { prefix: Some(0) }.validate().is_err());
        assert!(Action::Discard.validate().is_ok());
    }
}
