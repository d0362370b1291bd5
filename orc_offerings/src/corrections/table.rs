//! Ordered correction table and its application to one token

use std::path::Path;

use serde::Deserialize;

use super::builtin::builtin_rules;
use super::error::CorrectionError;
use super::rule::{Action, Rule};
use crate::config::compile_time::corrections::MAX_CORRECTION_RULES;
use crate::logging::codes;
use crate::machine::Accumulator;
use crate::model::{Course, Term};
use crate::store::{ReferenceData, StoreResult};
use crate::tokens::RawToken;
use crate::{log_debug, log_warning};

/// Result of running a token through the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// Token to classify; empty when the rule discarded it
    pub token: String,
    /// Course that becomes active for the rest of the description
    pub redirect: Option<Course>,
    /// Name of the rule that fired
    pub rule: Option<String>,
}

impl Correction {
    fn unchanged(token: &RawToken) -> Self {
        Self {
            token: token.cleaned.clone(),
            redirect: None,
            rule: None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        self.token.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// First-match-wins list of correction rules
#[derive(Debug, Clone, Default)]
pub struct CorrectionTable {
    rules: Vec<Rule>,
}

impl CorrectionTable {
    /// A table with no rules; every token passes through
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Result<Self, CorrectionError> {
        self.extend(std::iter::once(rule))?;
        Ok(self)
    }

    /// Append rules after the existing ones
    pub fn extend<I>(&mut self, rules: I) -> Result<(), CorrectionError>
    where
        I: IntoIterator<Item = Rule>,
    {
        let rules: Vec<Rule> = rules.into_iter().collect();

        let count = self.rules.len() + rules.len();
        if count > MAX_CORRECTION_RULES {
            return Err(CorrectionError::TooManyRules {
                count,
                limit: MAX_CORRECTION_RULES,
            });
        }

        for rule in &rules {
            validate(rule)?;
        }

        self.rules.extend(rules);
        Ok(())
    }

    /// Parse a `[[rules]]` table
    pub fn from_toml_str(content: &str) -> Result<Self, CorrectionError> {
        let file: RuleFile = toml::from_str(content)?;
        let mut table = Self::empty();
        table.extend(file.rules)?;
        Ok(table)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorrectionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CorrectionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the first rule whose predicates all hold. Injections go straight
    /// into `accumulator`. Only reference-data failures are errors.
    pub fn apply<R>(
        &self,
        department: &str,
        course: &Course,
        token: &RawToken,
        accumulator: &mut Accumulator,
        reference: &R,
    ) -> StoreResult<Correction>
    where
        R: ReferenceData + ?Sized,
    {
        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.matches(department, course, token, accumulator))
        else {
            return Ok(Correction::unchanged(token));
        };

        log_debug!(
            "Correction rule applied",
            "rule" => rule.name,
            "token" => token.cleaned,
            "action" => rule.action.name()
        );

        let mut correction = Correction {
            token: String::new(),
            redirect: None,
            rule: Some(rule.name.clone()),
        };

        match &rule.action {
            Action::Discard => {}
            Action::Replace { with } => correction.token = with.clone(),
            Action::InjectHourThenReplace { hour, with } => {
                if let Some(hour) = reference.lookup_hour(hour)? {
                    accumulator.push_hour(hour);
                }
                correction.token = with.clone();
            }
            Action::InjectTermThenDiscard { term } => {
                if let Some(term) = Term::from_shorthand(term) {
                    if let Some(known) = reference.lookup_term(term.year, term.season)? {
                        accumulator.push_term(known);
                    }
                }
            }
            Action::RedirectCourse { prefix } => {
                let number: String = match prefix {
                    Some(n) => token.cleaned.chars().take(*n).collect(),
                    None => token.cleaned.clone(),
                };
                correction.redirect = reference.lookup_course(department, &number)?;
                if correction.redirect.is_none() {
                    log_warning!(
                        code = codes::corrections::REDIRECT_TARGET_UNKNOWN,
                        "Course redirect target not found, keeping current course",
                        "rule" => rule.name,
                        "department" => department,
                        "number" => number
                    );
                }
            }
        }

        Ok(correction)
    }
}

fn validate(rule: &Rule) -> Result<(), CorrectionError> {
    if rule.name.trim().is_empty() {
        return Err(CorrectionError::InvalidRule {
            name: rule.name.clone(),
            reason: "rule name is empty".to_string(),
        });
    }
    rule.action
        .validate()
        .map_err(|reason| CorrectionError::InvalidRule {
            name: rule.name.clone(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrections::rule::TokenPredicate;
    use crate::model::{Hour, Season};
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;
    use std::io::Write;

    struct Fixture {
        store: MemoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: MemoryStore::with_default_vocabulary().unwrap(),
            }
        }

        fn course(&self, department: &str, number: &str, name: &str) -> Course {
            self.store.add_course(department, number, name).unwrap()
        }

        fn apply(&self, course: &Course, token: &str, acc: &mut Accumulator) -> Correction {
            CorrectionTable::builtin()
                .apply(&course.department, course, &RawToken::new(token), acc, &self.store)
                .unwrap()
        }
    }

    #[test]
    fn test_unmatched_token_passes_through() {
        let fx = Fixture::new();
        let course = fx.course("COSC", "1", "Introduction to Programming");
        let mut acc = Accumulator::new();

        let correction = fx.apply(&course, "13F,", &mut acc);
        assert_eq!(correction.token, "13F");
        assert_eq!(correction.rule, None);
        assert!(correction.redirect.is_none());
    }

    #[test]
    fn test_language_redirect() {
        let fx = Fixture::new();
        let first = fx.course("JAPN", "1", "Introductory Japanese I");
        let second = fx.course("JAPN", "2", "Introductory Japanese II");
        let mut acc = Accumulator::new();

        let correction = fx.apply(&first, "2", &mut acc);
        assert!(correction.is_discarded());
        assert_eq!(correction.redirect.map(|c| c.id), Some(second.id));
    }

    #[test]
    fn test_language_list_tokens_pass_through() {
        let fx = Fixture::new();
        let first = fx.course("RUSS", "1", "Introductory Russian I");
        fx.course("RUSS", "10", "Intermediate Russian");
        fx.course("RUSS", "13", "Advanced Russian");
        let mut acc = Accumulator::new();
        acc.accept_term(Term::new(2013, Season::Fall));

        for token in ["14W:", "10A,", "13F,"] {
            let correction = fx.apply(&first, token, &mut acc);
            assert!(!correction.is_discarded(), "{}", token);
            assert!(correction.redirect.is_none(), "{}", token);
        }
    }

    #[test]
    fn test_redirect_by_prefix() {
        let fx = Fixture::new();
        let first = fx.course("RUSS", "1", "Introductory Russian I");
        let tenth = fx.course("RUSS", "10", "Intermediate Russian");
        let table = CorrectionTable::empty()
            .with_rule(
                Rule::new(
                    "russ-numbered-list",
                    TokenPredicate::RawEndsWith {
                        suffix: ",".to_string(),
                    },
                    Action::RedirectCourse { prefix: Some(2) },
                )
                .in_departments(&["RUSS"]),
            )
            .unwrap();
        let mut acc = Accumulator::new();

        let correction = table
            .apply("RUSS", &first, &RawToken::new("10A,"), &mut acc, &fx.store)
            .unwrap();
        assert!(correction.is_discarded());
        assert_eq!(correction.redirect.map(|c| c.id), Some(tenth.id));
    }

    #[test]
    fn test_unknown_redirect_is_ignored() {
        let fx = Fixture::new();
        let chem = fx.course("CHEM", "5", "General Chemistry");
        let mut acc = Accumulator::new();

        let correction = fx.apply(&chem, "99", &mut acc);
        assert!(correction.is_discarded());
        assert!(correction.redirect.is_none());
    }

    #[test]
    fn test_inject_hour_then_replace() {
        let fx = Fixture::new();
        let latin = fx.course("CLST", "2", "Intermediate Latin");
        let mut acc = Accumulator::new();

        let correction = fx.apply(&latin, "9,2", &mut acc);
        assert_eq!(correction.token, "2");
        assert_eq!(acc.hours(), &[Hour::new("9")]);
    }

    #[test]
    fn test_inject_term_then_discard() {
        let fx = Fixture::new();
        let ints = fx.course("INTS", "17", "Introduction to International Studies");
        let mut acc = Accumulator::new();

        let correction = fx.apply(&ints, "12W:W", &mut acc);
        assert!(correction.is_discarded());
        assert_eq!(acc.terms(), &[Term::new(2012, Season::Winter)]);
    }

    #[test]
    fn test_replacements() {
        let fx = Fixture::new();
        let mut acc = Accumulator::new();

        let ling = fx.course("LING", "80", "Topics in Linguistics");
        assert_eq!(fx.apply(&ling, "31S", &mut acc).token, "13S");

        let govt = fx.course("GOVT", "5", "International Politics");
        assert_eq!(fx.apply(&govt, "11", &mut acc).token, "11F");

        let span = fx.course("SPAN", "3", "Language Study Abroad");
        assert_eq!(fx.apply(&span, "14", &mut acc).token, "14X");

        let german = fx.course("HIST", "45", "Studies in German History");
        assert_eq!(fx.apply(&german, "14:F", &mut acc).token, "14F");
    }

    #[test]
    fn test_discards() {
        let fx = Fixture::new();
        let mut acc = Accumulator::new();

        let ears = fx.course("EARS", "70", "Geology of the Southwest");
        assert!(fx.apply(&ears, "13F", &mut acc).is_discarded());

        let cosc = fx.course("COSC", "1", "Introduction to Programming");
        assert!(fx.apply(&cosc, "4th", &mut acc).is_discarded());
        assert!(fx.apply(&cosc, "10.01", &mut acc).is_discarded());

        let mus = fx.course("MUS", "50", "Performance Laboratories");
        assert!(fx.apply(&mus, "3", &mut acc).is_discarded());
        assert_eq!(fx.apply(&mus, "13F", &mut acc).token, "13F");
    }

    #[test]
    fn test_departments_with_rules_skip_catch_all_rules() {
        let fx = Fixture::new();
        let mut acc = Accumulator::new();
        acc.accept_term(Term::new(2013, Season::Fall));

        let chem = fx.course("CHEM", "5", "General Chemistry");
        assert_eq!(fx.apply(&chem, "4th", &mut acc).token, "4th");
        assert_eq!(fx.apply(&chem, "10.01", &mut acc).token, "10.01");

        let latin = fx.course("CLST", "2", "Intermediate Latin");
        assert_eq!(fx.apply(&latin, "10.01", &mut acc).token, "10.01");
        assert_eq!(fx.apply(&latin, "4th", &mut acc).rule, None);

        let econ = fx.course("ECON", "39", "International Finance and Open-Economy Macroeconomics");
        assert!(fx.apply(&econ, "10.01", &mut acc).is_discarded());
    }

    #[test]
    fn test_with_rule_appends_after_builtins() {
        let fx = Fixture::new();
        let cosc = fx.course("COSC", "1", "Introduction to Programming");
        let table = CorrectionTable::builtin()
            .with_rule(
                Rule::new(
                    "cosc-typo",
                    TokenPredicate::Equals {
                        value: "13FF".to_string(),
                    },
                    Action::Replace {
                        with: "13F".to_string(),
                    },
                )
                .in_departments(&["COSC"]),
            )
            .unwrap();

        let mut acc = Accumulator::new();
        let correction = table
            .apply("COSC", &cosc, &RawToken::new("13FF"), &mut acc, &fx.store)
            .unwrap();
        assert_eq!(correction.token, "13F");
        assert_eq!(correction.rule.as_deref(), Some("cosc-typo"));
    }

    #[test]
    fn test_from_toml_str() {
        let table = CorrectionTable::from_toml_str(
            r#"
            [[rules]]
            name = "phys-missing-winter"
            scope = { departments = ["PHYS"], course_number = "13" }
            token = { kind = "equals", value = "15" }
            action = { type = "replace", with = "15W" }

            [[rules]]
            name = "phys-redirect"
            scope = { departments = ["PHYS"], course_name = { contains = "Lab" } }
            token = { kind = "shorter_than", len = 3 }
            when = "no_terms"
            action = { type = "redirect_course" }
            "#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rules()[1].action, Action::RedirectCourse { prefix: None });

        let fx = Fixture::new();
        let phys = fx.course("PHYS", "13", "Introductory Physics I");
        let mut acc = Accumulator::new();
        let correction = table
            .apply("PHYS", &phys, &RawToken::new("15"), &mut acc, &fx.store)
            .unwrap();
        assert_eq!(correction.token, "15W");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[rules]]
            name = "drop-everything"
            token = {{ kind = "any" }}
            action = {{ type = "discard" }}
            "#
        )
        .unwrap();

        let table = CorrectionTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_tables() {
        assert_matches!(
            CorrectionTable::from_toml_str("[[rules]]\nname = 'x'\n"),
            Err(CorrectionError::Parse(_))
        );
        assert_matches!(
            CorrectionTable::from_toml_str(
                r#"
                [[rules]]
                name = "bad-term"
                token = { kind = "any" }
                action = { type = "inject_term_then_discard", term = "Fall" }
                "#
            ),
            Err(CorrectionError::InvalidRule { name, .. }) if name == "bad-term"
        );
        assert_matches!(
            CorrectionTable::load("/nonexistent/rules.toml"),
            Err(CorrectionError::Io { .. })
        );
    }

    #[test]
    fn test_rule_cap() {
        let rules = (0..=MAX_CORRECTION_RULES)
            .map(|i| Rule::new(&format!("rule-{}", i), TokenPredicate::Any, Action::Discard));
        let mut table = CorrectionTable::empty();
        assert_matches!(table.extend(rules), Err(CorrectionError::TooManyRules { .. }));
        assert!(table.is_empty());
    }
}
