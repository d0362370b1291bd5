//! Departmental corrections for known catalog irregularities

use super::rule::{Action, Rule, TokenPredicate};

const LANGUAGE_DEPARTMENTS: &[&str] = &["ARAB", "HEBR", "CHIN", "JAPN", "RUSS"];

/// Departments with rules of their own. Course-name and catch-all rules skip
/// them, so a token in these departments is only ever corrected by its
/// department's rules.
const DEPARTMENTS_WITH_RULES: &[&str] = &[
    "ARAB", "HEBR", "CHIN", "JAPN", "RUSS", "CHEM", "CLST", "EARS", "GOVT", "INTS", "MATH",
    "LING", "MUS",
];

fn equals(value: &str) -> TokenPredicate {
    TokenPredicate::Equals {
        value: value.to_string(),
    }
}

fn replace(with: &str) -> Action {
    Action::Replace {
        with: with.to_string(),
    }
}

/// The built-in table, in priority order
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        // Language listings put the course number in front of its offerings
        Rule::new(
            "language-course-number",
            TokenPredicate::ShorterThan { len: 3 },
            Action::RedirectCourse { prefix: None },
        )
        .in_departments(LANGUAGE_DEPARTMENTS)
        .when_no_terms(),
        Rule::new(
            "chem-course-number",
            TokenPredicate::ShorterThan { len: 3 },
            Action::RedirectCourse { prefix: None },
        )
        .in_departments(&["CHEM"])
        .when_no_terms(),
        Rule::new(
            "clst-latin-joined-hours",
            equals("9,2"),
            Action::InjectHourThenReplace {
                hour: "9".to_string(),
                with: "2".to_string(),
            },
        )
        .in_departments(&["CLST"])
        .for_course_named("Intermediate Latin"),
        Rule::new("ears-70-invalid-listing", TokenPredicate::Any, Action::Discard)
            .in_departments(&["EARS"])
            .for_course_number("70"),
        Rule::new(
            "govt-fall-11",
            TokenPredicate::Contains {
                value: "11".to_string(),
            },
            replace("11F"),
        )
        .in_departments(&["GOVT"])
        .when_no_terms(),
        Rule::new(
            "govt-60-misplaced-colon",
            TokenPredicate::Contains {
                value: "11:F".to_string(),
            },
            replace("11F"),
        )
        .in_departments(&["GOVT"])
        .for_course_number("60"),
        Rule::new(
            "ints-joined-term",
            equals("12W:W"),
            Action::InjectTermThenDiscard {
                term: "12W".to_string(),
            },
        )
        .in_departments(&["INTS"]),
        Rule::new("math-discontinued-discrete", TokenPredicate::Any, Action::Discard)
            .in_departments(&["MATH"])
            .for_course_named("Discrete Mathematics in Computer Science"),
        Rule::new("math-discontinued-linear-programming", TokenPredicate::Any, Action::Discard)
            .in_departments(&["MATH"])
            .for_course_name_containing("Linear Programming"),
        Rule::new("ling-swapped-digits", equals("31S"), replace("13S")).in_departments(&["LING"]),
        Rule::new(
            "mus-section-numbers",
            TokenPredicate::Length { len: 1 },
            Action::Discard,
        )
        .in_departments(&["MUS"])
        .for_course_named("Performance Laboratories"),
        Rule::new("econ-missing-fall", equals("14"), replace("14F"))
            .except_departments(DEPARTMENTS_WITH_RULES)
            .for_course_named("International Finance and Open-Economy Macroeconomics"),
        Rule::new("span-lsa-missing-summer", equals("14"), replace("14X"))
            .in_departments(&["SPAN"])
            .for_course_named("Language Study Abroad"),
        Rule::new("german-history-misplaced-colon", equals("14:F"), replace("14F"))
            .except_departments(DEPARTMENTS_WITH_RULES)
            .for_course_named("Studies in German History"),
        // "Offered every 4th ..."
        Rule::new("ordinal-4th", equals("4th"), Action::Discard)
            .except_departments(DEPARTMENTS_WITH_RULES),
        Rule::new("ecs-not-listed", TokenPredicate::Any, Action::Discard).in_departments(&["ECS"]),
        Rule::new("period-in-token", TokenPredicate::ContainsPeriod, Action::Discard)
            .except_departments(DEPARTMENTS_WITH_RULES),
    ]
}
