//! Token classification
//!
//! A token is classified in two stages. [`Classifier::classify_prelude`] runs
//! on the cleaned token before departmental corrections: control keywords,
//! the non-numeric hour labels and the leading-digit test. Tokens that survive
//! are corrected by the caller and handed to [`Classifier::classify`], which
//! resolves exact hours, term shorthands, compounds and literal time ranges.

use std::sync::OnceLock;

use regex::Regex;

use super::keywords::ControlKeyword;
use super::splitter;
use super::token::RawToken;
use crate::logging::codes;
use crate::model::{Hour, Term};
use crate::store::{ReferenceData, StoreResult};
use crate::{log_debug, log_warning};

/// Hour labels that do not start with a digit but are still hours
pub const NAMED_HOURS: &[&str] = &["FSP", "D.F.S.P", "D.L.S.A"];

/// `3:30`, `10:00` or `1-3` anywhere in the token
const TIME_RANGE_PATTERN: &str = r"[0-9][0-9]?:[0-9][0-9]|[0-9]-[0-9]";

static TIME_RANGE: OnceLock<Option<Regex>> = OnceLock::new();

/// Whether the token looks like a literal meeting time
pub fn is_time_range(text: &str) -> bool {
    TIME_RANGE
        .get_or_init(|| super::compile_pattern(TIME_RANGE_PATTERN))
        .as_ref()
        .map_or(false, |re| re.is_match(text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    Control(ControlKeyword),
    Hour(Hour),
    Term(Term),
    /// Colon- or comma-joined token; the text is handed to the splitter
    Compound(String),
    Unrecognized,
    /// Starts with a digit; run the correction table, then [`Classifier::classify`]
    NeedsCorrection,
}

impl TokenClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Control(_) => "CONTROL",
            Self::Hour(_) => "HOUR",
            Self::Term(_) => "TERM",
            Self::Compound(_) => "COMPOUND",
            Self::Unrecognized => "UNRECOGNIZED",
            Self::NeedsCorrection => "NEEDS_CORRECTION",
        }
    }
}

pub struct Classifier<'a, R: ReferenceData + ?Sized> {
    reference: &'a R,
}

impl<'a, R: ReferenceData + ?Sized> Classifier<'a, R> {
    pub fn new(reference: &'a R) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &'a R {
        self.reference
    }

    /// Stage one: keywords, named hours and the leading-digit test
    pub fn classify_prelude(&self, token: &RawToken) -> StoreResult<TokenClass> {
        let cleaned = token.cleaned.as_str();

        if let Some(keyword) = ControlKeyword::match_token(cleaned) {
            return Ok(TokenClass::Control(keyword));
        }

        if NAMED_HOURS.contains(&cleaned) {
            return Ok(match self.reference.lookup_hour(cleaned)? {
                Some(hour) => TokenClass::Hour(hour),
                None => TokenClass::Unrecognized,
            });
        }

        if !token.starts_with_digit() {
            return Ok(TokenClass::Unrecognized);
        }

        Ok(TokenClass::NeedsCorrection)
    }

    /// Stage two, on a corrected token
    pub fn classify(&self, text: &str) -> StoreResult<TokenClass> {
        if text.is_empty() {
            return Ok(TokenClass::Unrecognized);
        }

        if let Some(hour) = self.reference.lookup_hour(text)? {
            return Ok(TokenClass::Hour(hour));
        }

        if Term::from_shorthand(text).is_some() {
            return Ok(match self.resolve_term(text)? {
                Some(term) => TokenClass::Term(term),
                None => TokenClass::Unrecognized,
            });
        }

        if splitter::is_compound(text) {
            return Ok(TokenClass::Compound(text.to_string()));
        }

        if let Some(hour) = self.resolve_time_range(text)? {
            return Ok(TokenClass::Hour(hour));
        }

        if let Some(term) = Term::from_prefix(text) {
            if let Some(known) = self.reference.lookup_term(term.year, term.season)? {
                log_debug!("Term read from token prefix", "token" => text, "term" => known);
                return Ok(TokenClass::Term(known));
            }
        }

        log_debug!("Token unrecognized", "token" => text);
        Ok(TokenClass::Unrecognized)
    }

    /// Known term for a `YYS` shorthand. Well-formed but unknown terms are dropped with a warning.
    pub fn resolve_term(&self, text: &str) -> StoreResult<Option<Term>> {
        let Some(term) = Term::from_shorthand(text) else {
            return Ok(None);
        };

        let known = self.reference.lookup_term(term.year, term.season)?;
        if known.is_none() {
            log_warning!(
                code = codes::classification::UNKNOWN_TERM,
                "Term shorthand not in reference data",
                "token" => text
            );
        }
        Ok(known)
    }

    /// Exact hour label or literal time range; nothing else
    pub fn resolve_hour_only(&self, text: &str) -> StoreResult<Option<Hour>> {
        if let Some(hour) = self.reference.lookup_hour(text)? {
            return Ok(Some(hour));
        }
        self.resolve_time_range(text)
    }

    /// Reuse or create the hour for a literal time range
    fn resolve_time_range(&self, text: &str) -> StoreResult<Option<Hour>> {
        if !is_time_range(text) {
            return Ok(None);
        }

        if let Some(hour) = self.reference.lookup_hour(text)? {
            return Ok(Some(hour));
        }

        log_debug!("Creating time-range hour", "period" => text);
        self.reference.create_hour(text).map(Some)
    }
}
