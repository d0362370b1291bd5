//! Compound splitting of colon- and comma-joined tokens.
//!
//! Catalog listings often drop the space after punctuation: `14W:9L`,
//! `13F,14W`, `9,2`. The colon is only split when its left side is a term
//! shorthand, so literal times like `2:10` fall through to time-range
//! resolution. The colon is handled before the comma, so `14W:9,2` splits
//! into `14W`, then `9,2`.

use super::classifier::Classifier;
use crate::log_debug;
use crate::machine::Accumulator;
use crate::model::{Hour, Term};
use crate::store::{ReferenceData, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Text left to classify
    Remainder(String),
    /// The whole token resolved to an hour
    Resolved(Hour),
    /// Nothing left to classify
    Dropped,
}

/// Left and right of the first colon, when the left side is a term shorthand
fn colon_after_term(text: &str) -> Option<(&str, &str)> {
    let (left, right) = text.split_once(':')?;
    Term::from_shorthand(left).map(|_| (left, right))
}

pub fn is_compound(text: &str) -> bool {
    text.contains(',') || colon_after_term(text).is_some()
}

/// First colon- or comma-separated component is a term shorthand
pub fn leads_with_term(text: &str) -> bool {
    text.split([',', ':'])
        .next()
        .map_or(false, |first| Term::from_shorthand(first).is_some())
}

/// Split one level of a compound token. Components other than the returned
/// remainder are appended to the accumulator without changing its category.
pub fn split<R>(
    text: &str,
    accumulator: &mut Accumulator,
    classifier: &Classifier<'_, R>,
) -> StoreResult<SplitOutcome>
where
    R: ReferenceData + ?Sized,
{
    if let Some((left, right)) = colon_after_term(text) {
        // A term is already pending, so the colon is decorative
        if accumulator.has_terms() {
            return Ok(match classifier.resolve_hour_only(text)? {
                Some(hour) => SplitOutcome::Resolved(hour),
                None => {
                    log_debug!("Decorative colon token dropped", "token" => text);
                    SplitOutcome::Dropped
                }
            });
        }

        if let Some(term) = classifier.resolve_term(left)? {
            accumulator.push_term(term);
        }
        return Ok(remainder(right));
    }

    let parts: Vec<&str> = text.split(',').collect();
    if let Some((last, leading)) = parts.split_last() {
        if !leading.is_empty() {
            for part in leading {
                split_component(part, accumulator, classifier)?;
            }
            return Ok(remainder(last));
        }
    }

    Ok(remainder(text))
}

/// Hour first, then term
fn split_component<R>(
    part: &str,
    accumulator: &mut Accumulator,
    classifier: &Classifier<'_, R>,
) -> StoreResult<()>
where
    R: ReferenceData + ?Sized,
{
    if part.is_empty() {
        return Ok(());
    }

    if let Some(hour) = classifier.reference().lookup_hour(part)? {
        accumulator.push_hour(hour);
    } else if let Some(term) = classifier.resolve_term(part)? {
        accumulator.push_term(term);
    } else {
        log_debug!("Comma component dropped", "component" => part);
    }
    Ok(())
}

fn remainder(text: &str) -> SplitOutcome {
    if text.is_empty() {
        SplitOutcome::Dropped
    } else {
        SplitOutcome::Remainder(text.to_string())
    }
}
