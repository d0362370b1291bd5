//! Token handling for offering descriptions
//!
//! - [`token`]: whitespace tokenization and punctuation cleaning
//! - [`keywords`]: control keywords checked before anything else
//! - [`classifier`]: hour / term / compound / time-range classification
//! - [`splitter`]: colon- and comma-joined compound tokens

pub mod classifier;
pub mod keywords;
pub mod splitter;
pub mod token;

pub use classifier::{Classifier, TokenClass};
pub use keywords::{ControlEffect, ControlKeyword};
pub use splitter::SplitOutcome;
pub use token::{clean, tokenize, RawToken};

use crate::log_error;
use crate::logging::codes;
use regex::Regex;

/// Compile a fixed pattern, logging instead of panicking if it is rejected.
/// Callers treat `None` as "never matches".
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log_error!(
                codes::system::INTERNAL_ERROR,
                "Built-in pattern failed to compile",
                "pattern" => pattern,
                "error" => e
            );
            None
        }
    }
}
