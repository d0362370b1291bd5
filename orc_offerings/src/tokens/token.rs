//! Raw description tokens

use serde::{Deserialize, Serialize};

/// One whitespace-delimited word of a description, with its cleaned form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    /// Text as it appeared, punctuation included
    pub raw: String,
    /// `raw` without leading/trailing non-alphanumeric characters
    pub cleaned: String,
}

impl RawToken {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            cleaned: clean(raw).to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cleaned.is_empty()
    }

    /// First character of the cleaned token is an ASCII digit
    pub fn starts_with_digit(&self) -> bool {
        self.cleaned
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit())
    }
}

/// Strip leading and trailing characters that are not alphanumeric.
/// Underscore counts as non-alphanumeric.
pub fn clean(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Split description text on whitespace
pub fn tokenize(text: &str) -> Vec<RawToken> {
    text.split_whitespace().map(RawToken::new).collect()
}
