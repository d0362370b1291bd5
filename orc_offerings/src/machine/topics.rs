//! Topic scan for courses whose offerings vary by topic
//!
//! Such descriptions say "Varies" and list each topic elsewhere in the
//! document with its own `13F at 2` style schedule.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::compile_time::description::MAX_TOPIC_FRAGMENTS;
use crate::log_warning;
use crate::logging::codes;
use crate::store::DescriptionContext;
use crate::tokens::compile_pattern;

const TOPIC_PATTERN: &str = r"[0-9][0-9][FWSX] at [0-9A-Z]{1,2}";

static TOPIC: OnceLock<Option<Regex>> = OnceLock::new();

pub fn is_topic_fragment(text: &str) -> bool {
    TOPIC
        .get_or_init(|| compile_pattern(TOPIC_PATTERN))
        .as_ref()
        .map_or(false, |re| re.is_match(text))
}

/// Fragments of `context` that carry a topic schedule, in document order
pub fn topic_fragments(context: &DescriptionContext) -> Vec<&str> {
    let matching: Vec<&str> = context
        .fragments
        .iter()
        .map(String::as_str)
        .filter(|fragment| is_topic_fragment(fragment))
        .collect();

    if matching.len() > MAX_TOPIC_FRAGMENTS {
        log_warning!(
            code = codes::classification::TOPIC_FRAGMENT_LIMIT,
            "Too many topic fragments, extra fragments ignored",
            "found" => matching.len(),
            "limit" => MAX_TOPIC_FRAGMENTS
        );
        return matching.into_iter().take(MAX_TOPIC_FRAGMENTS).collect();
    }

    matching
}
