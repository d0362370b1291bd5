//! Event codes and their classification metadata
//!
//! Every error, warning and success code the scraper emits is declared here
//! together with its category, severity and recommended action.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod configuration {
    use super::Code;

    pub const CONFIG_FILE_UNREADABLE: Code = Code::new("E005");
    pub const CONFIG_PARSE_ERROR: Code = Code::new("E006");
    pub const INVALID_PREFERENCE: Code = Code::new("E007");
}

pub mod store {
    use super::Code;

    pub const RECORD_NOT_FOUND: Code = Code::new("E010");
    pub const DUPLICATE_OFFERING: Code = Code::new("E011");
    pub const STORE_UNAVAILABLE: Code = Code::new("E012");
}

/// Token classification warnings (never errors: tokens are dropped)
pub mod classification {
    use super::Code;

    pub const TOKEN_LIMIT_EXCEEDED: Code = Code::new("W020");
    pub const UNKNOWN_TERM: Code = Code::new("W021");
    pub const ACCUMULATOR_LIMIT_REACHED: Code = Code::new("W022");
    pub const COMPOUND_DEPTH_EXCEEDED: Code = Code::new("W023");
    pub const TOPIC_FRAGMENT_LIMIT: Code = Code::new("W024");
}

pub mod corrections {
    use super::Code;

    pub const INVALID_RULE_TABLE: Code = Code::new("E030");
    pub const RULE_TABLE_TOO_LARGE: Code = Code::new("E031");
    pub const REDIRECT_TARGET_UNKNOWN: Code = Code::new("W032");
}

pub mod writer {
    use super::Code;

    pub const OFFERING_WRITE_FAILED: Code = Code::new("E040");
}

pub mod reconcile {
    use super::Code;

    pub const INCOMPLETE_PASS: Code = Code::new("E050");
    pub const PASS_MISMATCH: Code = Code::new("E051");
    pub const SWEEP_FAILED: Code = Code::new("E052");
}

pub mod batch {
    use super::Code;

    pub const COURSE_FAILED: Code = Code::new("E060");
    pub const PROVIDER_FAILED: Code = Code::new("E061");
    pub const WORKER_PANICKED: Code = Code::new("E062");
    pub const BATCH_TOO_LARGE: Code = Code::new("E063");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const CORRECTIONS_LOADED: Code = Code::new("I002");

    pub const COURSE_PROCESSED: Code = Code::new("I010");
    pub const OFFERINGS_WRITTEN: Code = Code::new("I011");

    pub const PASS_STARTED: Code = Code::new("I020");
    pub const PASS_COMPLETED: Code = Code::new("I021");

    pub const SWEEP_COMPLETED: Code = Code::new("I030");
    pub const BATCH_COMPLETED: Code = Code::new("I040");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

type Entry = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const ENTRIES: &[Entry] = &[
    // code, category, severity, recoverable, requires_halt, description, action
    ("ERR001", "System", Severity::Critical, false, true,
        "Internal scraper error", "File a bug report with the failing catalog entry"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Logging or configuration initialization failure", "Check ORC_* environment variables"),

    ("E005", "Configuration", Severity::High, false, true,
        "Configuration file could not be read", "Check the path and its permissions"),
    ("E006", "Configuration", Severity::High, false, true,
        "Configuration file is not valid TOML", "Fix the TOML syntax or field types"),
    ("E007", "Configuration", Severity::High, false, true,
        "Configuration value out of range", "Use catalog shorthand such as 13F for terms"),

    ("E010", "Store", Severity::Medium, true, false,
        "Referenced record does not exist", "Re-run the pass; the record may have been swept"),
    ("E011", "Store", Severity::High, true, false,
        "Offering triple already exists", "Check for concurrent writers on the same course"),
    ("E012", "Store", Severity::High, true, false,
        "Store rejected the operation", "Check store availability and retry the course"),

    ("W020", "Classification", Severity::Low, true, false,
        "Description exceeds the token cap", "Raise max_tokens_per_description if legitimate"),
    ("W021", "Classification", Severity::Low, true, false,
        "Term shorthand not present in reference data", "Seed the missing term"),
    ("W022", "Classification", Severity::Low, true, false,
        "Accumulator cap reached, token dropped", "Inspect the description for runaway lists"),
    ("W023", "Classification", Severity::Low, true, false,
        "Compound token nested too deeply", "Inspect the description punctuation"),
    ("W024", "Classification", Severity::Low, true, false,
        "Too many topic fragments", "Raise max_topic_fragments if legitimate"),

    ("E030", "Corrections", Severity::High, false, true,
        "Correction rule table could not be loaded", "Fix the rule file"),
    ("E031", "Corrections", Severity::High, false, true,
        "Correction rule table too large", "Split or prune the rule file"),
    ("W032", "Corrections", Severity::Low, true, false,
        "Course redirect names an unknown course", "Add the course or fix the rule"),

    ("E040", "Writer", Severity::High, true, false,
        "Offering write failed", "The course was skipped; re-run it after fixing the store"),

    ("E050", "Reconcile", Severity::High, true, false,
        "Sweep refused: pass incomplete", "Process every course without failures first"),
    ("E051", "Reconcile", Severity::High, true, false,
        "Sweep refused: pass token does not match", "Use the token from the current pass"),
    ("E052", "Reconcile", Severity::Critical, false, true,
        "Sweep failed part way", "Inspect the store; touch tags may not be reset"),

    ("E060", "Batch", Severity::Medium, true, false,
        "Course failed during batch", "See the course error for details"),
    ("E061", "Batch", Severity::High, false, true,
        "Document provider failed", "Check the document source"),
    ("E062", "Batch", Severity::Critical, false, true,
        "Batch worker panicked", "File a bug report"),
    ("E063", "Batch", Severity::High, false, true,
        "Batch exceeds the course cap", "Split the catalog"),

    ("I001", "System", Severity::Low, true, false,
        "Logging initialized", "None"),
    ("I002", "Corrections", Severity::Low, true, false,
        "Correction rules loaded", "None"),
    ("I010", "Pipeline", Severity::Low, true, false,
        "Course description processed", "None"),
    ("I011", "Writer", Severity::Low, true, false,
        "Offerings written", "None"),
    ("I020", "Pipeline", Severity::Low, true, false,
        "Pass started", "None"),
    ("I021", "Pipeline", Severity::Low, true, false,
        "Pass completed", "Reconcile may now run"),
    ("I030", "Reconcile", Severity::Low, true, false,
        "Reconciliation sweep completed", "None"),
    ("I040", "Batch", Severity::Low, true, false,
        "Catalog batch completed", "None"),
];

fn registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    REGISTRY.get_or_init(|| {
        ENTRIES
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            configuration::CONFIG_PARSE_ERROR,
            store::DUPLICATE_OFFERING,
            classification::TOKEN_LIMIT_EXCEEDED,
            corrections::REDIRECT_TARGET_UNKNOWN,
            writer::OFFERING_WRITE_FAILED,
            reconcile::INCOMPLETE_PASS,
            batch::WORKER_PANICKED,
            success::SWEEP_COMPLETED,
        ];
        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_lookups() {
        assert_eq!(get_category("E011"), "Store");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E052"));
        assert!(is_recoverable("W020"));
        assert_eq!(get_description("nope"), "Unknown error");
        assert_eq!(get_category("nope"), "Unknown");
    }
}
