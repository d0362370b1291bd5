use crate::config::ConfigError;
use crate::corrections::CorrectionError;
use crate::logging::codes::{self, Code};
use crate::machine::MachineFault;
use crate::model::Course;
use crate::store::StoreError;

/// Failure of one course. Other courses of the pass are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Reference lookup failed for {course}: {source}")]
    Lookup {
        course: String,
        #[source]
        source: StoreError,
    },

    #[error("Offering write failed for {course}: {source}")]
    Write {
        course: String,
        #[source]
        source: StoreError,
    },
}

impl CourseError {
    pub(crate) fn from_fault(course: &Course, fault: MachineFault) -> Self {
        match fault {
            MachineFault::Lookup(source) => Self::Lookup {
                course: course.label(),
                source,
            },
            MachineFault::Write(source) => Self::Write {
                course: course.label(),
                source,
            },
        }
    }

    pub fn course(&self) -> &str {
        match self {
            Self::Lookup { course, .. } | Self::Write { course, .. } => course,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Lookup { source, .. } => source.error_code(),
            Self::Write { .. } => codes::writer::OFFERING_WRITE_FAILED,
        }
    }
}

/// Refusals and failures of the end-of-pass sweep
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("No pass is active")]
    NoActivePass,

    #[error("Pass incomplete: {processed} of {expected} courses processed, {failed} failed")]
    IncompletePass {
        processed: usize,
        expected: usize,
        failed: usize,
    },

    #[error("Pass {presented} is not the active pass")]
    PassMismatch {
        active: Option<u64>,
        presented: u64,
    },

    #[error("Sweep failed: {0}")]
    Store(#[from] StoreError),
}

impl ReconcileError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::NoActivePass | Self::IncompletePass { .. } => codes::reconcile::INCOMPLETE_PASS,
            Self::PassMismatch { .. } => codes::reconcile::PASS_MISMATCH,
            Self::Store(_) => codes::reconcile::SWEEP_FAILED,
        }
    }
}

/// Failures building a scraper from runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Correction table error: {0}")]
    Corrections(#[from] CorrectionError),
}

impl SetupError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Corrections(e) => e.error_code(),
        }
    }
}
