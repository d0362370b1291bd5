// Internal modules
pub mod batch;
pub mod config;
pub mod corrections;
#[macro_use]
pub mod logging;
pub mod machine;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod store;
pub mod tokens;
pub mod writer;

// Re-export key types for library consumers
pub use batch::{run_catalog_pass, BatchConfig, BatchError, BatchResults};
pub use corrections::CorrectionTable;
pub use model::{Course, Department, Hour, Offering, Season, Term};
pub use pipeline::{CompletedPass, CourseError, CourseOutcome, OfferingScraper, ReconcileError};
pub use reconcile::{ProtectedWindow, SweepReport};

// Re-export the collaborator surface
pub use store::{CatalogStore, DocumentProvider, MemoryStore, OfferingStore, ReferenceData};
