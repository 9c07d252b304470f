//! # trellis-catalog
//!
//! Course structure layer for the Trellis progress engine.
//!
//! This crate provides:
//! - `Module`, `Lesson`, `Challenge` types (the course definables)
//! - `Stage` content units (explanations and graded exercises)
//! - `Catalog`: the immutable baseline, loadable from JSON or TOML
//! - Structural validation reports for authored catalogs
//! - A built-in sample catalog for tests and demos
//!
//! It intentionally carries no progress state of its own. Per-learner
//! snapshots and the completion cascade live in `trellis-progress`.
//!
//! ## Data model
//!
//! ```text
//! Catalog (immutable baseline)
//!     ↓  snapshot() deep copy
//! Vec<Module> (per-learner progress snapshot, owned by the engine)
//! ```

pub mod catalog;
pub mod check;
pub mod model;
pub mod sample;
pub mod stage;

pub use catalog::{Catalog, CatalogError};
pub use check::{
    CATALOG_CHECK_KIND, CatalogCheckReport, CatalogFinding, CatalogSummary,
    FAILURE_CLASS_DEPENDS_ON_MISSING, FAILURE_CLASS_DEPENDS_ON_SELF,
    FAILURE_CLASS_DUPLICATE_CHALLENGE_ID, FAILURE_CLASS_DUPLICATE_LESSON_ID,
    FAILURE_CLASS_DUPLICATE_MODULE_ID, FAILURE_CLASS_DUPLICATE_STAGE_ID,
    FAILURE_CLASS_SOLUTION_PATTERN_INVALID, check_catalog,
};
pub use model::{Challenge, Lesson, Module, PlayState, Status};
pub use sample::sample_catalog;
pub use stage::{Solution, SolutionError, Stage};
