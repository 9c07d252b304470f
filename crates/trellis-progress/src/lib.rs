//! # trellis-progress
//!
//! The progress engine for the Trellis course platform.
//!
//! This crate provides:
//! - `Identity` and `IdentityProvider` (current learner, guest default)
//! - `ProgressStore` (per-identity snapshot + the completion cascade)
//! - `ProgressService` (composition root: storage + identity + store +
//!   observer notifications)
//!
//! ## Data flow
//!
//! ```text
//! identity change
//!     ↓  exactly one initialize_for_user
//! ProgressStore snapshot (deep copy of the catalog, or persisted state)
//!     ↓  complete_challenge / complete_stage / complete_lesson
//! cascade: challenge → lesson → module → dependent module
//!     ↓  persist under progress_key(identity)
//! observers notified / presentation re-reads
//! ```
//!
//! All operations are synchronous and atomic per call. The engine is the
//! sole writer of each identity's storage key.

pub mod identity;
pub mod service;
pub mod store;

pub use identity::{IDENTITY_STORAGE_KEY, Identity, IdentityProvider};
pub use service::{ProgressObserver, ProgressService};
pub use store::{MutationOutcome, PROGRESS_KEY_PREFIX, ProgressStore, progress_key};
