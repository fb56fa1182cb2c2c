//! # quill-sync
//!
//! The adaptive reconciliation scheduler: decides which mirrored projects
//! need a network round-trip, performs the minimal clone/pull work, steps
//! each project's backoff timer, and safely prunes clones that left the
//! tracked set.
//!
//! Call [`engine::full_sync_at`] for a manual pass over every tracked
//! project (with pruning), or [`engine::due_run_at`] for the scheduled
//! due-only pass.

pub mod backoff;
pub mod connectivity;
pub mod due;
pub mod engine;
pub mod error;
pub mod power;
pub mod prune;
pub mod status;

pub use engine::{Collaborators, RunReport};
pub use error::SyncError;
pub use power::RunKind;
pub use prune::PruneReport;
