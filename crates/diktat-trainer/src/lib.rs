//! Diktat trainer crate - answer comparison and session progress.
//!
//! Provides the word-level comparator, the result aggregation, and the
//! progress tracker that walks one run of a dictation through a strict state
//! machine: Idle -> InProgress -> AwaitingAdvance -> Completed -> Idle.
//! Everything here is synchronous and CPU-bound.

pub mod compare;
pub mod state;
pub mod summary;
pub mod tracker;

pub use compare::{compare, tokenize, Comparison};
pub use state::RunState;
pub use summary::summarize;
pub use tracker::{CompletedRun, ProgressTracker, Run};
