//! Batch Finalization Module
//!
//! This module handles everything that happens once a block is canonical:
//! - Committer: dequeues the batch due for execution and queues the one the
//!   finalized block announced
//! - FeatureFlags: tells the committer where the commitment slot sits
//! - BatchOrchestrator: drives the three consensus callbacks over one store

mod committer;
mod flags;
pub mod orchestrator;

pub use committer::Committer;
pub use flags::{FeatureFlags, NoVoteExtensions, VoteExtensionSchedule};
pub use orchestrator::BatchOrchestrator;
