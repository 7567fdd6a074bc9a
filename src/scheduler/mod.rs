//! Proposal Scheduling Module
//!
//! This module builds the proposer's block during PrepareProposal:
//! - The batch committed one round earlier is echoed, in order, after the
//!   commitment slot, up to the byte budget
//! - Mempool candidates become the new commitment for the next height
//!
//! Transactions are never executed in the round in which a proposer first
//! sees them, which removes the proposer's last look at their content.

mod scheduler;
mod packing;

#[cfg(test)]
mod tests;

pub use scheduler::{ProposalRequest, Scheduler};
pub use packing::{filter_committed, inject_and_resize, total_bytes};
