//! This crate implements a delayed-commit transaction ordering pipeline for a
//! block-producing validator. A proposer commits in one block to the exact
//! transactions the next block must execute, so it never gets a last look at
//! transaction content before ordering it.

pub mod types; // Batch, verdicts and errors shared by every stage.
pub mod codec; // Deterministic batch encoding.
pub mod store; // Height-keyed batch storage over a key-value backend.
pub mod scheduler; // PrepareProposal: echo the due batch, commit the next one.
pub mod validation; // ProcessProposal: verify a received proposal.
pub mod batch; // PreBlock: dequeue for execution, queue the announced batch.
pub mod api; // JSON-RPC surface for the consensus engine.
pub mod config; // Defines and loads node configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use batch::BatchOrchestrator;
