//! API Module
//!
//! This module exposes the consensus callbacks over JSON-RPC so the consensus
//! engine can drive the pipeline from another process.

mod server;
pub use server::Server;
