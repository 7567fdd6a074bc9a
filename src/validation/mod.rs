//! Proposal Validation Module
//!
//! This module verifies a received proposal during ProcessProposal.
//! It checks the echoed transactions against the batch committed one round
//! earlier, and the injected commitment against the proposal's proposer.

mod validator;
pub use validator::{ProcessRequest, Validator};
