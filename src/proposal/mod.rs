//! Block proposal: the operations-to-propose sequencer and the stateless
//! replay validator.
//!
//! The proposer records its speculative matching results through
//! [`OperationsToPropose`], which enforces the nonce discipline that makes
//! the emitted queue tamper-evident. Every other validator runs
//! [`validate_operations_queue`] over the received queue before replaying
//! it; both sides then replay through the same matching code to reach
//! identical state.

pub mod operations;
pub mod replay;

pub use operations::{Nonce, OperationsToPropose};
pub use replay::validate_operations_queue;
