//! Settlement: folding replayed fills into net per-subaccount balance
//! updates for the subaccount ledger.

pub mod pending_updates;

pub use pending_updates::PendingUpdates;
