//! Off-chain notification side channel: batched, condensable book-change
//! messages for external indexers.

pub mod updates;

pub use updates::{OffchainMessage, OffchainUpdates};
