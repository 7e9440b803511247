//! # perp-clob
//!
//! Deterministic order-matching and block-proposal core for a
//! decentralized perpetuals exchange.
//!
//! Every validator must derive the *same* sequence of fills,
//! cancellations, and removals from a block's transactions, because that
//! sequence determines account balances. The crate is therefore built
//! around reproducibility rather than raw speed: canonical SSZ encodings
//! hashed with SHA-256, integer-only quantum arithmetic, and a nonce
//! discipline that makes the proposed operations queue tamper-evident.
//!
//! ## Architecture
//!
//! - **Types**: orders, identities, markets, operations, and their
//!   canonical hashes
//! - **OrderBook**: price-time-priority CLOB with slab-based storage
//! - **Engine**: match validation, the speculative matching walk, and
//!   conditional order triggering
//! - **Proposal**: the operations-to-propose sequencer and the stateless
//!   replay validator every other node runs
//! - **Settlement**: folding replayed fills into net balance updates
//! - **Offchain**: the batched indexer notification side channel
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical inputs produce bit-identical queues and
//!    books on every node
//! 2. **No Floating Point**: consensus math is u64/u128 integer only;
//!    decimals appear solely in display helpers
//! 3. **Pre-allocated Memory**: slab allocation for O(1) order operations
//! 4. **Typed failure split**: recoverable validation errors are
//!    [`ClobError`]; broken sequencing invariants panic in `must_*` paths

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: orders, markets, operations, canonical hashing
pub mod types;

/// Order book: CLOB with slab-based storage
pub mod orderbook;

/// Matching engine: match validation, speculative matching, triggers
pub mod engine;

/// Block proposal: operations sequencer and replay validation
pub mod proposal;

/// Settlement: pending balance-update aggregation
pub mod settlement;

/// Off-chain indexer notification batching
pub mod offchain;

/// Collaborator seams: subaccount ledger, pricing, stateful order storage
pub mod interfaces;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{Match, MatchResult, MatchingEngine, UntriggeredConditionalOrders};
pub use interfaces::{InMemoryLedger, SubaccountBalanceUpdate, SubaccountLedger, UpdateResult};
pub use offchain::OffchainUpdates;
pub use orderbook::{OrderNode, Orderbook, PriceLevel};
pub use proposal::{validate_operations_queue, OperationsToPropose};
pub use settlement::PendingUpdates;
pub use types::{
    ClobError, ClobPair, InternalOperation, LiquidationOrder, MatchableOrder, Order, OrderId,
    OrderStatus, Side, SubaccountId,
};
