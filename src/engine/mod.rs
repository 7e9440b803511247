//! Matching engine: match validation, the speculative matching walk, and
//! conditional order triggering.
//!
//! ## Components
//!
//! - [`Match`]: stateless validation of one (maker, taker, fill) triple
//! - [`MatchingEngine`]: price-time-priority walk against an
//!   [`Orderbook`](crate::orderbook::Orderbook), with per-fill
//!   collateralization checks through the ledger seam
//! - [`UntriggeredConditionalOrders`]: trigger-price buckets for
//!   conditional orders not yet eligible to enter the book
//!
//! The proposer matches speculatively through [`MatchingEngine`]; every
//! validator replays the resulting operations queue through the same code,
//! which is what keeps the replayed book bit-identical to the proposer's.

pub mod conditional;
pub mod matching;

pub use conditional::UntriggeredConditionalOrders;
pub use matching::{Match, MatchResult, MatchingEngine};
