//! Resting order book.
//!
//! ## Architecture
//!
//! One [`Orderbook`] per market, built from:
//!
//! - **Slab-based storage**: O(1) node insertion, removal, and lookup
//! - **Price levels**: orders grouped by subticks price in BTreeMaps
//! - **Price-time priority**: FIFO ordering within each price level
//!
//! ## Components
//!
//! - [`OrderNode`]: a resting order plus its remaining size and linked-list
//!   pointers
//! - [`PriceLevel`]: the FIFO queue at a single price
//! - [`Orderbook`]: both sides of the book with identity and subaccount
//!   indexes
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order | O(log n) |
//! | Remove order by key | O(1) |
//! | Cancel order by identity | O(1) |
//! | Best bid/ask | O(1)* |
//!
//! *After initial lookup, cached at price level head

pub mod book;
pub mod level;
pub mod node;

pub use book::Orderbook;
pub use level::PriceLevel;
pub use node::OrderNode;
