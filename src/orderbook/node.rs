//! Resting order node for slab-based storage.
//!
//! ## Design
//!
//! `OrderNode` wraps a resting [`Order`] with the book-local remaining
//! size and doubly-linked list pointers for its price level. The `Order`
//! itself is immutable consensus data; everything mutable about a resting
//! order lives here.
//!
//! ## Slab Integration
//!
//! Keys are `usize` values returned by `slab.insert()` and may be reused
//! after `slab.remove()`. Insert, remove, and lookup are all O(1).
//!
//! ## Linked List
//!
//! Orders at the same price level form a doubly-linked FIFO:
//! - `next`: the next (newer) order in the level
//! - `prev`: the previous (older) order in the level
//!
//! This allows O(1) removal from anywhere in the list.

use crate::types::{Order, OrderId};

/// A resting order stored in the slab.
///
/// The pointers are slab keys (`usize`), not direct references.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The order as placed.
    pub order: Order,

    /// Unfilled size in base quantums. Starts at `order.quantums` and
    /// only decreases.
    pub remaining_quantums: u64,

    /// Next (newer) order in the price level, slab key.
    pub next: Option<usize>,

    /// Previous (older) order in the price level, slab key.
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Wrap an order, not yet linked into any level.
    #[inline]
    pub fn new(order: Order) -> Self {
        let remaining_quantums = order.quantums;
        Self {
            order,
            remaining_quantums,
            next: None,
            prev: None,
        }
    }

    /// Whether this node is not linked into any price level.
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    /// Identity of the resting order.
    #[inline]
    pub fn order_id(&self) -> &OrderId {
        &self.order.order_id
    }

    /// Resting price in subticks.
    #[inline]
    pub fn subticks(&self) -> u64 {
        self.order.subticks
    }

    /// Unfilled size in base quantums.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining_quantums
    }

    /// Consume up to `quantums` of the remaining size.
    ///
    /// Returns the amount actually consumed.
    #[inline]
    pub fn fill(&mut self, quantums: u64) -> u64 {
        let filled = quantums.min(self.remaining_quantums);
        self.remaining_quantums -= filled;
        filled
    }

    /// Whether the resting order is fully filled.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_quantums == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
