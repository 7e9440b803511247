//! Price level: all resting orders at one subticks price.
//!
//! ## Queue Structure
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! - New orders are appended at the tail
//! - Matching consumes orders from the head
//! - Any order can be removed in O(1) given its slab key
//!
//! The order data itself lives in the book's slab; a `PriceLevel` holds
//! only queue metadata.

use slab::Slab;

use crate::orderbook::OrderNode;

/// FIFO queue of resting orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price of this level in subticks.
    pub subticks: u64,

    /// Total unfilled size at this level in base quantums.
    pub total_quantums: u64,

    /// Oldest order (matched first), slab key.
    pub head: Option<usize>,

    /// Newest order (appended last), slab key.
    pub tail: Option<usize>,

    /// Number of resting orders at this level.
    pub order_count: usize,
}

impl PriceLevel {
    /// Create an empty level at `subticks`.
    pub fn new(subticks: u64) -> Self {
        Self {
            subticks,
            total_quantums: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    /// Whether the level holds no orders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order at the tail, preserving time priority.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present in the slab.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let node = slab.get_mut(key).expect("invalid slab key");
        let quantums = node.remaining();

        node.prev = self.tail;
        node.next = None;

        if let Some(tail_key) = self.tail {
            let tail_node = slab.get_mut(tail_key).expect("invalid tail key");
            tail_node.next = Some(key);
        } else {
            self.head = Some(key);
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantums = self.total_quantums.saturating_add(quantums);
    }

    /// Unlink an order from anywhere in the queue.
    ///
    /// Returns the removed order's remaining size in base quantums.
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> u64 {
        let node = slab.get(key).expect("invalid slab key");
        let quantums = node.remaining();
        let prev_key = node.prev;
        let next_key = node.next;

        if let Some(prev) = prev_key {
            let prev_node = slab.get_mut(prev).expect("invalid prev key");
            prev_node.next = next_key;
        } else {
            self.head = next_key;
        }

        if let Some(next) = next_key {
            let next_node = slab.get_mut(next).expect("invalid next key");
            next_node.prev = prev_key;
        } else {
            self.tail = prev_key;
        }

        let node = slab.get_mut(key).expect("invalid slab key");
        node.prev = None;
        node.next = None;

        self.order_count -= 1;
        self.total_quantums = self.total_quantums.saturating_sub(quantums);

        quantums
    }

    /// Slab key of the oldest order, the next to match.
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Account for a partial fill of an order in this level.
    pub fn reduce_quantums(&mut self, filled_quantums: u64) {
        self.total_quantums = self.total_quantums.saturating_sub(filled_quantums);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
