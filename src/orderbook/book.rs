//! Per-market resting order book.
//!
//! ## Architecture
//!
//! Each [`ClobPair`](crate::types::ClobPair) gets one `Orderbook`, a hybrid
//! structure tuned for the matching loop:
//!
//! - **Slab**: pre-allocated storage for O(1) node operations
//! - **BTreeMap**: sorted price levels for O(log n) best bid/ask lookup
//! - **HashMap**: order identity to slab key, for O(1) cancel
//!
//! ## Price Ordering
//!
//! - **Bids** (buy orders): sorted high-to-low, best bid first
//! - **Asks** (sell orders): sorted low-to-high, best ask first
//!
//! FIFO within a level gives price-time priority.
//!
//! Besides the price levels, the book maintains per-subaccount indexes of
//! open orders and open reduce-only orders; reduce-only handling needs to
//! know whether a subaccount has opposing resting interest.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use slab::Slab;

use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{Order, OrderId, SubaccountId};

/// Resting order book for one market.
#[derive(Debug)]
pub struct Orderbook {
    /// Market this book belongs to.
    clob_pair_id: u32,

    /// Pre-allocated node storage.
    orders: Slab<OrderNode>,

    /// Bid levels, best (highest) first.
    bids: BTreeMap<Reverse<u64>, PriceLevel>,

    /// Ask levels, best (lowest) first.
    asks: BTreeMap<u64, PriceLevel>,

    /// Order identity to slab key.
    order_index: HashMap<OrderId, usize>,

    /// Open orders per subaccount.
    subaccount_open_orders: HashMap<SubaccountId, HashSet<OrderId>>,

    /// Open reduce-only orders per subaccount.
    subaccount_open_reduce_only: HashMap<SubaccountId, HashSet<OrderId>>,

    /// Total resting bid orders.
    bid_count: usize,

    /// Total resting ask orders.
    ask_count: usize,
}

impl Orderbook {
    /// Create an empty book for `clob_pair_id`.
    pub fn new(clob_pair_id: u32) -> Self {
        Self::with_capacity(clob_pair_id, 0)
    }

    /// Create a book with pre-allocated node capacity.
    pub fn with_capacity(clob_pair_id: u32, order_capacity: usize) -> Self {
        Self {
            clob_pair_id,
            orders: Slab::with_capacity(order_capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::with_capacity(order_capacity),
            subaccount_open_orders: HashMap::new(),
            subaccount_open_reduce_only: HashMap::new(),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Market this book belongs to.
    #[inline]
    pub fn clob_pair_id(&self) -> u32 {
        self.clob_pair_id
    }

    /// Pre-allocated node slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total resting orders on both sides.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of resting bid orders.
    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    /// Number of resting ask orders.
    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    /// Whether the book holds no orders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of bid price levels.
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels.
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest an order on the book.
    ///
    /// # Panics
    ///
    /// Panics if an order with the same identity is already resting, or the
    /// order belongs to a different market. Callers resolve replacements
    /// before the order reaches the book.
    pub fn add_order(&mut self, order: Order) -> usize {
        assert_eq!(
            order.order_id.clob_pair_id, self.clob_pair_id,
            "add_order: order {} belongs to another market",
            order.order_id,
        );
        assert!(
            !self.order_index.contains_key(&order.order_id),
            "add_order: order {} is already resting",
            order.order_id,
        );

        let order_id = order.order_id.clone();
        let subticks = order.subticks;
        let is_buy = order.is_buy();
        let reduce_only = order.reduce_only;
        let subaccount_id = order_id.subaccount_id.clone();

        let node = OrderNode::new(order);
        let key = self.orders.insert(node);

        self.order_index.insert(order_id.clone(), key);
        self.subaccount_open_orders
            .entry(subaccount_id.clone())
            .or_default()
            .insert(order_id.clone());
        if reduce_only {
            self.subaccount_open_reduce_only
                .entry(subaccount_id)
                .or_default()
                .insert(order_id);
        }

        if is_buy {
            let level = self
                .bids
                .entry(Reverse(subticks))
                .or_insert_with(|| PriceLevel::new(subticks));
            level.push_back(key, &mut self.orders);
            self.bid_count += 1;
        } else {
            let level = self
                .asks
                .entry(subticks)
                .or_insert_with(|| PriceLevel::new(subticks));
            level.push_back(key, &mut self.orders);
            self.ask_count += 1;
        }

        key
    }

    /// Remove a resting order by identity.
    ///
    /// Returns the removed order, or `None` if it was not resting.
    pub fn remove_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let key = *self.order_index.get(order_id)?;
        self.remove_order_by_key(key)
    }

    /// Remove a resting order by slab key.
    pub fn remove_order_by_key(&mut self, key: usize) -> Option<Order> {
        let node = self.orders.get(key)?;
        let subticks = node.subticks();
        let is_buy = node.order.is_buy();

        if is_buy {
            if let Some(level) = self.bids.get_mut(&Reverse(subticks)) {
                level.remove(key, &mut self.orders);
                self.bid_count -= 1;
                if level.is_empty() {
                    self.bids.remove(&Reverse(subticks));
                }
            }
        } else if let Some(level) = self.asks.get_mut(&subticks) {
            level.remove(key, &mut self.orders);
            self.ask_count -= 1;
            if level.is_empty() {
                self.asks.remove(&subticks);
            }
        }

        let order = self.orders.remove(key).order;
        self.unindex(&order);
        Some(order)
    }

    fn unindex(&mut self, order: &Order) {
        let order_id = &order.order_id;
        self.order_index.remove(order_id);

        let subaccount_id = &order_id.subaccount_id;
        if let Some(set) = self.subaccount_open_orders.get_mut(subaccount_id) {
            set.remove(order_id);
            if set.is_empty() {
                self.subaccount_open_orders.remove(subaccount_id);
            }
        }
        if order.reduce_only {
            if let Some(set) = self.subaccount_open_reduce_only.get_mut(subaccount_id) {
                set.remove(order_id);
                if set.is_empty() {
                    self.subaccount_open_reduce_only.remove(subaccount_id);
                }
            }
        }
    }

    /// Consume up to `quantums` from the resting order at `key`.
    ///
    /// Updates the level total and removes the order entirely when the fill
    /// exhausts it. Returns the amount actually consumed.
    pub fn fill_order(&mut self, key: usize, quantums: u64) -> u64 {
        let node = match self.orders.get_mut(key) {
            Some(node) => node,
            None => return 0,
        };
        let filled = node.fill(quantums);
        let subticks = node.subticks();
        let is_buy = node.order.is_buy();
        let exhausted = node.is_filled();

        if is_buy {
            if let Some(level) = self.bids.get_mut(&Reverse(subticks)) {
                level.reduce_quantums(filled);
            }
        } else if let Some(level) = self.asks.get_mut(&subticks) {
            level.reduce_quantums(filled);
        }

        if exhausted {
            self.remove_order_by_key(key);
        }
        filled
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resting node by slab key.
    #[inline]
    pub fn node(&self, key: usize) -> Option<&OrderNode> {
        self.orders.get(key)
    }

    /// Resting order by identity.
    #[inline]
    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        let key = *self.order_index.get(order_id)?;
        self.orders.get(key).map(|node| &node.order)
    }

    /// Remaining size of a resting order in base quantums.
    #[inline]
    pub fn get_remaining(&self, order_id: &OrderId) -> Option<u64> {
        let key = *self.order_index.get(order_id)?;
        self.orders.get(key).map(OrderNode::remaining)
    }

    /// Slab key for a resting order.
    #[inline]
    pub fn get_key(&self, order_id: &OrderId) -> Option<usize> {
        self.order_index.get(order_id).copied()
    }

    /// Whether an order is resting.
    #[inline]
    pub fn contains_order(&self, order_id: &OrderId) -> bool {
        self.order_index.contains_key(order_id)
    }

    /// Open orders of a subaccount, unordered.
    pub fn subaccount_open_orders(&self, subaccount_id: &SubaccountId) -> impl Iterator<Item = &OrderId> {
        self.subaccount_open_orders
            .get(subaccount_id)
            .into_iter()
            .flatten()
    }

    /// Whether a subaccount has any open reduce-only orders.
    pub fn has_open_reduce_only_orders(&self, subaccount_id: &SubaccountId) -> bool {
        self.subaccount_open_reduce_only
            .get(subaccount_id)
            .is_some_and(|set| !set.is_empty())
    }

    /// Open reduce-only orders of a subaccount, unordered.
    pub fn subaccount_open_reduce_only_orders(
        &self,
        subaccount_id: &SubaccountId,
    ) -> impl Iterator<Item = &OrderId> {
        self.subaccount_open_reduce_only
            .get(subaccount_id)
            .into_iter()
            .flatten()
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Best (highest) bid price in subticks.
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price in subticks.
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// Spread in subticks. `None` when either side is empty or the book is
    /// crossed.
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Mid price in subticks: `bid + (ask - bid) / 2`, rounded down.
    /// `None` when either side is empty or the book is crossed.
    pub fn mid_price(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(bid + (ask - bid) / 2),
            _ => None,
        }
    }

    /// Best bid level.
    pub fn best_bid_level(&self) -> Option<&PriceLevel> {
        self.bids.values().next()
    }

    /// Best ask level.
    pub fn best_ask_level(&self) -> Option<&PriceLevel> {
        self.asks.values().next()
    }

    /// Slab key of the highest-priority maker opposing a taker.
    ///
    /// For a buying taker that is the head of the best ask level; for a
    /// selling taker, the head of the best bid level.
    pub fn best_maker_key(&self, taker_is_buy: bool) -> Option<usize> {
        if taker_is_buy {
            self.best_ask_level().and_then(PriceLevel::peek_head)
        } else {
            self.best_bid_level().and_then(PriceLevel::peek_head)
        }
    }

    /// Whether a taker at `subticks` crosses the opposing side's best price.
    pub fn crosses(&self, taker_is_buy: bool, subticks: u64) -> bool {
        if taker_is_buy {
            self.best_ask().is_some_and(|ask| subticks >= ask)
        } else {
            self.best_bid().is_some_and(|bid| subticks <= bid)
        }
    }

    /// Total resting size a taker at `limit_subticks` could cross against,
    /// excluding orders of `exclude` (a subaccount never fills itself).
    ///
    /// Read-only; used to pre-check fill-or-kill takers before mutating
    /// the book.
    pub fn fillable_quantums(
        &self,
        taker_is_buy: bool,
        limit_subticks: u64,
        exclude: &SubaccountId,
    ) -> u128 {
        let mut total: u128 = 0;
        let mut sum_level = |level: &PriceLevel| {
            let mut cursor = level.head;
            while let Some(key) = cursor {
                let node = &self.orders[key];
                if &node.order_id().subaccount_id != exclude {
                    total += u128::from(node.remaining());
                }
                cursor = node.next;
            }
        };

        if taker_is_buy {
            for (&subticks, level) in &self.asks {
                if subticks > limit_subticks {
                    break;
                }
                sum_level(level);
            }
        } else {
            for (&Reverse(subticks), level) in &self.bids {
                if subticks < limit_subticks {
                    break;
                }
                sum_level(level);
            }
        }
        total
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    /// Drop every resting order.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
        self.subaccount_open_orders.clear();
        self.subaccount_open_reduce_only.clear();
        self.bid_count = 0;
        self.ask_count = 0;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
