//! Untriggered conditional order tracking.
//!
//! Conditional orders sit outside the book until the oracle price reaches
//! their trigger. Two buckets exist, by trigger direction:
//!
//! - **at-or-above**: stop-loss buys and take-profit sells, triggered when
//!   the oracle price rises to or past the trigger. Polled lowest trigger
//!   first.
//! - **at-or-below**: take-profit buys and stop-loss sells, triggered when
//!   the oracle price falls to or past the trigger. Polled highest trigger
//!   first.
//!
//! Both buckets order entries by `(trigger_subticks, order_hash)`. The
//! hash tie-break is part of the deterministic contract: every node polls
//! equal-trigger orders in the same sequence.

use std::collections::{BTreeMap, HashMap};

use crate::types::{ConditionType, Order, OrderHash, OrderId, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerDirection {
    AtOrAbove,
    AtOrBelow,
}

fn trigger_direction(order: &Order) -> TriggerDirection {
    match (order.condition_type, order.side) {
        (ConditionType::StopLoss, Side::Buy) | (ConditionType::TakeProfit, Side::Sell) => {
            TriggerDirection::AtOrAbove
        }
        (ConditionType::TakeProfit, Side::Buy) | (ConditionType::StopLoss, Side::Sell) => {
            TriggerDirection::AtOrBelow
        }
        (ConditionType::Unspecified, _) => {
            panic!(
                "trigger_direction: order {} is not conditional",
                order.order_id
            )
        }
    }
}

/// Conditional orders waiting on their trigger price.
#[derive(Debug, Default)]
pub struct UntriggeredConditionalOrders {
    /// Triggered when oracle >= trigger; polled ascending.
    at_or_above: BTreeMap<(u64, OrderHash), Order>,

    /// Triggered when oracle <= trigger; polled descending.
    at_or_below: BTreeMap<(u64, OrderHash), Order>,

    /// Identity to bucket key, for removal.
    index: HashMap<OrderId, (TriggerDirection, (u64, OrderHash))>,
}

impl UntriggeredConditionalOrders {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of untriggered orders across both buckets.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no orders are waiting.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether an order is waiting on its trigger.
    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    /// Track an untriggered conditional order.
    ///
    /// # Panics
    ///
    /// Panics if the order is not conditional or is already tracked; the
    /// caller routes each conditional placement here exactly once.
    pub fn add(&mut self, order: Order) {
        let direction = trigger_direction(&order);
        let key = (order.conditional_order_trigger_subticks, order.order_hash());

        assert!(
            !self.index.contains_key(&order.order_id),
            "add: conditional order {} is already tracked",
            order.order_id,
        );

        self.index.insert(order.order_id.clone(), (direction, key));
        match direction {
            TriggerDirection::AtOrAbove => self.at_or_above.insert(key, order),
            TriggerDirection::AtOrBelow => self.at_or_below.insert(key, order),
        };
    }

    /// Stop tracking an order, returning it if it was waiting.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let (direction, key) = self.index.remove(order_id)?;
        match direction {
            TriggerDirection::AtOrAbove => self.at_or_above.remove(&key),
            TriggerDirection::AtOrBelow => self.at_or_below.remove(&key),
        }
    }

    /// Pop every order triggered by the given oracle price.
    ///
    /// At-or-above orders come out ascending by `(trigger, hash)`, then
    /// at-or-below orders descending; within either bucket the hash breaks
    /// ties deterministically.
    pub fn poll_triggered_order_ids(&mut self, oracle_price_subticks: u64) -> Vec<OrderId> {
        let mut triggered = Vec::new();

        let above_keys: Vec<(u64, OrderHash)> = self
            .at_or_above
            .range(..=(oracle_price_subticks, OrderHash([u8::MAX; 32])))
            .map(|(&key, _)| key)
            .collect();
        for key in above_keys {
            let order = self.at_or_above.remove(&key).expect("key from range");
            self.index.remove(&order.order_id);
            triggered.push(order.order_id);
        }

        let below_keys: Vec<(u64, OrderHash)> = self
            .at_or_below
            .range((oracle_price_subticks, OrderHash([0u8; 32]))..)
            .rev()
            .map(|(&key, _)| key)
            .collect();
        for key in below_keys {
            let order = self.at_or_below.remove(&key).expect("key from range");
            self.index.remove(&order.order_id);
            triggered.push(order.order_id);
        }

        triggered
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
