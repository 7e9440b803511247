//! Off-chain update batching for the indexing side channel.
//!
//! Matching and replay emit ordered batches of book-change messages for
//! off-chain consumers. The batch is write-side only: messages append in
//! emission order and batches merge by concatenation. Before a replay pass
//! re-derives the book, the accumulated batch is condensed per order
//! identity, because replay will regenerate placement messages itself and
//! only the final known state of each order is worth forwarding.

use std::collections::HashMap;

use crate::types::{Order, OrderId, RemovalReason};

/// One book-change message destined for off-chain consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffchainMessage {
    /// An order entered the book.
    Place { order: Order },

    /// An order's filled amount changed.
    Update {
        order_id: OrderId,
        total_filled_quantums: u64,
    },

    /// An order left the book.
    Remove {
        order_id: OrderId,
        reason: RemovalReason,
    },

    /// An order was atomically replaced by a new revision.
    Replace { order: Order },
}

impl OffchainMessage {
    /// Identity the message is keyed by.
    pub fn order_id(&self) -> &OrderId {
        match self {
            OffchainMessage::Place { order } | OffchainMessage::Replace { order } => &order.order_id,
            OffchainMessage::Update { order_id, .. } | OffchainMessage::Remove { order_id, .. } => {
                order_id
            }
        }
    }

    /// Whether the message (re-)places the order, meaning replay will
    /// regenerate it.
    fn is_placement(&self) -> bool {
        matches!(
            self,
            OffchainMessage::Place { .. } | OffchainMessage::Replace { .. }
        )
    }
}

/// An ordered batch of off-chain messages.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OffchainUpdates {
    messages: Vec<OffchainMessage>,
}

impl OffchainUpdates {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the batch holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in emission order.
    pub fn messages(&self) -> &[OffchainMessage] {
        &self.messages
    }

    /// Emit a placement message.
    pub fn add_place_message(&mut self, order: Order) {
        self.messages.push(OffchainMessage::Place { order });
    }

    /// Emit a fill-amount update message.
    pub fn add_update_message(&mut self, order_id: OrderId, total_filled_quantums: u64) {
        self.messages.push(OffchainMessage::Update {
            order_id,
            total_filled_quantums,
        });
    }

    /// Emit a removal message.
    pub fn add_remove_message(&mut self, order_id: OrderId, reason: RemovalReason) {
        self.messages.push(OffchainMessage::Remove { order_id, reason });
    }

    /// Emit a replacement message.
    pub fn add_replace_message(&mut self, order: Order) {
        self.messages.push(OffchainMessage::Replace { order });
    }

    /// Merge another batch onto the end of this one, preserving order.
    pub fn append(&mut self, other: OffchainUpdates) {
        self.messages.extend(other.messages);
    }

    /// Condense the batch ahead of a replay pass.
    ///
    /// Per order identity, only the final message can still matter. A
    /// final placement-kind message is dropped entirely: replay will
    /// re-derive and re-announce the placement itself. Otherwise the last
    /// message survives. Survivors keep their relative order.
    pub fn condense_for_replay(&mut self) {
        let mut last_index: HashMap<OrderId, usize> = HashMap::new();
        for (index, message) in self.messages.iter().enumerate() {
            last_index.insert(message.order_id().clone(), index);
        }

        let messages = std::mem::take(&mut self.messages);
        self.messages = messages
            .into_iter()
            .enumerate()
            .filter_map(|(index, message)| {
                if last_index[message.order_id()] != index || message.is_placement() {
                    None
                } else {
                    Some(message)
                }
            })
            .collect();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderExpiration, Side, SubaccountId, ORDER_FLAGS_SHORT_TERM};

    fn order(client_id: u32) -> Order {
        Order::new(
            OrderId::new(SubaccountId::new("alice", 0), client_id, ORDER_FLAGS_SHORT_TERM, 0),
            Side::Buy,
            100,
            50,
            OrderExpiration::GoodTilBlock(10),
        )
    }

    #[test]
    fn test_append_preserves_order() {
        let a = order(1);
        let b = order(2);

        let mut batch = OffchainUpdates::new();
        batch.add_place_message(a.clone());

        let mut other = OffchainUpdates::new();
        other.add_update_message(b.order_id.clone(), 40);
        other.add_remove_message(a.order_id.clone(), RemovalReason::FullyFilled);

        batch.append(other);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.messages()[0], OffchainMessage::Place { order: a.clone() });
        assert_eq!(
            batch.messages()[2],
            OffchainMessage::Remove {
                order_id: a.order_id,
                reason: RemovalReason::FullyFilled
            }
        );
    }

    #[test]
    fn test_condense_terminal_placement_suppresses_identity() {
        let a = order(1);

        // Place only: replay regenerates it, nothing survives.
        let mut batch = OffchainUpdates::new();
        batch.add_place_message(a.clone());
        batch.condense_for_replay();
        assert!(batch.is_empty());

        // Remove then place: the terminal placement still wins.
        let mut batch = OffchainUpdates::new();
        batch.add_remove_message(a.order_id.clone(), RemovalReason::Undercollateralized);
        batch.add_place_message(a.clone());
        batch.condense_for_replay();
        assert!(batch.is_empty());

        // Update then replace: same.
        let mut batch = OffchainUpdates::new();
        batch.add_update_message(a.order_id.clone(), 40);
        batch.add_replace_message(a);
        batch.condense_for_replay();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_condense_last_non_placement_wins() {
        let a = order(1);

        // Place then remove: the removal survives.
        let mut batch = OffchainUpdates::new();
        batch.add_place_message(a.clone());
        batch.add_remove_message(a.order_id.clone(), RemovalReason::FullyFilled);
        batch.condense_for_replay();
        assert_eq!(
            batch.messages(),
            &[OffchainMessage::Remove {
                order_id: a.order_id.clone(),
                reason: RemovalReason::FullyFilled
            }]
        );

        // Place, update, update: the last update survives.
        let mut batch = OffchainUpdates::new();
        batch.add_place_message(a.clone());
        batch.add_update_message(a.order_id.clone(), 20);
        batch.add_update_message(a.order_id.clone(), 60);
        batch.condense_for_replay();
        assert_eq!(
            batch.messages(),
            &[OffchainMessage::Update {
                order_id: a.order_id,
                total_filled_quantums: 60
            }]
        );
    }

    #[test]
    fn test_condense_multiple_identities_keep_relative_order() {
        let a = order(1);
        let b = order(2);
        let c = order(3);

        let mut batch = OffchainUpdates::new();
        batch.add_place_message(a.clone());
        batch.add_place_message(b.clone());
        batch.add_update_message(b.order_id.clone(), 10);
        batch.add_remove_message(a.order_id.clone(), RemovalReason::FullyFilled);
        batch.add_place_message(c.clone());

        batch.condense_for_replay();

        // b's update came before a's removal; c's terminal placement is
        // suppressed.
        assert_eq!(
            batch.messages(),
            &[
                OffchainMessage::Update {
                    order_id: b.order_id,
                    total_filled_quantums: 10
                },
                OffchainMessage::Remove {
                    order_id: a.order_id,
                    reason: RemovalReason::FullyFilled
                },
            ]
        );
    }
}
