//! The operations-to-propose sequencer.
//!
//! A block proposer assembles its operations queue through this builder.
//! Two collections carry the ordering discipline:
//!
//! - `operation_hash_to_nonce`: operation hash to a monotonically
//!   increasing nonce, assigned once per operation per block.
//! - `nonce_to_operation`: the queue itself, keyed by nonce; materialized
//!   ascending.
//!
//! Placements are nonce-assigned first (when the order passes its
//! collateralization check) and inserted later (when the order actually
//! matters to the block), so nonces in the emitted queue need not be
//! contiguous — but the emitted order is always ascending nonce order,
//! which is what makes the queue tamper-evident: reordering placements
//! changes nonces, and replaying validators recompute every hash
//! independently.
//!
//! Misuse of the builder (double nonce assignment, inserting before
//! assigning, matching over unqueued orders) means the sequencing
//! discipline is already broken; those paths panic rather than return.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{
    maker_fills_with_orders_to_maker_fills, order_placement_operation_hash, CancelOrder,
    InternalOperation, MakerFillWithOrder, MatchableOrder, OperationHash, OperationRaw, Order,
    OrderHash, OrderId, OrderRemoval,
};

/// Position of one operation in the proposed queue.
pub type Nonce = u64;

/// Builder for one block's operations queue.
#[derive(Debug, Default)]
pub struct OperationsToPropose {
    /// The queue, keyed by nonce; ascending iteration is the emitted order.
    nonce_to_operation: BTreeMap<Nonce, InternalOperation>,

    /// Operation hash to its assigned nonce.
    operation_hash_to_nonce: HashMap<OperationHash, Nonce>,

    /// Next nonce to hand out.
    next_available_nonce: Nonce,

    /// Hashes of orders whose placements are already queued. Matches may
    /// only reference orders in this set.
    order_hashes_in_operations_queue: HashSet<OrderHash>,

    /// Original signed transaction bytes of short-term placements, keyed
    /// by order hash. Survives queue clears: a resting short-term order
    /// can match blocks after it was placed.
    short_term_order_hash_to_tx_bytes: HashMap<OrderHash, Vec<u8>>,

    /// Full orders referenced by queued matches.
    matched_order_id_to_order: HashMap<OrderId, Order>,

    /// Identities with a queued removal.
    order_removals_in_queue: HashSet<OrderId>,
}

impl OperationsToPropose {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nonce assignment
    // ========================================================================

    /// Assign the next nonce to an order's placement operation.
    ///
    /// # Panics
    ///
    /// Panics if the placement was already assigned a nonce this block.
    pub fn assign_nonce_to_order(&mut self, order: &Order, is_preexisting_stateful_order: bool) {
        let hash = order_placement_operation_hash(order, is_preexisting_stateful_order);
        self.assign_nonce_to_operation_hash(hash);
    }

    fn assign_nonce_to_operation_hash(&mut self, hash: OperationHash) {
        if let Some(nonce) = self.operation_hash_to_nonce.get(&hash) {
            panic!(
                "assign_nonce_to_operation_hash: operation {} has already been assigned nonce {}",
                hash, nonce,
            );
        }
        self.operation_hash_to_nonce.insert(hash, self.next_available_nonce);
        self.next_available_nonce += 1;
    }

    /// Drop the nonce of a placement that never made it into the queue
    /// (e.g. the order was fully canceled before mattering to the block).
    ///
    /// # Panics
    ///
    /// Panics if the placement has no nonce or is already queued.
    pub fn remove_order_placement_nonce(&mut self, order: &Order, is_preexisting_stateful_order: bool) {
        let hash = order_placement_operation_hash(order, is_preexisting_stateful_order);
        let Some(&nonce) = self.operation_hash_to_nonce.get(&hash) else {
            panic!(
                "remove_order_placement_nonce: order {} has no nonce",
                order.order_id,
            );
        };
        if self.nonce_to_operation.contains_key(&nonce) {
            panic!(
                "remove_order_placement_nonce: order {} is queued at nonce {}",
                order.order_id, nonce,
            );
        }
        self.operation_hash_to_nonce.remove(&hash);
    }

    fn must_get_nonce(&self, hash: OperationHash, what: &str) -> Nonce {
        match self.operation_hash_to_nonce.get(&hash) {
            Some(&nonce) => nonce,
            None => panic!("{}: operation {} has no nonce", what, hash),
        }
    }

    fn must_insert(&mut self, operation: InternalOperation) {
        let hash = operation.operation_hash();
        let nonce = self.must_get_nonce(hash, "must_insert");
        if let Some(existing) = self.nonce_to_operation.get(&nonce) {
            panic!(
                "must_insert: nonce {} is already occupied by {:?}",
                nonce, existing,
            );
        }
        self.nonce_to_operation.insert(nonce, operation);
    }

    // ========================================================================
    // Placements
    // ========================================================================

    /// Queue a short-term order placement with its original signed
    /// transaction bytes.
    ///
    /// # Panics
    ///
    /// Panics if the order is not short-term, was not nonce-assigned, or
    /// its nonce slot is occupied.
    pub fn add_short_term_order_placement_to_operations_queue(&mut self, order: Order, tx_bytes: Vec<u8>) {
        order.order_id.must_be_short_term_order();

        let order_hash = order.order_hash();
        self.short_term_order_hash_to_tx_bytes.insert(order_hash, tx_bytes);
        self.order_hashes_in_operations_queue.insert(order_hash);
        self.must_insert(InternalOperation::ShortTermOrderPlacement(order));
    }

    /// Queue a reference to a stateful order placed in a prior block.
    ///
    /// # Panics
    ///
    /// Panics if the order is not stateful, was not nonce-assigned as
    /// pre-existing, or its nonce slot is occupied.
    pub fn add_preexisting_stateful_order_placement_to_operations_queue(&mut self, order: &Order) {
        order.order_id.must_be_stateful_order();

        self.order_hashes_in_operations_queue.insert(order.order_hash());
        self.must_insert(InternalOperation::PreexistingStatefulOrderPlacement(
            order.order_id.clone(),
        ));
    }

    // ========================================================================
    // Cancellations, matches, removals
    // ========================================================================

    /// Queue a stateful order cancellation; assigns its nonce directly.
    pub fn add_order_cancellation_to_operations_queue(&mut self, cancel: CancelOrder) {
        let operation = InternalOperation::OrderCancellation(cancel);
        self.assign_nonce_to_operation_hash(operation.operation_hash());
        self.must_insert(operation);
    }

    /// Queue a match; assigns its nonce directly.
    ///
    /// # Panics
    ///
    /// Panics if any maker, or a non-liquidation taker, is not already
    /// placed in this queue: a match can only be proposed over orders in
    /// the same proposal's causal history.
    pub fn add_match_to_operations_queue(
        &mut self,
        taker: &dyn MatchableOrder,
        fills: &[MakerFillWithOrder],
    ) {
        if !taker.is_liquidation() {
            let taker_order = taker.must_get_order();
            if !self.order_hashes_in_operations_queue.contains(&taker_order.order_hash()) {
                panic!(
                    "add_match_to_operations_queue: taker order {} is not in the operations queue",
                    taker_order.order_id,
                );
            }
            self.matched_order_id_to_order
                .insert(taker_order.order_id.clone(), taker_order.clone());
        }

        for fill in fills {
            if !self.order_hashes_in_operations_queue.contains(&fill.order.order_hash()) {
                panic!(
                    "add_match_to_operations_queue: maker order {} is not in the operations queue",
                    fill.order.order_id,
                );
            }
            self.matched_order_id_to_order
                .insert(fill.order.order_id.clone(), fill.order.clone());
        }

        let clob_match = taker.to_clob_match(maker_fills_with_orders_to_maker_fills(fills));
        let operation = InternalOperation::Match(clob_match);
        self.assign_nonce_to_operation_hash(operation.operation_hash());
        self.must_insert(operation);
    }

    /// Queue a stateful order removal; assigns its nonce directly.
    ///
    /// # Panics
    ///
    /// Panics on short-term identities and on duplicate removals.
    pub fn add_order_removal_to_operations_queue(&mut self, removal: OrderRemoval) {
        removal.order_id.must_be_stateful_order();
        if !self.order_removals_in_queue.insert(removal.order_id.clone()) {
            panic!(
                "add_order_removal_to_operations_queue: order {} already has a queued removal",
                removal.order_id,
            );
        }

        let operation = InternalOperation::OrderRemoval(removal);
        self.assign_nonce_to_operation_hash(operation.operation_hash());
        self.must_insert(operation);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether an order's placement operation is in the queue.
    ///
    /// # Panics
    ///
    /// Panics if the placement has no nonce; callers only ask about
    /// orders they nonce-assigned.
    pub fn is_order_placement_in_operations_queue(
        &self,
        order: &Order,
        is_preexisting_stateful_order: bool,
    ) -> bool {
        let hash = order_placement_operation_hash(order, is_preexisting_stateful_order);
        let nonce = self.must_get_nonce(hash, "is_order_placement_in_operations_queue");
        self.nonce_to_operation.contains_key(&nonce)
    }

    /// Whether a placement operation has been nonce-assigned.
    pub fn does_order_placement_have_nonce(
        &self,
        order: &Order,
        is_preexisting_stateful_order: bool,
    ) -> bool {
        let hash = order_placement_operation_hash(order, is_preexisting_stateful_order);
        self.operation_hash_to_nonce.contains_key(&hash)
    }

    /// Whether a removal for the identity is queued.
    pub fn is_order_removal_in_queue(&self, order_id: &OrderId) -> bool {
        self.order_removals_in_queue.contains(order_id)
    }

    /// Full order behind a queued match reference.
    ///
    /// # Panics
    ///
    /// Panics if no queued match references the identity.
    pub fn must_get_matched_order(&self, order_id: &OrderId) -> &Order {
        self.matched_order_id_to_order.get(order_id).unwrap_or_else(|| {
            panic!("must_get_matched_order: order {} was not matched in this queue", order_id)
        })
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.nonce_to_operation.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.nonce_to_operation.is_empty()
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// The queue in ascending nonce order.
    pub fn get_operations_queue(&self) -> Vec<InternalOperation> {
        self.nonce_to_operation.values().cloned().collect()
    }

    /// The queue for local re-derivation: ascending nonce order, with
    /// pre-existing stateful references included.
    ///
    /// # Panics
    ///
    /// Panics if a short-term placement has no recorded transaction bytes
    /// or the recorded bytes are empty.
    pub fn get_operations_to_replay(&self) -> Vec<InternalOperation> {
        for operation in self.nonce_to_operation.values() {
            if let InternalOperation::ShortTermOrderPlacement(order) = operation {
                self.must_get_short_term_tx_bytes(order);
            }
        }
        self.get_operations_queue()
    }

    /// The externally proposed wire form: short-term placements re-emitted
    /// as their original transaction bytes, pre-existing references
    /// dropped (peers already know those orders).
    ///
    /// # Panics
    ///
    /// Panics if a short-term placement has no recorded transaction bytes
    /// or the recorded bytes are empty.
    pub fn get_operations_to_propose(&self) -> Vec<OperationRaw> {
        self.nonce_to_operation
            .values()
            .filter_map(|operation| match operation {
                InternalOperation::ShortTermOrderPlacement(order) => Some(
                    OperationRaw::ShortTermOrderPlacement(self.must_get_short_term_tx_bytes(order)),
                ),
                InternalOperation::PreexistingStatefulOrderPlacement(_) => None,
                InternalOperation::OrderCancellation(cancel) => {
                    Some(OperationRaw::OrderCancellation(cancel.clone()))
                }
                InternalOperation::Match(clob_match) => Some(OperationRaw::Match(clob_match.clone())),
                InternalOperation::OrderRemoval(removal) => {
                    Some(OperationRaw::OrderRemoval(removal.clone()))
                }
            })
            .collect()
    }

    fn must_get_short_term_tx_bytes(&self, order: &Order) -> Vec<u8> {
        let bytes = self
            .short_term_order_hash_to_tx_bytes
            .get(&order.order_hash())
            .unwrap_or_else(|| {
                panic!(
                    "must_get_short_term_tx_bytes: no transaction bytes for short-term order {}",
                    order.order_id,
                )
            });
        if bytes.is_empty() {
            panic!(
                "must_get_short_term_tx_bytes: empty transaction bytes for short-term order {}",
                order.order_id,
            );
        }
        bytes.clone()
    }

    // ========================================================================
    // Clearing
    // ========================================================================

    /// Clear the queue between matching passes.
    ///
    /// Removes exactly the queued nonces from the assignment map and
    /// empties the queue and its side indexes. The nonce counter and the
    /// short-term tx-byte bookkeeping survive: resting orders can match
    /// again in later passes and must keep their nonces replayable.
    ///
    /// # Panics
    ///
    /// Panics if a queued operation has no assigned nonce or its assigned
    /// nonce disagrees with its queue position; either means the two maps
    /// desynchronized.
    pub fn clear_operations_queue(&mut self) {
        for (&queued_nonce, operation) in &self.nonce_to_operation {
            let hash = operation.operation_hash();
            let Some(&assigned_nonce) = self.operation_hash_to_nonce.get(&hash) else {
                panic!(
                    "clear_operations_queue: no nonce to remove for operation {:?}",
                    operation,
                );
            };
            if queued_nonce != assigned_nonce {
                panic!(
                    "clear_operations_queue: operation {:?} assigned nonce {} but queued at {}",
                    operation, assigned_nonce, queued_nonce,
                );
            }
            self.operation_hash_to_nonce.remove(&hash);
        }

        self.nonce_to_operation.clear();
        self.order_hashes_in_operations_queue.clear();
        self.matched_order_id_to_order.clear();
        self.order_removals_in_queue.clear();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
