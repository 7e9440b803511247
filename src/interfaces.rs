//! Collaborator interfaces to the surrounding protocol.
//!
//! The matching core does not own subaccount balances, oracle prices, or
//! durable stateful-order storage; it reaches them through the traits here.
//! Production implementations live outside this crate. [`InMemoryLedger`]
//! is a self-contained implementation for tests and the demo binary.
//!
//! All balance quantities are signed i128: positions can be short, and
//! deltas from fills are applied as signed quantums.

use std::collections::{BTreeMap, HashMap};

use crate::types::{ClobError, Order, OrderId, SubaccountId, QUOTE_ASSET_ID};

// ============================================================================
// Support types
// ============================================================================

/// A subaccount's positions as seen by the matching core.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subaccount {
    /// Asset id to signed balance in that asset's quantums.
    pub asset_positions: BTreeMap<u32, i128>,

    /// Perpetual id to signed position size in base quantums.
    pub perpetual_positions: BTreeMap<u32, i128>,
}

impl Subaccount {
    /// Signed balance of the quote asset.
    pub fn quote_balance(&self) -> i128 {
        self.asset_positions.get(&QUOTE_ASSET_ID).copied().unwrap_or(0)
    }

    /// Signed position size for a perpetual, zero when absent.
    pub fn perpetual_position(&self, perpetual_id: u32) -> i128 {
        self.perpetual_positions.get(&perpetual_id).copied().unwrap_or(0)
    }
}

/// One proposed balance change against a subaccount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubaccountBalanceUpdate {
    /// Target subaccount.
    pub subaccount_id: SubaccountId,

    /// Asset id to signed delta.
    pub asset_deltas: BTreeMap<u32, i128>,

    /// Perpetual id to signed delta in base quantums.
    pub perpetual_deltas: BTreeMap<u32, i128>,
}

/// Outcome of (hypothetically) applying one balance update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The update keeps the subaccount collateralized.
    Success,
    /// The update would push a collateralized subaccount under.
    NewlyUndercollateralized,
    /// The subaccount was already under and the update does not cure it.
    StillUndercollateralized,
    /// The update violates isolated-subaccount constraints.
    ViolatesIsolatedSubaccountConstraints,
}

impl UpdateResult {
    /// Whether the update may be applied.
    pub fn is_success(self) -> bool {
        matches!(self, UpdateResult::Success)
    }
}

/// A subaccount's net collateral alongside its margin requirements, all in
/// quote quantums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralAndMargin {
    /// Net collateral (can be negative).
    pub net_collateral: i128,

    /// Initial margin requirement.
    pub initial_margin: i128,

    /// Maintenance margin requirement.
    pub maintenance_margin: i128,
}

/// Margin requirements for one position, in quote quantums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginRequirements {
    /// Initial margin requirement.
    pub initial: i128,

    /// Maintenance margin requirement.
    pub maintenance: i128,
}

// ============================================================================
// Traits
// ============================================================================

/// Balance-keeping seam. The engine asks before committing fills; the
/// settlement layer pushes the folded deltas through afterwards.
pub trait SubaccountLedger {
    /// Current positions of a subaccount (default/empty when unknown).
    fn get_subaccount(&self, subaccount_id: &SubaccountId) -> Subaccount;

    /// Whether each update could be applied, without applying any.
    fn can_update_subaccounts(&self, updates: &[SubaccountBalanceUpdate]) -> Vec<UpdateResult>;

    /// Apply each update that is applicable; returns per-update results.
    fn update_subaccounts(&mut self, updates: &[SubaccountBalanceUpdate]) -> Vec<UpdateResult>;

    /// Net collateral and margin requirements of a subaccount.
    fn get_net_collateral_and_margin(&self, subaccount_id: &SubaccountId) -> CollateralAndMargin;
}

/// Perpetuals pricing seam: oracle-derived notional and margin numbers.
pub trait PerpetualsPricing {
    /// Signed net notional of a position, in quote quantums.
    fn get_net_notional(&self, perpetual_id: u32, base_quantums: i128) -> Result<i128, ClobError>;

    /// Margin requirements for a position of the given signed size.
    fn get_margin_requirements(
        &self,
        perpetual_id: u32,
        base_quantums: i128,
    ) -> Result<MarginRequirements, ClobError>;

    /// Funding settlement rate in parts per million.
    fn get_settlement_ppm(&self, perpetual_id: u32) -> u32;
}

/// Durable storage seam for stateful orders and fill amounts.
pub trait StatefulOrderStore {
    /// Stored placement of a long-term order, if any.
    fn get_long_term_order_placement(&self, order_id: &OrderId) -> Option<Order>;

    /// Store the placement of a long-term order.
    fn set_long_term_order_placement(&mut self, order: Order);

    /// Delete a stored long-term order placement.
    fn delete_long_term_order_placement(&mut self, order_id: &OrderId);

    /// Total filled amount recorded for an order, in base quantums.
    fn get_order_fill_amount(&self, order_id: &OrderId) -> Option<u64>;

    /// Forget the filled amount recorded for an order.
    fn remove_order_fill_amount(&mut self, order_id: &OrderId);
}

// ============================================================================
// In-memory reference ledger
// ============================================================================

/// In-memory [`SubaccountLedger`] for tests and the demo binary.
///
/// Collateralization is simplified to the quote balance: an update is
/// applicable iff the resulting quote balance stays non-negative. Position
/// deltas are tracked but never margined.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    subaccounts: HashMap<SubaccountId, Subaccount>,
}

impl InMemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subaccount with a quote balance.
    pub fn fund(&mut self, subaccount_id: SubaccountId, quote_quantums: i128) {
        let subaccount = self.subaccounts.entry(subaccount_id).or_default();
        *subaccount.asset_positions.entry(QUOTE_ASSET_ID).or_insert(0) += quote_quantums;
    }

    fn check_update(&self, update: &SubaccountBalanceUpdate) -> UpdateResult {
        let current = self
            .subaccounts
            .get(&update.subaccount_id)
            .cloned()
            .unwrap_or_default();
        let quote_before = current.quote_balance();
        let quote_delta: i128 = update
            .asset_deltas
            .get(&QUOTE_ASSET_ID)
            .copied()
            .unwrap_or(0);
        let quote_after = quote_before + quote_delta;

        if quote_after >= 0 {
            UpdateResult::Success
        } else if quote_before >= 0 {
            UpdateResult::NewlyUndercollateralized
        } else {
            UpdateResult::StillUndercollateralized
        }
    }

    fn apply_update(&mut self, update: &SubaccountBalanceUpdate) {
        let subaccount = self.subaccounts.entry(update.subaccount_id.clone()).or_default();
        for (&asset_id, &delta) in &update.asset_deltas {
            *subaccount.asset_positions.entry(asset_id).or_insert(0) += delta;
        }
        for (&perpetual_id, &delta) in &update.perpetual_deltas {
            *subaccount.perpetual_positions.entry(perpetual_id).or_insert(0) += delta;
        }
    }
}

impl SubaccountLedger for InMemoryLedger {
    fn get_subaccount(&self, subaccount_id: &SubaccountId) -> Subaccount {
        self.subaccounts.get(subaccount_id).cloned().unwrap_or_default()
    }

    fn can_update_subaccounts(&self, updates: &[SubaccountBalanceUpdate]) -> Vec<UpdateResult> {
        updates.iter().map(|update| self.check_update(update)).collect()
    }

    fn update_subaccounts(&mut self, updates: &[SubaccountBalanceUpdate]) -> Vec<UpdateResult> {
        updates
            .iter()
            .map(|update| {
                let result = self.check_update(update);
                if result.is_success() {
                    self.apply_update(update);
                }
                result
            })
            .collect()
    }

    fn get_net_collateral_and_margin(&self, subaccount_id: &SubaccountId) -> CollateralAndMargin {
        let net_collateral = self.get_subaccount(subaccount_id).quote_balance();
        CollateralAndMargin {
            net_collateral,
            initial_margin: 0,
            maintenance_margin: 0,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
