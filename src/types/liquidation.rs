//! Liquidation orders and the `MatchableOrder` abstraction.
//!
//! A liquidation order is synthesized by the protocol to close an
//! undercollateralized subaccount's perpetual position. It takes the taker
//! side of matches exactly like a regular order, so matching code works
//! against the [`MatchableOrder`] trait rather than concrete order types.
//!
//! ## Identity hash
//!
//! A liquidation order's hash covers only `(subaccount, perpetual_id)`:
//! two liquidation attempts against the same position hash equal regardless
//! of side, size, or price. The hash correlates attempts, it does not
//! distinguish their terms.

use ssz_rs::prelude::*;

use crate::types::clob_pair::ClobPair;
use crate::types::operation::{ClobMatch, MakerFill, MatchOrders, MatchPerpetualLiquidation};
use crate::types::order::{sha256, Order, OrderHash, Side};
use crate::types::subaccount::{SubaccountId, SubaccountIdCanonical};

/// Anything that can take the taker side of a match: a regular order or a
/// liquidation order.
pub trait MatchableOrder {
    /// Subaccount on the taker side.
    fn subaccount_id(&self) -> &SubaccountId;

    /// Market being matched.
    fn clob_pair_id(&self) -> u32;

    /// Whether the taker side buys.
    fn is_buy(&self) -> bool;

    /// Taker size in base quantums.
    fn base_quantums(&self) -> u64;

    /// Taker limit price in subticks.
    fn subticks(&self) -> u64;

    /// Whether this is a liquidation order.
    fn is_liquidation(&self) -> bool;

    /// Whether the order may only reduce an existing position.
    fn is_reduce_only(&self) -> bool;

    /// Canonical hash used to key this matchable order.
    fn matchable_order_hash(&self) -> OrderHash;

    /// Precondition accessor for the underlying regular order.
    ///
    /// # Panics
    ///
    /// Panics for liquidation orders; callers must check
    /// [`MatchableOrder::is_liquidation`] first.
    fn must_get_order(&self) -> &Order;

    /// Build the match this taker produces from the given maker fills.
    fn to_clob_match(&self, fills: Vec<MakerFill>) -> ClobMatch;
}

impl MatchableOrder for Order {
    fn subaccount_id(&self) -> &SubaccountId {
        &self.order_id.subaccount_id
    }

    fn clob_pair_id(&self) -> u32 {
        self.order_id.clob_pair_id
    }

    fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    fn base_quantums(&self) -> u64 {
        self.quantums
    }

    fn subticks(&self) -> u64 {
        self.subticks
    }

    fn is_liquidation(&self) -> bool {
        false
    }

    fn is_reduce_only(&self) -> bool {
        self.reduce_only
    }

    fn matchable_order_hash(&self) -> OrderHash {
        self.order_hash()
    }

    fn must_get_order(&self) -> &Order {
        self
    }

    fn to_clob_match(&self, fills: Vec<MakerFill>) -> ClobMatch {
        ClobMatch::MatchOrders(MatchOrders {
            taker_order_id: self.order_id.clone(),
            taker_order_hash: self.order_hash().0.to_vec(),
            fills,
        })
    }
}

// ============================================================================
// LiquidationOrder
// ============================================================================

/// A protocol-synthesized order liquidating one subaccount's perpetual
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationOrder {
    /// The subaccount being liquidated.
    pub liquidated_subaccount: SubaccountId,

    /// Perpetual whose position is being closed.
    pub perpetual_id: u32,

    /// Market the liquidation trades on.
    pub clob_pair_id: u32,

    /// Whether the liquidation buys (closing a short).
    pub is_buy: bool,

    /// Size in base quantums.
    pub quantums: u64,

    /// Limit price in subticks.
    pub subticks: u64,
}

/// Canonical SSZ form of a liquidation order's identity. Side, size, and
/// price are deliberately absent.
#[derive(Debug, Default, SimpleSerialize)]
struct LiquidationIdentityCanonical {
    subaccount_id: SubaccountIdCanonical,
    perpetual_id: u32,
}

impl LiquidationOrder {
    /// Create a liquidation order against a perpetual market.
    ///
    /// # Panics
    ///
    /// Panics if `clob_pair` is not a perpetual market; liquidations exist
    /// only for perpetual positions.
    pub fn new(
        liquidated_subaccount: SubaccountId,
        clob_pair: &ClobPair,
        is_buy: bool,
        quantums: u64,
        subticks: u64,
    ) -> Self {
        let perpetual_id = clob_pair.must_get_perpetual_id();
        Self {
            liquidated_subaccount,
            perpetual_id,
            clob_pair_id: clob_pair.id,
            is_buy,
            quantums,
            subticks,
        }
    }
}

impl MatchableOrder for LiquidationOrder {
    fn subaccount_id(&self) -> &SubaccountId {
        &self.liquidated_subaccount
    }

    fn clob_pair_id(&self) -> u32 {
        self.clob_pair_id
    }

    fn is_buy(&self) -> bool {
        self.is_buy
    }

    fn base_quantums(&self) -> u64 {
        self.quantums
    }

    fn subticks(&self) -> u64 {
        self.subticks
    }

    fn is_liquidation(&self) -> bool {
        true
    }

    fn is_reduce_only(&self) -> bool {
        false
    }

    fn matchable_order_hash(&self) -> OrderHash {
        let canonical = LiquidationIdentityCanonical {
            subaccount_id: self.liquidated_subaccount.must_canonical(),
            perpetual_id: self.perpetual_id,
        };
        let bytes = ssz_rs::serialize(&canonical).unwrap_or_else(|e| {
            panic!(
                "matchable_order_hash: failed to encode liquidation identity for {}: {:?}",
                self.liquidated_subaccount, e
            )
        });
        OrderHash(sha256(&bytes))
    }

    fn must_get_order(&self) -> &Order {
        panic!(
            "must_get_order: liquidation order for {} is not a regular order",
            self.liquidated_subaccount
        )
    }

    fn to_clob_match(&self, fills: Vec<MakerFill>) -> ClobMatch {
        ClobMatch::MatchPerpetualLiquidation(MatchPerpetualLiquidation {
            liquidated: self.liquidated_subaccount.clone(),
            clob_pair_id: self.clob_pair_id,
            perpetual_id: self.perpetual_id,
            total_size: self.quantums,
            is_buy: self.is_buy,
            fills,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
