//! Market (CLOB pair) metadata.
//!
//! A `ClobPair` describes one tradable market: what it settles against
//! (a perpetual or a spot asset pair), its price/size quantization, its
//! lifecycle status, and its fee schedule. Orders are checked against the
//! pair's quantization before they may enter the book.

use crate::types::error::ClobError;
use crate::types::order::Order;

/// What a CLOB pair trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClobPairMetadata {
    /// A perpetual market.
    Perpetual {
        /// Identifier of the underlying perpetual.
        perpetual_id: u32,
    },
    /// A spot market.
    Spot {
        /// Identifier of the base asset.
        base_asset_id: u32,
        /// Identifier of the quote asset.
        quote_asset_id: u32,
    },
}

/// Lifecycle status of a CLOB pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClobPairStatus {
    /// Accepting all order flow.
    Active,
    /// Not accepting any order flow.
    Paused,
    /// Accepting cancellations only.
    CancelOnly,
    /// Accepting post-only order flow.
    PostOnly,
    /// Not yet open for trading.
    Initializing,
    /// Winding down; only position-closing flow.
    FinalSettlement,
}

/// One tradable market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClobPair {
    /// Market identifier.
    pub id: u32,

    /// What the market trades.
    pub metadata: ClobPairMetadata,

    /// Minimum size increment in base quantums.
    pub step_base_quantums: u64,

    /// Minimum price increment in subticks.
    pub subticks_per_tick: u32,

    /// Exponent relating subticks * base quantums to quote quantums.
    pub quantum_conversion_exponent: i32,

    /// Minimum order size in base quantums.
    pub min_order_base_quantums: u64,

    /// Lifecycle status.
    pub status: ClobPairStatus,

    /// Maker fee in parts per million.
    pub maker_fee_ppm: u32,

    /// Taker fee in parts per million.
    pub taker_fee_ppm: u32,
}

impl ClobPair {
    /// Validate the pair's quantization parameters.
    pub fn validate(&self) -> Result<(), ClobError> {
        if self.step_base_quantums == 0 {
            return Err(ClobError::InvalidClobPair {
                clob_pair_id: self.id,
                reason: "step_base_quantums must be positive".to_string(),
            });
        }
        if self.subticks_per_tick == 0 {
            return Err(ClobError::InvalidClobPair {
                clob_pair_id: self.id,
                reason: "subticks_per_tick must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the pair is a perpetual market.
    pub fn is_perpetual(&self) -> bool {
        matches!(self.metadata, ClobPairMetadata::Perpetual { .. })
    }

    /// Whether the pair currently accepts new matches.
    pub fn accepts_new_matches(&self) -> bool {
        matches!(self.status, ClobPairStatus::Active)
    }

    /// Precondition accessor: the caller requires a perpetual market.
    ///
    /// # Panics
    ///
    /// Panics if the pair is a spot market.
    pub fn must_get_perpetual_id(&self) -> u32 {
        match self.metadata {
            ClobPairMetadata::Perpetual { perpetual_id } => perpetual_id,
            ClobPairMetadata::Spot { .. } => {
                panic!("must_get_perpetual_id: clob pair {} is not a perpetual market", self.id)
            }
        }
    }

    /// Check an order against the pair's quantization.
    pub fn validate_order_against_pair(&self, order: &Order) -> Result<(), ClobError> {
        if order.quantums < self.min_order_base_quantums {
            return Err(ClobError::OrderSizeBelowMinimum {
                quantums: order.quantums,
                min: self.min_order_base_quantums,
            });
        }
        if order.quantums % self.step_base_quantums != 0 {
            return Err(ClobError::OrderSizeNotMultipleOfStep {
                quantums: order.quantums,
                step: self.step_base_quantums,
            });
        }
        if order.subticks % u64::from(self.subticks_per_tick) != 0 {
            return Err(ClobError::SubticksNotMultipleOfTick {
                subticks: order.subticks,
                subticks_per_tick: self.subticks_per_tick,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
