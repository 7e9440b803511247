//! Error types for the matching and proposal core.
//!
//! Two channels exist, deliberately kept apart:
//!
//! - [`ClobError`]: typed, recoverable validation errors. The offending
//!   transaction or operation is rejected; block processing continues.
//! - Invariant violations (double nonce assignment, matches over unqueued
//!   orders, liquidations on spot pairs, ...) are *not* represented here.
//!   They panic inside `must_*` methods, because they mean the core's own
//!   sequencing discipline is already broken and the block cannot be
//!   processed deterministically.
//!
//! [`OrderStatus`] is a third, narrower channel: the classification of a
//! single matching attempt, consumed by the caller to decide whether to
//! rest, cancel, resize, or escalate an order. It is not an error type.

use thiserror::Error;

use crate::types::order::OrderId;
use crate::types::subaccount::SubaccountId;

/// Recoverable validation errors surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClobError {
    // ------------------------------------------------------------------
    // Identity / order structure
    // ------------------------------------------------------------------
    #[error("invalid subaccount id owner address: {owner:?}")]
    InvalidSubaccountIdOwner { owner: String },

    #[error("invalid subaccount id number: {number}")]
    InvalidSubaccountIdNumber { number: u32 },

    #[error("invalid order flags: {flags}")]
    InvalidOrderFlags { flags: u32 },

    #[error("order {order_id} has zero quantums")]
    InvalidOrderQuantums { order_id: OrderId },

    #[error("order {order_id} has zero subticks")]
    InvalidOrderSubticks { order_id: OrderId },

    #[error("order {order_id} has the wrong expiration kind for its order flags")]
    InvalidExpirationKind { order_id: OrderId },

    #[error("order {order_id} has inconsistent conditional fields")]
    InvalidConditionalOrder { order_id: OrderId },

    #[error("order size {quantums} is below the pair minimum {min}")]
    OrderSizeBelowMinimum { quantums: u64, min: u64 },

    #[error("order size {quantums} is not a multiple of step size {step}")]
    OrderSizeNotMultipleOfStep { quantums: u64, step: u64 },

    #[error("order subticks {subticks} is not a multiple of {subticks_per_tick}")]
    SubticksNotMultipleOfTick { subticks: u64, subticks_per_tick: u32 },

    // ------------------------------------------------------------------
    // Clob pair
    // ------------------------------------------------------------------
    #[error("clob pair {clob_pair_id} is invalid: {reason}")]
    InvalidClobPair { clob_pair_id: u32, reason: String },

    #[error("clob pair {clob_pair_id} does not accept this operation in its current status")]
    UnsupportedClobPairStatus { clob_pair_id: u32 },

    // ------------------------------------------------------------------
    // Match validation
    // ------------------------------------------------------------------
    #[error("match constitutes a self-trade for subaccount {subaccount_id}")]
    SelfTrade { subaccount_id: SubaccountId },

    #[error("match has a zero fill amount")]
    ZeroFillAmount,

    #[error("maker clob pair {maker_clob_pair_id} does not match taker clob pair {taker_clob_pair_id}")]
    ClobPairMismatch {
        maker_clob_pair_id: u32,
        taker_clob_pair_id: u32,
    },

    #[error("maker and taker are on the same side")]
    SameSideMatch,

    #[error("orders do not cross: maker subticks {maker_subticks}, taker subticks {taker_subticks}")]
    NonCrossingMatch {
        maker_subticks: u64,
        taker_subticks: u64,
    },

    #[error("fill amount {fill_amount} exceeds a matched order's size {order_quantums}")]
    FillAmountExceedsOrderSize {
        fill_amount: u64,
        order_quantums: u64,
    },

    #[error("a liquidation order cannot be the maker side of a match")]
    LiquidationAsMaker,

    #[error("maker order {order_id} requires immediate execution and cannot rest as maker")]
    MakerRequiresImmediateExecution { order_id: OrderId },

    #[error("post-only order {order_id} would cross a maker order")]
    PostOnlyWouldCrossMakerOrder { order_id: OrderId },

    #[error("fill-or-kill order {order_id} could not be fully filled")]
    FillOrKillCouldNotBeFullyFilled { order_id: OrderId },

    #[error("reduce-only order {order_id} would increase or open a position")]
    InvalidReduceOnly { order_id: OrderId },

    // ------------------------------------------------------------------
    // Operations queue replay
    // ------------------------------------------------------------------
    #[error("order {order_id} was already placed in this block and the new order is not a higher-priority replacement")]
    InvalidReplacement { order_id: OrderId },

    #[error("short-term cancellation references order {order_id} which was not placed in this block")]
    ShortTermCancellationUnknownOrder { order_id: OrderId },

    #[error("cancellation for order {order_id} has the wrong expiration kind for its order flags")]
    InvalidCancellationExpirationKind { order_id: OrderId },

    #[error("pre-existing stateful order {order_id} appears more than once")]
    DuplicatePreexistingStatefulOrder { order_id: OrderId },

    #[error("pre-existing order reference {order_id} is not a stateful order")]
    PreexistingOrderNotStateful { order_id: OrderId },

    #[error("match references maker order {order_id} which is not known at this point in the block")]
    UnknownMakerOrder { order_id: OrderId },

    #[error("match references taker order {order_id} which is not known at this point in the block")]
    UnknownTakerOrder { order_id: OrderId },

    #[error("maker order {order_id} appears more than once in a match's fills")]
    DuplicateMakerFill { order_id: OrderId },

    #[error("taker order hash must be exactly 32 bytes, got {len}")]
    InvalidTakerOrderHashLength { len: usize },

    #[error("liquidation match has zero total size")]
    ZeroLiquidationSize,

    #[error("liquidation fill amounts sum to {fill_sum}, exceeding total size {total_size}")]
    LiquidationFillsExceedTotalSize { total_size: u64, fill_sum: u128 },

    #[error("deleveraging match has no fills")]
    DeleveragingNoFills,

    #[error("deleveraging fill offsets the liquidated subaccount {subaccount_id} against itself")]
    DeleveragingSelfFill { subaccount_id: SubaccountId },

    #[error("deleveraging fills contain duplicate offsetting subaccount {subaccount_id}")]
    DuplicateDeleveragingFill { subaccount_id: SubaccountId },

    #[error("order removal reason must be specified")]
    UnspecifiedRemovalReason,

    #[error("order removal is not allowed for short-term order {order_id}")]
    ShortTermOrderRemoval { order_id: OrderId },

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------
    #[error("arithmetic overflow while {context}")]
    ArithmeticOverflow { context: &'static str },
}

/// Classification of one order's matching attempt.
///
/// Consumed by the caller to decide whether to rest, cancel, resize, or
/// escalate the order. `Success` is the only status under which an order
/// may rest on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// The order was matched and/or rested without incident.
    Success,
    /// Placing or filling the order would leave its subaccount
    /// undercollateralized.
    Undercollateralized,
    /// An unexpected internal inconsistency was observed.
    InternalError,
    /// An IOC order had remaining size after matching and may not rest.
    ImmediateOrCancelWouldRestOnBook,
    /// A reduce-only order was resized down to its position size.
    ReduceOnlyResized,
    /// The book could not absorb the liquidation; deleveraging is required.
    LiquidationRequiresDeleveraging,
    /// The liquidation would exceed the per-block notional-liquidated cap.
    LiquidationExceededMaxNotionalLiquidated,
    /// The liquidation would exceed the per-block insurance-fund-lost cap.
    LiquidationExceededMaxInsuranceLost,
    /// The fill would violate isolated-subaccount constraints.
    ViolatesIsolatedSubaccountConstraints,
}

impl OrderStatus {
    /// Whether the order is successfully placed or matched.
    pub fn is_success(self) -> bool {
        matches!(self, OrderStatus::Success | OrderStatus::ReduceOnlyResized)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
