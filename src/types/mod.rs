//! Core data types for the matching and proposal pipeline.
//!
//! All consensus-relevant types have a canonical SSZ encoding, hashed with
//! SHA-256 to produce the order and operation hashes the proposal layer
//! keys by. All quantities are integer quantums and subticks; see
//! [`quantums`] for the unit system.
//!
//! ## Types
//!
//! - [`Order`] / [`OrderId`]: a limit order and its identity
//! - [`ClobPair`]: one tradable market and its quantization
//! - [`LiquidationOrder`] / [`MatchableOrder`]: liquidation takers and the
//!   abstraction matching code works against
//! - [`InternalOperation`] / [`OperationRaw`]: queue operations, local and
//!   wire forms
//! - [`ClobError`]: every validation failure in the crate

pub mod clob_pair;
pub mod error;
pub mod liquidation;
pub mod operation;
pub mod order;
pub mod quantums;
pub mod subaccount;

// Re-export the working set at module level.
pub use clob_pair::{ClobPair, ClobPairMetadata, ClobPairStatus};
pub use error::{ClobError, OrderStatus};
pub use liquidation::{LiquidationOrder, MatchableOrder};
pub use operation::{
    maker_fills_with_orders_to_maker_fills, order_placement_operation_hash, CancelOrder, ClobMatch,
    DeleveragingFill, InternalOperation, MakerFill, MakerFillWithOrder, MatchOrders,
    MatchPerpetualDeleveraging, MatchPerpetualLiquidation, OperationHash, OperationRaw, OrderRemoval,
    RemovalReason,
};
pub use order::{
    sort_order_ids, sort_orders, ConditionType, Order, OrderExpiration, OrderHash, OrderId, Side,
    TimeInForce, ORDER_FLAGS_CONDITIONAL, ORDER_FLAGS_LONG_TERM, ORDER_FLAGS_SHORT_TERM,
    ORDER_FLAGS_TWAP, ORDER_FLAGS_TWAP_SUBORDER,
};
pub use quantums::{
    fill_amount_to_quote_quantums, get_average_price_subticks, subticks_to_price_decimal, BaseQuantums,
    PriceRational, QuoteQuantums, Subticks, QUOTE_ASSET_ID,
};
pub use subaccount::{SubaccountId, MAX_OWNER_LENGTH, MAX_SUBACCOUNT_NUMBER};
