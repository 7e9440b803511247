//! Order identity and order model.
//!
//! ## Order classes
//!
//! `order_flags` is a closed enumeration of fixed values, not a bitmask:
//! exactly one of short-term (0), conditional (32), long-term (64), TWAP
//! (128), or TWAP-suborder (256) is ever set. Short-term orders expire at a
//! block height (`GoodTilBlock`) and live only in memory; all other classes
//! are stateful, expire at a block time (`GoodTilBlockTime`), and persist
//! across blocks.
//!
//! ## Canonical encoding and hashing
//!
//! Every order has exactly one canonical byte form: the SSZ encoding of its
//! canonical struct. The 32-byte order hash is SHA-256 over those bytes, and
//! two orders are equal iff their canonical encodings are equal. Equality
//! therefore never depends on how optional sub-values were constructed in
//! memory.

use std::cmp::Ordering;

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::error::ClobError;
use crate::types::subaccount::{SubaccountId, SubaccountIdCanonical};

// ============================================================================
// Order flags
// ============================================================================

/// Short-term order. Expires at a block height; never persisted.
pub const ORDER_FLAGS_SHORT_TERM: u32 = 0;

/// Conditional order. Stateful; rests untriggered until its condition fires.
pub const ORDER_FLAGS_CONDITIONAL: u32 = 32;

/// Long-term order. Stateful.
pub const ORDER_FLAGS_LONG_TERM: u32 = 64;

/// TWAP parent order. Stateful.
pub const ORDER_FLAGS_TWAP: u32 = 128;

/// TWAP suborder, generated from a TWAP parent. Stateful.
pub const ORDER_FLAGS_TWAP_SUBORDER: u32 = 256;

/// SHA-256 over `data`.
pub(crate) fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

// ============================================================================
// Side
// ============================================================================

/// Order side: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order (bid).
    #[default]
    Buy,
    /// Sell order (ask).
    Sell,
}

impl Side {
    /// Convert to u8 for canonical encoding.
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// Time in force / condition type
// ============================================================================

/// Execution constraint attached to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeInForce {
    /// No constraint: match what crosses, rest the remainder.
    #[default]
    Unspecified,
    /// Immediate-or-cancel: any unmatched remainder is cancelled.
    Ioc,
    /// Post-only: reject instead of crossing a maker order.
    PostOnly,
    /// Fill-or-kill: match the full size immediately or cancel entirely.
    FillOrKill,
}

impl TimeInForce {
    /// Convert to u8 for canonical encoding.
    pub fn to_u8(self) -> u8 {
        match self {
            TimeInForce::Unspecified => 0,
            TimeInForce::Ioc => 1,
            TimeInForce::PostOnly => 2,
            TimeInForce::FillOrKill => 3,
        }
    }

    /// Convert from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TimeInForce::Unspecified),
            1 => Some(TimeInForce::Ioc),
            2 => Some(TimeInForce::PostOnly),
            3 => Some(TimeInForce::FillOrKill),
            _ => None,
        }
    }
}

/// Trigger condition of a conditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionType {
    /// Not a conditional order.
    #[default]
    Unspecified,
    /// Stop-loss: triggers when the price moves against the position.
    StopLoss,
    /// Take-profit: triggers when the price moves with the position.
    TakeProfit,
}

impl ConditionType {
    /// Convert to u8 for canonical encoding.
    pub fn to_u8(self) -> u8 {
        match self {
            ConditionType::Unspecified => 0,
            ConditionType::StopLoss => 1,
            ConditionType::TakeProfit => 2,
        }
    }

    /// Convert from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ConditionType::Unspecified),
            1 => Some(ConditionType::StopLoss),
            2 => Some(ConditionType::TakeProfit),
            _ => None,
        }
    }
}

// ============================================================================
// Expiration
// ============================================================================

/// Expiration of an order.
///
/// Short-term orders expire at a block height; stateful orders expire at a
/// block time. The variant in use is fixed by the order's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderExpiration {
    /// Expires after the given block height.
    GoodTilBlock(u32),
    /// Expires after the given unix block time (seconds).
    GoodTilBlockTime(u32),
}

impl OrderExpiration {
    /// Variant tag for canonical encoding.
    pub fn kind_raw(self) -> u8 {
        match self {
            OrderExpiration::GoodTilBlock(_) => 0,
            OrderExpiration::GoodTilBlockTime(_) => 1,
        }
    }

    /// The raw expiration value, ignoring the variant.
    pub fn value(self) -> u32 {
        match self {
            OrderExpiration::GoodTilBlock(v) => v,
            OrderExpiration::GoodTilBlockTime(v) => v,
        }
    }
}

// ============================================================================
// OrderId
// ============================================================================

/// Identity of an order.
///
/// Derives `Ord` over (subaccount owner, subaccount number, client id,
/// order flags, clob pair id), the canonical sort order for order ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId {
    /// Subaccount that owns the order.
    pub subaccount_id: SubaccountId,

    /// Client-chosen identifier, unique per subaccount.
    pub client_id: u32,

    /// Order class flag. One of the `ORDER_FLAGS_*` constants.
    pub order_flags: u32,

    /// Market the order targets.
    pub clob_pair_id: u32,
}

/// Canonical SSZ form of an `OrderId`.
#[derive(Debug, Default, SimpleSerialize)]
pub(crate) struct OrderIdCanonical {
    pub subaccount_id: SubaccountIdCanonical,
    pub client_id: u32,
    pub order_flags: u32,
    pub clob_pair_id: u32,
}

impl OrderId {
    /// Create a new order id.
    pub fn new(subaccount_id: SubaccountId, client_id: u32, order_flags: u32, clob_pair_id: u32) -> Self {
        Self {
            subaccount_id,
            client_id,
            order_flags,
            clob_pair_id,
        }
    }

    /// Whether this is a short-term order.
    pub fn is_short_term_order(&self) -> bool {
        self.order_flags == ORDER_FLAGS_SHORT_TERM
    }

    /// Whether this is a long-term order.
    pub fn is_long_term_order(&self) -> bool {
        self.order_flags == ORDER_FLAGS_LONG_TERM
    }

    /// Whether this is a conditional order.
    pub fn is_conditional_order(&self) -> bool {
        self.order_flags == ORDER_FLAGS_CONDITIONAL
    }

    /// Whether this is a TWAP parent order.
    pub fn is_twap_order(&self) -> bool {
        self.order_flags == ORDER_FLAGS_TWAP
    }

    /// Whether this is a TWAP suborder.
    pub fn is_twap_suborder(&self) -> bool {
        self.order_flags == ORDER_FLAGS_TWAP_SUBORDER
    }

    /// Whether the order persists across blocks (any non-short-term class).
    pub fn is_stateful_order(&self) -> bool {
        self.is_long_term_order()
            || self.is_conditional_order()
            || self.is_twap_order()
            || self.is_twap_suborder()
    }

    /// Validate the order id: subaccount valid, flags recognized.
    pub fn validate(&self) -> Result<(), ClobError> {
        self.subaccount_id.validate()?;
        if !self.is_short_term_order() && !self.is_stateful_order() {
            return Err(ClobError::InvalidOrderFlags {
                flags: self.order_flags,
            });
        }
        Ok(())
    }

    /// Precondition accessor: the caller requires a stateful order.
    ///
    /// # Panics
    ///
    /// Panics if the order is not stateful.
    pub fn must_be_stateful_order(&self) {
        if !self.is_stateful_order() {
            panic!("must_be_stateful_order: order {} is not a stateful order", self);
        }
    }

    /// Precondition accessor: the caller requires a short-term order.
    ///
    /// # Panics
    ///
    /// Panics if the order is not short-term.
    pub fn must_be_short_term_order(&self) {
        if !self.is_short_term_order() {
            panic!("must_be_short_term_order: order {} is not a short-term order", self);
        }
    }

    /// Build the canonical SSZ form.
    pub(crate) fn must_canonical(&self) -> OrderIdCanonical {
        OrderIdCanonical {
            subaccount_id: self.subaccount_id.must_canonical(),
            client_id: self.client_id,
            order_flags: self.order_flags,
            clob_pair_id: self.clob_pair_id,
        }
    }

    /// Canonical bytes of the order id.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails, which indicates an unvalidated id.
    pub(crate) fn must_canonical_bytes(&self) -> Vec<u8> {
        ssz_rs::serialize(&self.must_canonical())
            .unwrap_or_else(|e| panic!("must_canonical_bytes: failed to encode order id {}: {:?}", self, e))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}/{}@{}",
            self.subaccount_id, self.client_id, self.order_flags, self.clob_pair_id
        )
    }
}

/// Sort order ids into the canonical order.
///
/// # Panics
///
/// Panics if the input contains duplicate ids; sorting a multiset of order
/// identities is a programmer error.
pub fn sort_order_ids(order_ids: &mut Vec<OrderId>) {
    order_ids.sort();
    for pair in order_ids.windows(2) {
        if pair[0] == pair[1] {
            panic!("sort_order_ids: duplicate order id {}", pair[0]);
        }
    }
}

/// Sort orders by their ids into the canonical order.
///
/// # Panics
///
/// Panics if two orders share an id.
pub fn sort_orders(orders: &mut Vec<Order>) {
    orders.sort_by(|a, b| a.order_id.cmp(&b.order_id));
    for pair in orders.windows(2) {
        if pair[0].order_id == pair[1].order_id {
            panic!("sort_orders: duplicate order id {}", pair[0].order_id);
        }
    }
}

// ============================================================================
// OrderHash
// ============================================================================

/// 32-byte canonical hash of an order (or of a liquidation's identity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderHash(pub [u8; 32]);

impl OrderHash {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for OrderHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ============================================================================
// Order
// ============================================================================

/// A limit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Identity of the order.
    pub order_id: OrderId,

    /// Buy or sell.
    pub side: Side,

    /// Size in base quantums.
    pub quantums: u64,

    /// Limit price in subticks.
    pub subticks: u64,

    /// Expiration; the variant must agree with the order class.
    pub good_til: OrderExpiration,

    /// Execution constraint.
    pub time_in_force: TimeInForce,

    /// Whether the order may only reduce an existing position.
    pub reduce_only: bool,

    /// Trigger condition; `Unspecified` for non-conditional orders.
    pub condition_type: ConditionType,

    /// Trigger price in subticks; zero for non-conditional orders.
    pub conditional_order_trigger_subticks: u64,
}

/// Canonical SSZ form of an `Order`.
///
/// Enum-valued fields are stored as raw integers so the struct stays
/// SSZ-compatible; this is the single byte form hashing and equality use.
#[derive(Debug, Default, SimpleSerialize)]
pub(crate) struct OrderCanonical {
    pub order_id: OrderIdCanonical,
    pub side_raw: u8,
    pub quantums: u64,
    pub subticks: u64,
    pub good_til_kind: u8,
    pub good_til_value: u32,
    pub time_in_force_raw: u8,
    pub reduce_only: bool,
    pub condition_type_raw: u8,
    pub conditional_order_trigger_subticks: u64,
}

impl Order {
    /// Create a new order with no execution constraints.
    pub fn new(
        order_id: OrderId,
        side: Side,
        quantums: u64,
        subticks: u64,
        good_til: OrderExpiration,
    ) -> Self {
        Self {
            order_id,
            side,
            quantums,
            subticks,
            good_til,
            time_in_force: TimeInForce::Unspecified,
            reduce_only: false,
            condition_type: ConditionType::Unspecified,
            conditional_order_trigger_subticks: 0,
        }
    }

    /// Set the time in force.
    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    /// Mark the order reduce-only.
    pub fn with_reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    /// Attach a trigger condition.
    pub fn with_condition(mut self, condition_type: ConditionType, trigger_subticks: u64) -> Self {
        self.condition_type = condition_type;
        self.conditional_order_trigger_subticks = trigger_subticks;
        self
    }

    /// Whether this is a buy order.
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    /// Whether any unmatched remainder must be cancelled rather than rest.
    pub fn requires_immediate_execution(&self) -> bool {
        matches!(self.time_in_force, TimeInForce::Ioc | TimeInForce::FillOrKill)
    }

    /// Precondition accessor for the short-term expiration height.
    ///
    /// # Panics
    ///
    /// Panics if the order expires by block time.
    pub fn must_get_good_til_block(&self) -> u32 {
        match self.good_til {
            OrderExpiration::GoodTilBlock(block) => block,
            OrderExpiration::GoodTilBlockTime(_) => panic!(
                "must_get_good_til_block: order {} expires by block time",
                self.order_id
            ),
        }
    }

    /// Precondition accessor for the stateful expiration time.
    ///
    /// # Panics
    ///
    /// Panics if the order expires by block height.
    pub fn must_get_good_til_block_time(&self) -> u32 {
        match self.good_til {
            OrderExpiration::GoodTilBlockTime(time) => time,
            OrderExpiration::GoodTilBlock(_) => panic!(
                "must_get_good_til_block_time: order {} expires by block height",
                self.order_id
            ),
        }
    }

    /// Structural validation of the order.
    pub fn validate(&self) -> Result<(), ClobError> {
        self.order_id.validate()?;

        if self.quantums == 0 {
            return Err(ClobError::InvalidOrderQuantums {
                order_id: self.order_id.clone(),
            });
        }
        if self.subticks == 0 {
            return Err(ClobError::InvalidOrderSubticks {
                order_id: self.order_id.clone(),
            });
        }

        // The expiration kind is fixed by the order class.
        let expiration_matches = match self.good_til {
            OrderExpiration::GoodTilBlock(_) => self.order_id.is_short_term_order(),
            OrderExpiration::GoodTilBlockTime(_) => self.order_id.is_stateful_order(),
        };
        if !expiration_matches {
            return Err(ClobError::InvalidExpirationKind {
                order_id: self.order_id.clone(),
            });
        }

        let is_conditional = self.order_id.is_conditional_order();
        let has_condition = self.condition_type != ConditionType::Unspecified
            && self.conditional_order_trigger_subticks > 0;
        let has_any_condition_field = self.condition_type != ConditionType::Unspecified
            || self.conditional_order_trigger_subticks > 0;
        if is_conditional && !has_condition {
            return Err(ClobError::InvalidConditionalOrder {
                order_id: self.order_id.clone(),
            });
        }
        if !is_conditional && has_any_condition_field {
            return Err(ClobError::InvalidConditionalOrder {
                order_id: self.order_id.clone(),
            });
        }

        Ok(())
    }

    /// Build the canonical SSZ form.
    pub(crate) fn must_canonical(&self) -> OrderCanonical {
        OrderCanonical {
            order_id: self.order_id.must_canonical(),
            side_raw: self.side.to_u8(),
            quantums: self.quantums,
            subticks: self.subticks,
            good_til_kind: self.good_til.kind_raw(),
            good_til_value: self.good_til.value(),
            time_in_force_raw: self.time_in_force.to_u8(),
            reduce_only: self.reduce_only,
            condition_type_raw: self.condition_type.to_u8(),
            conditional_order_trigger_subticks: self.conditional_order_trigger_subticks,
        }
    }

    /// Canonical bytes of the order.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails, which indicates an unvalidated order.
    pub fn must_canonical_bytes(&self) -> Vec<u8> {
        ssz_rs::serialize(&self.must_canonical())
            .unwrap_or_else(|e| panic!("must_canonical_bytes: failed to encode order {}: {:?}", self.order_id, e))
    }

    /// The 32-byte canonical hash of the order.
    pub fn order_hash(&self) -> OrderHash {
        OrderHash(sha256(&self.must_canonical_bytes()))
    }

    /// Representation-independent equality: canonical encodings compared
    /// byte for byte.
    pub fn is_equal(&self, other: &Order) -> bool {
        self.must_canonical_bytes() == other.must_canonical_bytes()
    }

    /// Total replacement order over orders sharing one identity.
    ///
    /// Expirations compare ascending; ties break by byte order of the two
    /// canonical hashes. `Greater` means `self` is the higher-priority
    /// replacement.
    ///
    /// # Panics
    ///
    /// Panics if the two orders do not share an identity, or if their
    /// expiration kinds differ (an identity fixes its order class and
    /// therefore its expiration kind).
    pub fn must_cmp_replacement_order(&self, other: &Order) -> Ordering {
        if self.order_id != other.order_id {
            panic!(
                "must_cmp_replacement_order: orders {} and {} do not share an identity",
                self.order_id, other.order_id
            );
        }

        let by_expiration = match (self.good_til, other.good_til) {
            (OrderExpiration::GoodTilBlock(a), OrderExpiration::GoodTilBlock(b)) => a.cmp(&b),
            (OrderExpiration::GoodTilBlockTime(a), OrderExpiration::GoodTilBlockTime(b)) => a.cmp(&b),
            _ => panic!(
                "must_cmp_replacement_order: order {} compared across expiration kinds",
                self.order_id
            ),
        };

        match by_expiration {
            Ordering::Equal => self.order_hash().0.cmp(&other.order_hash().0),
            ordering => ordering,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn short_term_id(owner: &str, client_id: u32) -> OrderId {
        OrderId::new(SubaccountId::new(owner, 0), client_id, ORDER_FLAGS_SHORT_TERM, 0)
    }

    fn long_term_id(owner: &str, client_id: u32) -> OrderId {
        OrderId::new(SubaccountId::new(owner, 0), client_id, ORDER_FLAGS_LONG_TERM, 0)
    }

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::Buy.to_u8(), 0);
        assert_eq!(Side::Sell.to_u8(), 1);
        assert_eq!(Side::from_u8(0), Some(Side::Buy));
        assert_eq!(Side::from_u8(1), Some(Side::Sell));
        assert_eq!(Side::from_u8(2), None);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
    }

    #[test]
    fn test_order_flag_predicates() {
        assert!(short_term_id("alice", 0).is_short_term_order());
        assert!(!short_term_id("alice", 0).is_stateful_order());

        let conditional = OrderId::new(SubaccountId::new("a", 0), 0, ORDER_FLAGS_CONDITIONAL, 0);
        assert!(conditional.is_conditional_order());
        assert!(conditional.is_stateful_order());

        assert!(long_term_id("a", 0).is_long_term_order());
        assert!(long_term_id("a", 0).is_stateful_order());

        let twap = OrderId::new(SubaccountId::new("a", 0), 0, ORDER_FLAGS_TWAP, 0);
        assert!(twap.is_twap_order() && twap.is_stateful_order());

        let suborder = OrderId::new(SubaccountId::new("a", 0), 0, ORDER_FLAGS_TWAP_SUBORDER, 0);
        assert!(suborder.is_twap_suborder() && suborder.is_stateful_order());
    }

    #[test]
    fn test_order_id_validate_rejects_unknown_flags() {
        let id = OrderId::new(SubaccountId::new("alice", 0), 0, 3, 0);
        assert!(matches!(
            id.validate(),
            Err(ClobError::InvalidOrderFlags { flags: 3 })
        ));
    }

    #[test]
    #[should_panic(expected = "not a stateful order")]
    fn test_must_be_stateful_panics_for_short_term() {
        short_term_id("alice", 0).must_be_stateful_order();
    }

    #[test]
    fn test_sort_order_ids() {
        let mut ids = vec![
            long_term_id("bob", 1),
            short_term_id("alice", 2),
            short_term_id("alice", 1),
        ];
        sort_order_ids(&mut ids);

        assert_eq!(ids[0], short_term_id("alice", 1));
        assert_eq!(ids[1], short_term_id("alice", 2));
        assert_eq!(ids[2], long_term_id("bob", 1));
    }

    #[test]
    #[should_panic(expected = "duplicate order id")]
    fn test_sort_order_ids_duplicate_panics() {
        let mut ids = vec![short_term_id("alice", 1), short_term_id("alice", 1)];
        sort_order_ids(&mut ids);
    }

    #[test]
    fn test_order_validate() {
        let order = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(15),
        );
        assert!(order.validate().is_ok());

        // Zero quantums.
        let mut bad = order.clone();
        bad.quantums = 0;
        assert!(matches!(bad.validate(), Err(ClobError::InvalidOrderQuantums { .. })));

        // Zero subticks.
        let mut bad = order.clone();
        bad.subticks = 0;
        assert!(matches!(bad.validate(), Err(ClobError::InvalidOrderSubticks { .. })));

        // Short-term order with a block-time expiration.
        let mut bad = order.clone();
        bad.good_til = OrderExpiration::GoodTilBlockTime(100);
        assert!(matches!(bad.validate(), Err(ClobError::InvalidExpirationKind { .. })));

        // Stateful order with a block-height expiration.
        let bad = Order::new(
            long_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(15),
        );
        assert!(matches!(bad.validate(), Err(ClobError::InvalidExpirationKind { .. })));
    }

    #[test]
    fn test_conditional_order_validation() {
        let conditional_id = OrderId::new(SubaccountId::new("a", 0), 0, ORDER_FLAGS_CONDITIONAL, 0);

        // Conditional order without condition fields.
        let bad = Order::new(
            conditional_id.clone(),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlockTime(100),
        );
        assert!(matches!(bad.validate(), Err(ClobError::InvalidConditionalOrder { .. })));

        // Complete conditional order.
        let good = bad.clone().with_condition(ConditionType::StopLoss, 12);
        assert!(good.validate().is_ok());

        // Non-conditional order carrying a trigger.
        let bad = Order::new(
            short_term_id("a", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(15),
        )
        .with_condition(ConditionType::TakeProfit, 12);
        assert!(matches!(bad.validate(), Err(ClobError::InvalidConditionalOrder { .. })));
    }

    #[test]
    fn test_canonical_hash_deterministic() {
        let order = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(15),
        );

        assert_eq!(order.order_hash(), order.order_hash());
        assert_eq!(order.must_canonical_bytes(), order.must_canonical_bytes());
    }

    #[test]
    fn test_is_equal_ignores_representation() {
        // Two independently constructed expiration values must compare equal
        // through the canonical encoding.
        let a = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );
        let b = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );

        assert!(a.is_equal(&b));
        assert_eq!(a.order_hash(), b.order_hash());
    }

    #[test]
    fn test_hash_differs_on_any_field() {
        let base = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );

        let mut other = base.clone();
        other.quantums = 101;
        assert_ne!(base.order_hash(), other.order_hash());

        let other = base.clone().with_time_in_force(TimeInForce::Ioc);
        assert_ne!(base.order_hash(), other.order_hash());
    }

    #[test]
    fn test_replacement_ordering() {
        let earlier = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );
        let later = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(20),
        );

        assert_eq!(later.must_cmp_replacement_order(&earlier), Ordering::Greater);
        assert_eq!(earlier.must_cmp_replacement_order(&later), Ordering::Less);
    }

    #[test]
    fn test_replacement_tie_breaks_by_hash() {
        let a = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );
        let mut b = a.clone();
        b.quantums = 200;

        let expected = a.order_hash().0.cmp(&b.order_hash().0);
        assert_eq!(a.must_cmp_replacement_order(&b), expected);
        assert_eq!(b.must_cmp_replacement_order(&a), expected.reverse());

        // Identical orders are equal under the replacement order.
        assert_eq!(a.must_cmp_replacement_order(&a.clone()), Ordering::Equal);
    }

    #[test]
    #[should_panic(expected = "do not share an identity")]
    fn test_replacement_requires_same_identity() {
        let a = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );
        let b = Order::new(
            short_term_id("bob", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );
        let _ = a.must_cmp_replacement_order(&b);
    }

    #[test]
    #[should_panic(expected = "expires by block time")]
    fn test_must_get_good_til_block_panics() {
        let order = Order::new(
            long_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlockTime(100),
        );
        let _ = order.must_get_good_til_block();
    }

    #[test]
    fn test_requires_immediate_execution() {
        let order = Order::new(
            short_term_id("alice", 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        );
        assert!(!order.requires_immediate_execution());
        assert!(order
            .clone()
            .with_time_in_force(TimeInForce::Ioc)
            .requires_immediate_execution());
        assert!(order
            .clone()
            .with_time_in_force(TimeInForce::FillOrKill)
            .requires_immediate_execution());
        assert!(!order
            .with_time_in_force(TimeInForce::PostOnly)
            .requires_immediate_execution());
    }
}
