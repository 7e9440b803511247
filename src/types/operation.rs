//! Block operations: placements, cancellations, matches, and removals.
//!
//! `InternalOperation` is the node-local form of one entry in a block's
//! operations queue. `OperationRaw` is the wire form actually proposed to
//! other validators: short-term placements travel as their original signed
//! transaction bytes, and pre-existing stateful placements never leave the
//! node at all (peers already know those orders from prior blocks).
//!
//! Every operation has a canonical hash: SHA-256 over a one-byte variant
//! tag followed by the variant's canonical SSZ payload. The hash is what
//! the proposal sequencer keys its nonce assignments by.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::error::ClobError;
use crate::types::order::{Order, OrderExpiration, OrderId, OrderIdCanonical};
use crate::types::subaccount::{SubaccountId, SubaccountIdCanonical};

// ============================================================================
// Operation hash
// ============================================================================

/// 32-byte canonical hash of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationHash(pub [u8; 32]);

impl std::fmt::Display for OperationHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// Domain tags for operation hashing. One byte per variant, fixed forever.
const TAG_ORDER_PLACEMENT: u8 = 0;
const TAG_PREEXISTING_STATEFUL_PLACEMENT: u8 = 1;
const TAG_ORDER_CANCELLATION: u8 = 2;
const TAG_MATCH: u8 = 3;
const TAG_ORDER_REMOVAL: u8 = 4;

const MATCH_TAG_ORDERS: u8 = 0;
const MATCH_TAG_LIQUIDATION: u8 = 1;
const MATCH_TAG_DELEVERAGING: u8 = 2;

fn must_ssz<T: ssz_rs::SimpleSerialize>(value: &T, what: &str) -> Vec<u8> {
    ssz_rs::serialize(value).unwrap_or_else(|e| panic!("operation hash: failed to encode {}: {:?}", what, e))
}

// ============================================================================
// Fills
// ============================================================================

/// One maker order's contribution to a match, by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerFill {
    /// Matched amount in base quantums.
    pub fill_amount: u64,

    /// Identity of the maker order.
    pub maker_order_id: OrderId,
}

/// Canonical SSZ form of a `MakerFill`.
#[derive(Debug, Default, SimpleSerialize)]
struct MakerFillCanonical {
    fill_amount: u64,
    maker_order_id: OrderIdCanonical,
}

impl MakerFill {
    fn must_canonical(&self) -> MakerFillCanonical {
        MakerFillCanonical {
            fill_amount: self.fill_amount,
            maker_order_id: self.maker_order_id.must_canonical(),
        }
    }
}

/// A maker fill paired with the full maker order, used while the proposer
/// still holds the order; the wire form keeps only the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerFillWithOrder {
    /// The full maker order.
    pub order: Order,

    /// Matched amount in base quantums.
    pub fill_amount: u64,
}

impl MakerFillWithOrder {
    /// Project down to the identity-only wire fill.
    pub fn to_maker_fill(&self) -> MakerFill {
        MakerFill {
            fill_amount: self.fill_amount,
            maker_order_id: self.order.order_id.clone(),
        }
    }
}

/// Project a slice of fills-with-orders down to wire fills.
pub fn maker_fills_with_orders_to_maker_fills(fills: &[MakerFillWithOrder]) -> Vec<MakerFill> {
    fills.iter().map(MakerFillWithOrder::to_maker_fill).collect()
}

/// One offsetting subaccount's contribution to a deleveraging match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleveragingFill {
    /// Subaccount whose opposing position absorbs part of the liquidated
    /// position.
    pub offsetting_subaccount_id: SubaccountId,

    /// Offset amount in base quantums.
    pub fill_amount: u64,
}

/// Canonical SSZ form of a `DeleveragingFill`.
#[derive(Debug, Default, SimpleSerialize)]
struct DeleveragingFillCanonical {
    offsetting_subaccount_id: SubaccountIdCanonical,
    fill_amount: u64,
}

// ============================================================================
// Matches
// ============================================================================

/// A match between a regular taker order and one or more maker orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOrders {
    /// Identity of the taker order.
    pub taker_order_id: OrderId,

    /// Canonical hash of the taker order as matched, carried on the wire so
    /// validators can pin the exact taker revision. Must be 32 bytes.
    pub taker_order_hash: Vec<u8>,

    /// Maker fills in matching order.
    pub fills: Vec<MakerFill>,
}

/// A liquidation taker matched against one or more maker orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPerpetualLiquidation {
    /// The subaccount being liquidated.
    pub liquidated: SubaccountId,

    /// Market the liquidation traded on.
    pub clob_pair_id: u32,

    /// Perpetual whose position is being closed.
    pub perpetual_id: u32,

    /// Total liquidated size in base quantums.
    pub total_size: u64,

    /// Whether the liquidation bought.
    pub is_buy: bool,

    /// Maker fills in matching order.
    pub fills: Vec<MakerFill>,
}

impl MatchPerpetualLiquidation {
    /// Stateless validation: nonzero size, nonzero validated fills, and the
    /// fill sum bounded by the total size.
    pub fn validate(&self) -> Result<(), ClobError> {
        self.liquidated.validate()?;

        if self.total_size == 0 {
            return Err(ClobError::ZeroLiquidationSize);
        }

        let mut fill_sum: u128 = 0;
        for fill in &self.fills {
            if fill.fill_amount == 0 {
                return Err(ClobError::ZeroFillAmount);
            }
            fill.maker_order_id.validate()?;
            fill_sum += u128::from(fill.fill_amount);
        }

        if fill_sum > u128::from(self.total_size) {
            return Err(ClobError::LiquidationFillsExceedTotalSize {
                total_size: self.total_size,
                fill_sum,
            });
        }

        Ok(())
    }
}

/// Forced offsetting of a liquidated position against other subaccounts'
/// positions when the book could not absorb the liquidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPerpetualDeleveraging {
    /// The subaccount being deleveraged.
    pub liquidated: SubaccountId,

    /// Perpetual whose position is being offset.
    pub perpetual_id: u32,

    /// Offsetting fills.
    pub fills: Vec<DeleveragingFill>,
}

impl MatchPerpetualDeleveraging {
    /// Stateless validation of the deleveraging match.
    ///
    /// Requires a valid liquidated subaccount, at least one fill, and each
    /// fill's offsetting subaccount to be valid, distinct from the
    /// liquidated subaccount, distinct from every other fill, and nonzero
    /// in amount.
    pub fn validate(&self) -> Result<(), ClobError> {
        self.liquidated.validate()?;

        if self.fills.is_empty() {
            return Err(ClobError::DeleveragingNoFills);
        }

        let mut seen = std::collections::HashSet::new();
        for fill in &self.fills {
            fill.offsetting_subaccount_id.validate()?;

            if fill.offsetting_subaccount_id == self.liquidated {
                return Err(ClobError::DeleveragingSelfFill {
                    subaccount_id: fill.offsetting_subaccount_id.clone(),
                });
            }
            if !seen.insert(fill.offsetting_subaccount_id.clone()) {
                return Err(ClobError::DuplicateDeleveragingFill {
                    subaccount_id: fill.offsetting_subaccount_id.clone(),
                });
            }
            if fill.fill_amount == 0 {
                return Err(ClobError::ZeroFillAmount);
            }
        }

        Ok(())
    }
}

/// A proposed match, in one of its three forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClobMatch {
    /// Regular taker against makers.
    MatchOrders(MatchOrders),
    /// Liquidation taker against makers.
    MatchPerpetualLiquidation(MatchPerpetualLiquidation),
    /// Deleveraging against offsetting subaccounts.
    MatchPerpetualDeleveraging(MatchPerpetualDeleveraging),
}

// Fixed-field canonical forms for match hashing; fills are hashed as a
// concatenated sequence after the header.
#[derive(Debug, Default, SimpleSerialize)]
struct MatchOrdersHeaderCanonical {
    taker_order_id: OrderIdCanonical,
}

#[derive(Debug, Default, SimpleSerialize)]
struct LiquidationHeaderCanonical {
    liquidated: SubaccountIdCanonical,
    clob_pair_id: u32,
    perpetual_id: u32,
    total_size: u64,
    is_buy: bool,
}

#[derive(Debug, Default, SimpleSerialize)]
struct DeleveragingHeaderCanonical {
    liquidated: SubaccountIdCanonical,
    perpetual_id: u32,
}

impl ClobMatch {
    fn hash_into(&self, hasher: &mut Sha256) {
        match self {
            ClobMatch::MatchOrders(m) => {
                hasher.update([MATCH_TAG_ORDERS]);
                let header = MatchOrdersHeaderCanonical {
                    taker_order_id: m.taker_order_id.must_canonical(),
                };
                hasher.update(must_ssz(&header, "match orders header"));
                hasher.update(&m.taker_order_hash);
                for fill in &m.fills {
                    hasher.update(must_ssz(&fill.must_canonical(), "maker fill"));
                }
            }
            ClobMatch::MatchPerpetualLiquidation(m) => {
                hasher.update([MATCH_TAG_LIQUIDATION]);
                let header = LiquidationHeaderCanonical {
                    liquidated: m.liquidated.must_canonical(),
                    clob_pair_id: m.clob_pair_id,
                    perpetual_id: m.perpetual_id,
                    total_size: m.total_size,
                    is_buy: m.is_buy,
                };
                hasher.update(must_ssz(&header, "liquidation match header"));
                for fill in &m.fills {
                    hasher.update(must_ssz(&fill.must_canonical(), "maker fill"));
                }
            }
            ClobMatch::MatchPerpetualDeleveraging(m) => {
                hasher.update([MATCH_TAG_DELEVERAGING]);
                let header = DeleveragingHeaderCanonical {
                    liquidated: m.liquidated.must_canonical(),
                    perpetual_id: m.perpetual_id,
                };
                hasher.update(must_ssz(&header, "deleveraging match header"));
                for fill in &m.fills {
                    let canonical = DeleveragingFillCanonical {
                        offsetting_subaccount_id: fill.offsetting_subaccount_id.must_canonical(),
                        fill_amount: fill.fill_amount,
                    };
                    hasher.update(must_ssz(&canonical, "deleveraging fill"));
                }
            }
        }
    }
}

// ============================================================================
// Cancellations and removals
// ============================================================================

/// A user-submitted order cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrder {
    /// Identity of the order to cancel.
    pub order_id: OrderId,

    /// Expiration of the cancellation itself; the variant must agree with
    /// the order class, same as for placements.
    pub good_til: OrderExpiration,
}

#[derive(Debug, Default, SimpleSerialize)]
struct CancelOrderCanonical {
    order_id: OrderIdCanonical,
    good_til_kind: u8,
    good_til_value: u32,
}

impl CancelOrder {
    /// Structural validation of the cancellation.
    pub fn validate(&self) -> Result<(), ClobError> {
        self.order_id.validate()?;

        let expiration_matches = match self.good_til {
            OrderExpiration::GoodTilBlock(_) => self.order_id.is_short_term_order(),
            OrderExpiration::GoodTilBlockTime(_) => self.order_id.is_stateful_order(),
        };
        if !expiration_matches {
            return Err(ClobError::InvalidCancellationExpirationKind {
                order_id: self.order_id.clone(),
            });
        }
        Ok(())
    }

    fn must_canonical(&self) -> CancelOrderCanonical {
        CancelOrderCanonical {
            order_id: self.order_id.must_canonical(),
            good_til_kind: self.good_til.kind_raw(),
            good_til_value: self.good_til.value(),
        }
    }
}

/// Why a stateful order was removed from the book by the proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Never valid on the wire.
    Unspecified,
    /// The order's subaccount became undercollateralized.
    Undercollateralized,
    /// The order would have self-traded.
    InvalidSelfTrade,
    /// A post-only order would have crossed a maker order.
    PostOnlyWouldCrossMakerOrder,
    /// A reduce-only order would have increased or opened a position.
    InvalidReduceOnly,
    /// A triggered conditional IOC order would have rested.
    ConditionalIocWouldRestOnBook,
    /// A triggered conditional FOK order could not be fully filled.
    ConditionalFokCouldNotBeFullyFilled,
    /// The order was fully filled.
    FullyFilled,
    /// The fill would violate isolated-subaccount constraints.
    ViolatesIsolatedSubaccountConstraints,
    /// The market entered final settlement.
    FinalSettlement,
}

impl RemovalReason {
    /// Convert to u8 for canonical encoding.
    pub fn to_u8(self) -> u8 {
        match self {
            RemovalReason::Unspecified => 0,
            RemovalReason::Undercollateralized => 1,
            RemovalReason::InvalidSelfTrade => 2,
            RemovalReason::PostOnlyWouldCrossMakerOrder => 3,
            RemovalReason::InvalidReduceOnly => 4,
            RemovalReason::ConditionalIocWouldRestOnBook => 5,
            RemovalReason::ConditionalFokCouldNotBeFullyFilled => 6,
            RemovalReason::FullyFilled => 7,
            RemovalReason::ViolatesIsolatedSubaccountConstraints => 8,
            RemovalReason::FinalSettlement => 9,
        }
    }
}

/// Removal of a stateful order from the book, with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRemoval {
    /// Identity of the removed order.
    pub order_id: OrderId,

    /// Why the order was removed.
    pub reason: RemovalReason,
}

#[derive(Debug, Default, SimpleSerialize)]
struct OrderRemovalCanonical {
    order_id: OrderIdCanonical,
    reason_raw: u8,
}

impl OrderRemoval {
    /// Structural validation: valid stateful identity with a specified
    /// reason. Short-term orders are never removed this way; they expire.
    pub fn validate(&self) -> Result<(), ClobError> {
        self.order_id.validate()?;

        if self.reason == RemovalReason::Unspecified {
            return Err(ClobError::UnspecifiedRemovalReason);
        }
        if self.order_id.is_short_term_order() {
            return Err(ClobError::ShortTermOrderRemoval {
                order_id: self.order_id.clone(),
            });
        }
        Ok(())
    }

    fn must_canonical(&self) -> OrderRemovalCanonical {
        OrderRemovalCanonical {
            order_id: self.order_id.must_canonical(),
            reason_raw: self.reason.to_u8(),
        }
    }
}

// ============================================================================
// InternalOperation
// ============================================================================

/// One node-local operation in a block's operations queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalOperation {
    /// Placement of a short-term order submitted this block.
    ShortTermOrderPlacement(Order),
    /// Reference to a stateful order placed in a prior block. Never
    /// transmitted externally.
    PreexistingStatefulOrderPlacement(OrderId),
    /// A stateful order cancellation.
    OrderCancellation(CancelOrder),
    /// A match.
    Match(ClobMatch),
    /// A stateful order removal.
    OrderRemoval(OrderRemoval),
}

impl InternalOperation {
    /// Canonical hash of the operation.
    ///
    /// # Panics
    ///
    /// Panics if a contained value fails to encode, which indicates an
    /// unvalidated operation.
    pub fn operation_hash(&self) -> OperationHash {
        let mut hasher = Sha256::new();
        match self {
            InternalOperation::ShortTermOrderPlacement(order) => {
                hasher.update([TAG_ORDER_PLACEMENT]);
                hasher.update(order.must_canonical_bytes());
            }
            InternalOperation::PreexistingStatefulOrderPlacement(order_id) => {
                hasher.update([TAG_PREEXISTING_STATEFUL_PLACEMENT]);
                hasher.update(order_id.must_canonical_bytes());
            }
            InternalOperation::OrderCancellation(cancel) => {
                hasher.update([TAG_ORDER_CANCELLATION]);
                hasher.update(must_ssz(&cancel.must_canonical(), "order cancellation"));
            }
            InternalOperation::Match(clob_match) => {
                hasher.update([TAG_MATCH]);
                clob_match.hash_into(&mut hasher);
            }
            InternalOperation::OrderRemoval(removal) => {
                hasher.update([TAG_ORDER_REMOVAL]);
                hasher.update(must_ssz(&removal.must_canonical(), "order removal"));
            }
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        OperationHash(out)
    }

    /// Whether this operation is a match.
    pub fn is_match(&self) -> bool {
        matches!(self, InternalOperation::Match(_))
    }
}

/// Hash of the order-placement operation that would place `order`.
///
/// Used to nonce-key placements without constructing a throwaway
/// operation. Full-order placements and pre-existing references hash
/// differently by construction: the former covers the whole order, the
/// latter only its identity, under distinct domain tags.
pub fn order_placement_operation_hash(order: &Order, is_preexisting_stateful_order: bool) -> OperationHash {
    if is_preexisting_stateful_order {
        order.order_id.must_be_stateful_order();
        InternalOperation::PreexistingStatefulOrderPlacement(order.order_id.clone()).operation_hash()
    } else {
        InternalOperation::ShortTermOrderPlacement(order.clone()).operation_hash()
    }
}

// ============================================================================
// Wire form
// ============================================================================

/// The externally proposed form of one operation.
///
/// Short-term placements travel as the submitter's original transaction
/// bytes so every validator can verify the original signature; pre-existing
/// stateful placements are never transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRaw {
    /// Raw transaction bytes of a short-term order placement.
    ShortTermOrderPlacement(Vec<u8>),
    /// A stateful order cancellation.
    OrderCancellation(CancelOrder),
    /// A match.
    Match(ClobMatch),
    /// A stateful order removal.
    OrderRemoval(OrderRemoval),
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::order::{OrderExpiration, Side, ORDER_FLAGS_LONG_TERM, ORDER_FLAGS_SHORT_TERM};

    fn subaccount(owner: &str) -> SubaccountId {
        SubaccountId::new(owner, 0)
    }

    fn short_term_order(owner: &str, client_id: u32) -> Order {
        Order::new(
            OrderId::new(subaccount(owner), client_id, ORDER_FLAGS_SHORT_TERM, 0),
            Side::Buy,
            100,
            10,
            OrderExpiration::GoodTilBlock(10),
        )
    }

    fn long_term_order_id(owner: &str, client_id: u32) -> OrderId {
        OrderId::new(subaccount(owner), client_id, ORDER_FLAGS_LONG_TERM, 0)
    }

    #[test]
    fn test_operation_hashes_distinct_by_variant() {
        let order = short_term_order("alice", 0);

        let placement = InternalOperation::ShortTermOrderPlacement(order.clone());
        // A pre-existing reference hashes only the identity, under its own
        // domain tag, so the two can never collide.
        let preexisting = InternalOperation::PreexistingStatefulOrderPlacement(order.order_id.clone());

        assert_ne!(placement.operation_hash(), preexisting.operation_hash());
        assert_eq!(placement.operation_hash(), placement.operation_hash());
    }

    #[test]
    fn test_placement_hash_covers_full_order() {
        let a = short_term_order("alice", 0);
        let mut b = a.clone();
        b.quantums += 1;

        assert_ne!(
            order_placement_operation_hash(&a, false),
            order_placement_operation_hash(&b, false),
        );
    }

    #[test]
    #[should_panic(expected = "not a stateful order")]
    fn test_preexisting_hash_requires_stateful() {
        let order = short_term_order("alice", 0);
        let _ = order_placement_operation_hash(&order, true);
    }

    #[test]
    fn test_cancel_order_validation() {
        // Short-term cancel with GTB: valid.
        let cancel = CancelOrder {
            order_id: short_term_order("alice", 0).order_id,
            good_til: OrderExpiration::GoodTilBlock(20),
        };
        assert!(cancel.validate().is_ok());

        // Short-term cancel with GTBT: invalid.
        let cancel = CancelOrder {
            order_id: short_term_order("alice", 0).order_id,
            good_til: OrderExpiration::GoodTilBlockTime(100),
        };
        assert!(matches!(
            cancel.validate(),
            Err(ClobError::InvalidCancellationExpirationKind { .. })
        ));

        // Stateful cancel with GTBT: valid.
        let cancel = CancelOrder {
            order_id: long_term_order_id("alice", 0),
            good_til: OrderExpiration::GoodTilBlockTime(100),
        };
        assert!(cancel.validate().is_ok());
    }

    #[test]
    fn test_order_removal_validation() {
        let removal = OrderRemoval {
            order_id: long_term_order_id("alice", 0),
            reason: RemovalReason::InvalidSelfTrade,
        };
        assert!(removal.validate().is_ok());

        let removal = OrderRemoval {
            order_id: long_term_order_id("alice", 0),
            reason: RemovalReason::Unspecified,
        };
        assert_eq!(removal.validate(), Err(ClobError::UnspecifiedRemovalReason));

        let removal = OrderRemoval {
            order_id: short_term_order("alice", 0).order_id,
            reason: RemovalReason::InvalidSelfTrade,
        };
        assert!(matches!(
            removal.validate(),
            Err(ClobError::ShortTermOrderRemoval { .. })
        ));
    }

    #[test]
    fn test_liquidation_match_validation() {
        let valid = MatchPerpetualLiquidation {
            liquidated: subaccount("carl"),
            clob_pair_id: 0,
            perpetual_id: 0,
            total_size: 100,
            is_buy: true,
            fills: vec![
                MakerFill {
                    fill_amount: 60,
                    maker_order_id: short_term_order("alice", 0).order_id,
                },
                MakerFill {
                    fill_amount: 40,
                    maker_order_id: short_term_order("bob", 0).order_id,
                },
            ],
        };
        assert!(valid.validate().is_ok());

        let mut zero_size = valid.clone();
        zero_size.total_size = 0;
        assert_eq!(zero_size.validate(), Err(ClobError::ZeroLiquidationSize));

        let mut zero_fill = valid.clone();
        zero_fill.fills[0].fill_amount = 0;
        assert_eq!(zero_fill.validate(), Err(ClobError::ZeroFillAmount));

        let mut oversized = valid.clone();
        oversized.fills[0].fill_amount = 100;
        assert!(matches!(
            oversized.validate(),
            Err(ClobError::LiquidationFillsExceedTotalSize {
                total_size: 100,
                fill_sum: 140,
            })
        ));
    }

    #[test]
    fn test_deleveraging_validation() {
        let valid = MatchPerpetualDeleveraging {
            liquidated: subaccount("carl"),
            perpetual_id: 0,
            fills: vec![
                DeleveragingFill {
                    offsetting_subaccount_id: subaccount("alice"),
                    fill_amount: 10,
                },
                DeleveragingFill {
                    offsetting_subaccount_id: subaccount("bob"),
                    fill_amount: 20,
                },
            ],
        };
        assert!(valid.validate().is_ok());

        // No fills.
        let empty = MatchPerpetualDeleveraging {
            fills: vec![],
            ..valid.clone()
        };
        assert_eq!(empty.validate(), Err(ClobError::DeleveragingNoFills));

        // Offsetting the liquidated subaccount against itself.
        let mut self_fill = valid.clone();
        self_fill.fills[0].offsetting_subaccount_id = subaccount("carl");
        assert!(matches!(
            self_fill.validate(),
            Err(ClobError::DeleveragingSelfFill { .. })
        ));

        // Duplicate offsetting subaccount.
        let mut duplicate = valid.clone();
        duplicate.fills[1].offsetting_subaccount_id = subaccount("alice");
        assert!(matches!(
            duplicate.validate(),
            Err(ClobError::DuplicateDeleveragingFill { .. })
        ));

        // Zero amount.
        let mut zero = valid.clone();
        zero.fills[1].fill_amount = 0;
        assert_eq!(zero.validate(), Err(ClobError::ZeroFillAmount));
    }

    #[test]
    fn test_match_hash_covers_fills() {
        let base = ClobMatch::MatchOrders(MatchOrders {
            taker_order_id: short_term_order("alice", 0).order_id,
            taker_order_hash: vec![0u8; 32],
            fills: vec![MakerFill {
                fill_amount: 5,
                maker_order_id: short_term_order("bob", 0).order_id,
            }],
        });

        let mut changed_fill = base.clone();
        if let ClobMatch::MatchOrders(m) = &mut changed_fill {
            m.fills[0].fill_amount = 6;
        }

        let a = InternalOperation::Match(base).operation_hash();
        let b = InternalOperation::Match(changed_fill).operation_hash();
        assert_ne!(a, b);
    }

    #[test]
    fn test_maker_fill_with_order_projection() {
        let order = short_term_order("bob", 3);
        let with_order = MakerFillWithOrder {
            order: order.clone(),
            fill_amount: 7,
        };

        let fills = maker_fills_with_orders_to_maker_fills(&[with_order]);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].fill_amount, 7);
        assert_eq!(fills[0].maker_order_id, order.order_id);
    }
}
