//! Stateless replay validation of a received operations queue.
//!
//! Every non-proposing validator runs this single forward pass over a
//! block's operations queue before replaying it against its own book. The
//! pass carries only its own running maps: which orders were placed
//! earlier in the queue and which pre-existing stateful orders were
//! referenced. It checks structure and sequencing — never collateral, and
//! never state outside the pass.

use std::collections::{HashMap, HashSet};

use crate::types::{
    ClobError, ClobMatch, InternalOperation, MakerFill, MatchOrders, MatchPerpetualLiquidation,
    Order, OrderId,
};

/// Per-pass running state for one operations queue.
#[derive(Debug, Default)]
struct ReplayPass {
    /// Orders placed earlier in this queue, latest replacement wins.
    orders_placed_in_block: HashMap<OrderId, Order>,

    /// Stateful orders referenced as pre-existing earlier in this queue.
    preexisting_stateful_orders: HashSet<OrderId>,
}

impl ReplayPass {
    fn is_known(&self, order_id: &OrderId) -> bool {
        self.orders_placed_in_block.contains_key(order_id)
            || self.preexisting_stateful_orders.contains(order_id)
    }
}

/// Validate a received operations queue in one forward pass.
///
/// Returns the first structural or sequencing violation; a queue that
/// passes is safe to replay (replay itself still performs the matching
/// and collateral work).
pub fn validate_operations_queue(operations: &[InternalOperation]) -> Result<(), ClobError> {
    let mut pass = ReplayPass::default();

    for operation in operations {
        match operation {
            InternalOperation::ShortTermOrderPlacement(order) => {
                validate_placement(&mut pass, order)?;
            }
            InternalOperation::PreexistingStatefulOrderPlacement(order_id) => {
                validate_preexisting_reference(&mut pass, order_id)?;
            }
            InternalOperation::OrderCancellation(cancel) => {
                cancel.validate()?;
                if cancel.order_id.is_short_term_order()
                    && !pass.orders_placed_in_block.contains_key(&cancel.order_id)
                {
                    return Err(ClobError::ShortTermCancellationUnknownOrder {
                        order_id: cancel.order_id.clone(),
                    });
                }
                // Cancellation supersedes any pending record for the identity.
                pass.orders_placed_in_block.remove(&cancel.order_id);
                pass.preexisting_stateful_orders.remove(&cancel.order_id);
            }
            InternalOperation::Match(clob_match) => match clob_match {
                ClobMatch::MatchOrders(match_orders) => {
                    validate_match_orders(&pass, match_orders)?;
                }
                ClobMatch::MatchPerpetualLiquidation(liquidation) => {
                    validate_match_liquidation(&pass, liquidation)?;
                }
                ClobMatch::MatchPerpetualDeleveraging(deleveraging) => {
                    deleveraging.validate()?;
                }
            },
            InternalOperation::OrderRemoval(removal) => {
                removal.validate()?;
            }
        }
    }

    Ok(())
}

fn validate_placement(pass: &mut ReplayPass, order: &Order) -> Result<(), ClobError> {
    order.validate()?;

    // A repeated identity within one queue must be a strictly
    // higher-priority replacement of the earlier placement.
    if let Some(existing) = pass.orders_placed_in_block.get(&order.order_id) {
        if order.must_cmp_replacement_order(existing) != std::cmp::Ordering::Greater {
            return Err(ClobError::InvalidReplacement {
                order_id: order.order_id.clone(),
            });
        }
    }

    pass.orders_placed_in_block
        .insert(order.order_id.clone(), order.clone());
    Ok(())
}

fn validate_preexisting_reference(pass: &mut ReplayPass, order_id: &OrderId) -> Result<(), ClobError> {
    order_id.validate()?;

    if !order_id.is_stateful_order() {
        return Err(ClobError::PreexistingOrderNotStateful {
            order_id: order_id.clone(),
        });
    }
    if !pass.preexisting_stateful_orders.insert(order_id.clone()) {
        return Err(ClobError::DuplicatePreexistingStatefulOrder {
            order_id: order_id.clone(),
        });
    }

    Ok(())
}

fn validate_maker_fills(pass: &ReplayPass, fills: &[MakerFill]) -> Result<(), ClobError> {
    let mut seen = HashSet::new();
    for fill in fills {
        if fill.fill_amount == 0 {
            return Err(ClobError::ZeroFillAmount);
        }
        fill.maker_order_id.validate()?;
        if !seen.insert(fill.maker_order_id.clone()) {
            return Err(ClobError::DuplicateMakerFill {
                order_id: fill.maker_order_id.clone(),
            });
        }
        if !pass.is_known(&fill.maker_order_id) {
            return Err(ClobError::UnknownMakerOrder {
                order_id: fill.maker_order_id.clone(),
            });
        }
    }
    Ok(())
}

fn validate_match_orders(pass: &ReplayPass, match_orders: &MatchOrders) -> Result<(), ClobError> {
    validate_maker_fills(pass, &match_orders.fills)?;

    if !pass.is_known(&match_orders.taker_order_id) {
        return Err(ClobError::UnknownTakerOrder {
            order_id: match_orders.taker_order_id.clone(),
        });
    }
    if match_orders.taker_order_hash.len() != 32 {
        return Err(ClobError::InvalidTakerOrderHashLength {
            len: match_orders.taker_order_hash.len(),
        });
    }

    Ok(())
}

fn validate_match_liquidation(
    pass: &ReplayPass,
    liquidation: &MatchPerpetualLiquidation,
) -> Result<(), ClobError> {
    // Size and fill-sum bounds first, then sequencing of the makers.
    liquidation.validate()?;
    validate_maker_fills(pass, &liquidation.fills)?;
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CancelOrder, DeleveragingFill, MatchPerpetualDeleveraging, OrderExpiration, OrderRemoval,
        RemovalReason, Side, SubaccountId, ORDER_FLAGS_LONG_TERM, ORDER_FLAGS_SHORT_TERM,
    };

    fn short_term(owner: &str, client_id: u32, side: Side, subticks: u64, gtb: u32) -> Order {
        Order::new(
            OrderId::new(SubaccountId::new(owner, 0), client_id, ORDER_FLAGS_SHORT_TERM, 0),
            side,
            5,
            subticks,
            OrderExpiration::GoodTilBlock(gtb),
        )
    }

    fn long_term_id(owner: &str, client_id: u32) -> OrderId {
        OrderId::new(SubaccountId::new(owner, 0), client_id, ORDER_FLAGS_LONG_TERM, 0)
    }

    fn placement(order: &Order) -> InternalOperation {
        InternalOperation::ShortTermOrderPlacement(order.clone())
    }

    fn match_of(taker: &Order, maker: &Order, fill_amount: u64) -> InternalOperation {
        InternalOperation::Match(ClobMatch::MatchOrders(MatchOrders {
            taker_order_id: taker.order_id.clone(),
            taker_order_hash: taker.order_hash().0.to_vec(),
            fills: vec![MakerFill {
                fill_amount,
                maker_order_id: maker.order_id.clone(),
            }],
        }))
    }

    #[test]
    fn test_placements_then_match_accepted() {
        let a = short_term("alice", 1, Side::Buy, 10, 15);
        let b = short_term("bob", 1, Side::Sell, 10, 20);

        let queue = vec![placement(&b), placement(&a), match_of(&a, &b, 5)];
        assert!(validate_operations_queue(&queue).is_ok());
    }

    #[test]
    fn test_match_before_placements_rejected() {
        let a = short_term("alice", 1, Side::Buy, 10, 15);
        let b = short_term("bob", 1, Side::Sell, 10, 20);

        let queue = vec![match_of(&a, &b, 5), placement(&a), placement(&b)];
        assert_eq!(
            validate_operations_queue(&queue),
            Err(ClobError::UnknownMakerOrder {
                order_id: b.order_id.clone()
            }),
        );
    }

    #[test]
    fn test_replacement_must_be_strictly_higher_priority() {
        let original = short_term("alice", 1, Side::Buy, 10, 15);
        let replacement = short_term("alice", 1, Side::Buy, 12, 20);

        // Longer expiration replaces the original.
        assert!(validate_operations_queue(&[placement(&original), placement(&replacement)]).is_ok());

        // The reverse direction is a downgrade.
        assert_eq!(
            validate_operations_queue(&[placement(&replacement), placement(&original)]),
            Err(ClobError::InvalidReplacement {
                order_id: original.order_id.clone()
            }),
        );

        // An exact duplicate is never a replacement.
        assert_eq!(
            validate_operations_queue(&[placement(&original), placement(&original)]),
            Err(ClobError::InvalidReplacement {
                order_id: original.order_id.clone()
            }),
        );
    }

    #[test]
    fn test_short_term_cancellation_requires_prior_placement() {
        let order = short_term("alice", 1, Side::Buy, 10, 15);
        let cancel = InternalOperation::OrderCancellation(CancelOrder {
            order_id: order.order_id.clone(),
            good_til: OrderExpiration::GoodTilBlock(15),
        });

        assert_eq!(
            validate_operations_queue(std::slice::from_ref(&cancel)),
            Err(ClobError::ShortTermCancellationUnknownOrder {
                order_id: order.order_id.clone()
            }),
        );
        assert!(validate_operations_queue(&[placement(&order), cancel]).is_ok());
    }

    #[test]
    fn test_cancellation_erases_placement() {
        let taker = short_term("alice", 1, Side::Buy, 10, 15);
        let maker = short_term("bob", 1, Side::Sell, 10, 20);
        let cancel = InternalOperation::OrderCancellation(CancelOrder {
            order_id: maker.order_id.clone(),
            good_til: OrderExpiration::GoodTilBlock(20),
        });

        // Canceled maker is no longer known to the match.
        let queue = vec![placement(&maker), placement(&taker), cancel, match_of(&taker, &maker, 5)];
        assert_eq!(
            validate_operations_queue(&queue),
            Err(ClobError::UnknownMakerOrder {
                order_id: maker.order_id.clone()
            }),
        );
    }

    #[test]
    fn test_preexisting_reference_rules() {
        let stateful = long_term_id("alice", 1);

        // A stateful reference is accepted once.
        let reference = InternalOperation::PreexistingStatefulOrderPlacement(stateful.clone());
        assert!(validate_operations_queue(std::slice::from_ref(&reference)).is_ok());

        // Twice is a duplicate.
        assert_eq!(
            validate_operations_queue(&[reference.clone(), reference]),
            Err(ClobError::DuplicatePreexistingStatefulOrder {
                order_id: stateful.clone()
            }),
        );

        // Short-term identities cannot be pre-existing.
        let short = short_term("alice", 2, Side::Buy, 10, 15);
        assert_eq!(
            validate_operations_queue(&[InternalOperation::PreexistingStatefulOrderPlacement(
                short.order_id.clone()
            )]),
            Err(ClobError::PreexistingOrderNotStateful {
                order_id: short.order_id
            }),
        );
    }

    #[test]
    fn test_match_structural_rejections() {
        let a = short_term("alice", 1, Side::Buy, 10, 15);
        let b = short_term("bob", 1, Side::Sell, 10, 20);
        let base = vec![placement(&b), placement(&a)];

        // Zero fill amount.
        let mut queue = base.clone();
        queue.push(match_of(&a, &b, 0));
        assert_eq!(validate_operations_queue(&queue), Err(ClobError::ZeroFillAmount));

        // Duplicate maker fill.
        let mut queue = base.clone();
        queue.push(InternalOperation::Match(ClobMatch::MatchOrders(MatchOrders {
            taker_order_id: a.order_id.clone(),
            taker_order_hash: a.order_hash().0.to_vec(),
            fills: vec![
                MakerFill { fill_amount: 2, maker_order_id: b.order_id.clone() },
                MakerFill { fill_amount: 3, maker_order_id: b.order_id.clone() },
            ],
        })));
        assert_eq!(
            validate_operations_queue(&queue),
            Err(ClobError::DuplicateMakerFill { order_id: b.order_id.clone() }),
        );

        // Truncated taker hash.
        let mut queue = base;
        queue.push(InternalOperation::Match(ClobMatch::MatchOrders(MatchOrders {
            taker_order_id: a.order_id.clone(),
            taker_order_hash: vec![0u8; 16],
            fills: vec![MakerFill { fill_amount: 5, maker_order_id: b.order_id.clone() }],
        })));
        assert_eq!(
            validate_operations_queue(&queue),
            Err(ClobError::InvalidTakerOrderHashLength { len: 16 }),
        );
    }

    #[test]
    fn test_liquidation_match_makers_must_be_known() {
        let maker = short_term("bob", 1, Side::Sell, 10, 20);
        let liquidation = InternalOperation::Match(ClobMatch::MatchPerpetualLiquidation(
            MatchPerpetualLiquidation {
                liquidated: SubaccountId::new("carl", 0),
                clob_pair_id: 0,
                perpetual_id: 0,
                total_size: 5,
                is_buy: true,
                fills: vec![MakerFill {
                    fill_amount: 5,
                    maker_order_id: maker.order_id.clone(),
                }],
            },
        ));

        assert_eq!(
            validate_operations_queue(std::slice::from_ref(&liquidation)),
            Err(ClobError::UnknownMakerOrder {
                order_id: maker.order_id.clone()
            }),
        );
        assert!(validate_operations_queue(&[placement(&maker), liquidation]).is_ok());
    }

    #[test]
    fn test_deleveraging_delegates_to_match_validation() {
        let liquidated = SubaccountId::new("carl", 0);
        let deleveraging = InternalOperation::Match(ClobMatch::MatchPerpetualDeleveraging(
            MatchPerpetualDeleveraging {
                liquidated: liquidated.clone(),
                perpetual_id: 0,
                fills: vec![DeleveragingFill {
                    offsetting_subaccount_id: liquidated.clone(),
                    fill_amount: 5,
                }],
            },
        ));

        assert_eq!(
            validate_operations_queue(&[deleveraging]),
            Err(ClobError::DeleveragingSelfFill { subaccount_id: liquidated }),
        );
    }

    #[test]
    fn test_removal_must_be_stateful_with_reason() {
        let removal = InternalOperation::OrderRemoval(OrderRemoval {
            order_id: long_term_id("alice", 1),
            reason: RemovalReason::Unspecified,
        });
        assert_eq!(
            validate_operations_queue(&[removal]),
            Err(ClobError::UnspecifiedRemovalReason),
        );

        let short = short_term("alice", 2, Side::Buy, 10, 15);
        let removal = InternalOperation::OrderRemoval(OrderRemoval {
            order_id: short.order_id.clone(),
            reason: RemovalReason::Undercollateralized,
        });
        assert_eq!(
            validate_operations_queue(&[removal]),
            Err(ClobError::ShortTermOrderRemoval { order_id: short.order_id }),
        );
    }
}
