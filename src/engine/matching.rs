//! Match validation and the price-time-priority matching walk.
//!
//! Two layers live here:
//!
//! - [`Match`]: stateless validation of a single (maker, taker, fill)
//!   triple. Replay and proposal both go through it.
//! - [`MatchingEngine`]: the speculative matching walk a proposer runs
//!   against its book. Fills happen at the resting order's price, never
//!   the incoming order's. Collateralization is checked per fill through
//!   the [`SubaccountLedger`] seam; makers that fail are removed from the
//!   book and the walk continues.
//!
//! The proposer and every replaying validator run the same walk, which is
//! what makes replay reproduce the proposer's result when the operations
//! queue is well-formed.

use std::collections::BTreeMap;

use crate::interfaces::{SubaccountBalanceUpdate, SubaccountLedger};
use crate::orderbook::Orderbook;
use crate::types::{
    fill_amount_to_quote_quantums, ClobError, ClobPair, MakerFillWithOrder, MatchableOrder, Order,
    OrderStatus, RemovalReason, TimeInForce, QUOTE_ASSET_ID,
};

// ============================================================================
// Match validation
// ============================================================================

/// One proposed (maker, taker, fill) triple.
pub struct Match<'a> {
    /// The resting side.
    pub maker: &'a dyn MatchableOrder,

    /// The incoming side.
    pub taker: &'a dyn MatchableOrder,

    /// Matched amount in base quantums.
    pub fill_amount: u64,
}

impl Match<'_> {
    /// Stateless validation, fail-fast on the first violated rule.
    ///
    /// Checks, in order: distinct subaccounts, nonzero fill, same market,
    /// opposite sides, crossing prices, fill within both order sizes,
    /// maker not a liquidation, maker not immediate-execution.
    pub fn validate(&self) -> Result<(), ClobError> {
        if self.maker.subaccount_id() == self.taker.subaccount_id() {
            return Err(ClobError::SelfTrade {
                subaccount_id: self.maker.subaccount_id().clone(),
            });
        }

        if self.fill_amount == 0 {
            return Err(ClobError::ZeroFillAmount);
        }

        if self.maker.clob_pair_id() != self.taker.clob_pair_id() {
            return Err(ClobError::ClobPairMismatch {
                maker_clob_pair_id: self.maker.clob_pair_id(),
                taker_clob_pair_id: self.taker.clob_pair_id(),
            });
        }

        if self.maker.is_buy() == self.taker.is_buy() {
            return Err(ClobError::SameSideMatch);
        }

        // Buy maker must bid at least the taker's ask; sell maker must ask
        // at most the taker's bid.
        let crosses = if self.maker.is_buy() {
            self.maker.subticks() >= self.taker.subticks()
        } else {
            self.taker.subticks() >= self.maker.subticks()
        };
        if !crosses {
            return Err(ClobError::NonCrossingMatch {
                maker_subticks: self.maker.subticks(),
                taker_subticks: self.taker.subticks(),
            });
        }

        let smaller_order_quantums = self.maker.base_quantums().min(self.taker.base_quantums());
        if self.fill_amount > smaller_order_quantums {
            return Err(ClobError::FillAmountExceedsOrderSize {
                fill_amount: self.fill_amount,
                order_quantums: smaller_order_quantums,
            });
        }

        if self.maker.is_liquidation() {
            return Err(ClobError::LiquidationAsMaker);
        }

        let maker_order = self.maker.must_get_order();
        if maker_order.requires_immediate_execution() {
            return Err(ClobError::MakerRequiresImmediateExecution {
                order_id: maker_order.order_id.clone(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Matching engine
// ============================================================================

/// Outcome of one matching walk.
#[derive(Debug)]
pub struct MatchResult {
    /// Fills produced, in matching order.
    pub fills: Vec<MakerFillWithOrder>,

    /// Taker size left unmatched, in base quantums.
    pub remaining_quantums: u64,

    /// Classification of the taker's attempt.
    pub taker_status: OrderStatus,

    /// Maker orders removed from the book during the walk, with the
    /// reason. Stateful removals among these become `OrderRemoval`
    /// operations.
    pub removed_makers: Vec<(Order, RemovalReason)>,
}

impl MatchResult {
    /// Whether the taker may rest its remaining size on the book.
    pub fn may_rest(&self, taker: &dyn MatchableOrder) -> bool {
        if taker.is_liquidation() || self.remaining_quantums == 0 {
            return false;
        }
        if !self.taker_status.is_success() {
            return false;
        }
        !taker.must_get_order().requires_immediate_execution()
    }
}

/// Stateless driver of the matching walk.
pub struct MatchingEngine;

impl MatchingEngine {
    /// Match a taker against the book, filling at resting prices in
    /// price-time priority.
    ///
    /// Mutates the book: matched maker size is consumed, and makers that
    /// self-trade against the taker or fail collateralization are removed.
    /// The taker itself is never rested here; callers consult
    /// [`MatchResult::may_rest`].
    pub fn match_order(
        book: &mut Orderbook,
        clob_pair: &ClobPair,
        taker: &dyn MatchableOrder,
        ledger: &dyn SubaccountLedger,
    ) -> Result<MatchResult, ClobError> {
        if !clob_pair.accepts_new_matches() {
            return Err(ClobError::UnsupportedClobPairStatus {
                clob_pair_id: clob_pair.id,
            });
        }

        let taker_is_buy = taker.is_buy();

        // Post-only takers must not cross.
        if !taker.is_liquidation() {
            let order = taker.must_get_order();
            if order.time_in_force == TimeInForce::PostOnly && book.crosses(taker_is_buy, taker.subticks()) {
                return Err(ClobError::PostOnlyWouldCrossMakerOrder {
                    order_id: order.order_id.clone(),
                });
            }
        }

        // Reduce-only takers are capped at the size of the position they
        // close; an aligned or flat position cannot be reduced.
        let mut matchable_quantums = taker.base_quantums();
        let mut resized = false;
        if taker.is_reduce_only() {
            let order_id = taker.must_get_order().order_id.clone();
            if !clob_pair.is_perpetual() {
                return Err(ClobError::InvalidReduceOnly { order_id });
            }
            let perpetual_id = clob_pair.must_get_perpetual_id();
            let position = ledger
                .get_subaccount(taker.subaccount_id())
                .perpetual_position(perpetual_id);
            let closable = if taker_is_buy {
                // Buying reduces a short.
                if position >= 0 {
                    return Err(ClobError::InvalidReduceOnly { order_id });
                }
                position.unsigned_abs()
            } else {
                if position <= 0 {
                    return Err(ClobError::InvalidReduceOnly { order_id });
                }
                position.unsigned_abs()
            };
            let closable = u64::try_from(closable).unwrap_or(u64::MAX);
            if closable < matchable_quantums {
                matchable_quantums = closable;
                resized = true;
            }
        }

        // Fill-or-kill is checked up front so a partial walk never has to
        // be rolled back.
        if !taker.is_liquidation()
            && taker.must_get_order().time_in_force == TimeInForce::FillOrKill
        {
            let fillable =
                book.fillable_quantums(taker_is_buy, taker.subticks(), taker.subaccount_id());
            if fillable < u128::from(matchable_quantums) {
                return Err(ClobError::FillOrKillCouldNotBeFullyFilled {
                    order_id: taker.must_get_order().order_id.clone(),
                });
            }
        }

        let mut fills = Vec::new();
        let mut removed_makers = Vec::new();
        let mut remaining = matchable_quantums;
        let mut taker_status = OrderStatus::Success;

        while remaining > 0 {
            let Some(key) = book.best_maker_key(taker_is_buy) else {
                break;
            };
            let node = book.node(key).expect("best maker key is live");
            if !book.crosses(taker_is_buy, taker.subticks()) {
                break;
            }

            let maker_order = node.order.clone();
            let maker_remaining = node.remaining();
            let maker_subticks = maker_order.subticks;

            // Self-trade: the older resting order yields.
            if &maker_order.order_id.subaccount_id == taker.subaccount_id() {
                book.remove_order_by_key(key);
                removed_makers.push((maker_order, RemovalReason::InvalidSelfTrade));
                continue;
            }

            let fill_amount = remaining.min(maker_remaining);
            let quote_quantums = match fill_amount_to_quote_quantums(
                maker_subticks,
                fill_amount,
                clob_pair.quantum_conversion_exponent,
            )
            .ok()
            .and_then(|q| i128::try_from(q).ok())
            {
                Some(q) => q,
                None => {
                    taker_status = OrderStatus::InternalError;
                    break;
                }
            };

            let (taker_update, maker_update) = Self::fill_updates(
                clob_pair,
                taker,
                &maker_order,
                fill_amount,
                quote_quantums,
            );
            let results = ledger.can_update_subaccounts(&[taker_update, maker_update]);

            if !results[0].is_success() {
                taker_status = OrderStatus::Undercollateralized;
                break;
            }
            if !results[1].is_success() {
                // Maker can no longer back its order; drop it and keep
                // walking.
                book.remove_order_by_key(key);
                removed_makers.push((maker_order, RemovalReason::Undercollateralized));
                continue;
            }

            let filled = book.fill_order(key, fill_amount);
            debug_assert_eq!(filled, fill_amount);
            remaining -= fill_amount;
            fills.push(MakerFillWithOrder {
                order: maker_order,
                fill_amount,
            });
        }

        if taker_status == OrderStatus::Success {
            if remaining > 0 && !taker.is_liquidation() {
                let order = taker.must_get_order();
                if order.time_in_force == TimeInForce::Ioc {
                    taker_status = OrderStatus::ImmediateOrCancelWouldRestOnBook;
                }
            }
            if remaining > 0 && taker.is_liquidation() {
                taker_status = OrderStatus::LiquidationRequiresDeleveraging;
            }
            if resized && taker_status == OrderStatus::Success {
                taker_status = OrderStatus::ReduceOnlyResized;
            }
        }

        Ok(MatchResult {
            fills,
            remaining_quantums: remaining,
            taker_status,
            removed_makers,
        })
    }

    /// Build the taker and maker balance updates for one fill at the
    /// maker's price. Fees are settled separately.
    fn fill_updates(
        clob_pair: &ClobPair,
        taker: &dyn MatchableOrder,
        maker_order: &Order,
        fill_amount: u64,
        quote_quantums: i128,
    ) -> (SubaccountBalanceUpdate, SubaccountBalanceUpdate) {
        let base_delta = i128::from(fill_amount);
        let (taker_quote, taker_base) = if taker.is_buy() {
            (-quote_quantums, base_delta)
        } else {
            (quote_quantums, -base_delta)
        };

        let position_key = if clob_pair.is_perpetual() {
            clob_pair.must_get_perpetual_id()
        } else {
            clob_pair.id
        };

        let taker_update = SubaccountBalanceUpdate {
            subaccount_id: taker.subaccount_id().clone(),
            asset_deltas: BTreeMap::from([(QUOTE_ASSET_ID, taker_quote)]),
            perpetual_deltas: BTreeMap::from([(position_key, taker_base)]),
        };
        let maker_update = SubaccountBalanceUpdate {
            subaccount_id: maker_order.order_id.subaccount_id.clone(),
            asset_deltas: BTreeMap::from([(QUOTE_ASSET_ID, -taker_quote)]),
            perpetual_deltas: BTreeMap::from([(position_key, -taker_base)]),
        };
        (taker_update, maker_update)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
