//! Per-pass balance-delta aggregation.
//!
//! Replayed fills do not hit the subaccount ledger one by one: a
//! settlement pass folds them into `PendingUpdates`, which nets every
//! fill's asset and perpetual deltas per subaccount, accumulates fees
//! separately, and converts once into a subaccount-sorted update list.
//! Netting keeps the ledger write count proportional to touched
//! subaccounts, not fills, and the sorted conversion keeps the write
//! order identical on every node.

use std::collections::BTreeMap;

use crate::interfaces::SubaccountBalanceUpdate;
use crate::types::{
    fill_amount_to_quote_quantums, ClobError, ClobPair, ClobPairMetadata, SubaccountId,
    QUOTE_ASSET_ID,
};

const ONE_MILLION: u128 = 1_000_000;

/// Deltas accumulated for one subaccount within a pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct SubaccountDeltas {
    asset_deltas: BTreeMap<u32, i128>,
    perpetual_deltas: BTreeMap<u32, i128>,
    fee_quote_quantums: i128,
}

/// Net balance changes accumulated over one settlement pass.
///
/// Built fresh per pass; converted exactly once via
/// [`PendingUpdates::into_updates`].
#[derive(Debug, Default)]
pub struct PendingUpdates {
    per_subaccount: BTreeMap<SubaccountId, SubaccountDeltas>,
}

impl PendingUpdates {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subaccounts touched so far.
    pub fn len(&self) -> usize {
        self.per_subaccount.len()
    }

    /// Whether no deltas have accumulated.
    pub fn is_empty(&self) -> bool {
        self.per_subaccount.is_empty()
    }

    /// Accumulate a signed delta against one asset balance.
    pub fn add_asset_delta(&mut self, subaccount_id: &SubaccountId, asset_id: u32, delta: i128) {
        *self
            .per_subaccount
            .entry(subaccount_id.clone())
            .or_default()
            .asset_deltas
            .entry(asset_id)
            .or_insert(0) += delta;
    }

    /// Accumulate a signed delta against one perpetual position.
    pub fn add_perpetual_delta(&mut self, subaccount_id: &SubaccountId, perpetual_id: u32, delta: i128) {
        *self
            .per_subaccount
            .entry(subaccount_id.clone())
            .or_default()
            .perpetual_deltas
            .entry(perpetual_id)
            .or_insert(0) += delta;
    }

    /// Accumulate a fee in quote quantums.
    pub fn add_fee(&mut self, subaccount_id: &SubaccountId, fee_quote_quantums: i128) {
        self.per_subaccount
            .entry(subaccount_id.clone())
            .or_default()
            .fee_quote_quantums += fee_quote_quantums;
    }

    /// Fold one fill into both legs' deltas and fees.
    ///
    /// The fill executes at the maker's price. The buyer pays quote and
    /// receives position; the seller the reverse. Fees are charged on the
    /// quote value of the fill at each leg's ppm rate, rounding down.
    pub fn apply_fill(
        &mut self,
        clob_pair: &ClobPair,
        maker_subaccount: &SubaccountId,
        taker_subaccount: &SubaccountId,
        taker_is_buy: bool,
        fill_quantums: u64,
        maker_subticks: u64,
    ) -> Result<(), ClobError> {
        let quote_quantums = fill_amount_to_quote_quantums(
            maker_subticks,
            fill_quantums,
            clob_pair.quantum_conversion_exponent,
        )?;
        let quote: i128 = to_i128(quote_quantums, "converting a fill's quote value")?;
        let base: i128 = i128::from(fill_quantums);

        let (buyer, seller) = if taker_is_buy {
            (taker_subaccount, maker_subaccount)
        } else {
            (maker_subaccount, taker_subaccount)
        };

        self.add_asset_delta(buyer, QUOTE_ASSET_ID, -quote);
        self.add_asset_delta(seller, QUOTE_ASSET_ID, quote);
        match clob_pair.metadata {
            ClobPairMetadata::Perpetual { perpetual_id } => {
                self.add_perpetual_delta(buyer, perpetual_id, base);
                self.add_perpetual_delta(seller, perpetual_id, -base);
            }
            ClobPairMetadata::Spot { base_asset_id, .. } => {
                self.add_asset_delta(buyer, base_asset_id, base);
                self.add_asset_delta(seller, base_asset_id, -base);
            }
        }

        let maker_fee = fee_for(quote_quantums, clob_pair.maker_fee_ppm)?;
        let taker_fee = fee_for(quote_quantums, clob_pair.taker_fee_ppm)?;
        self.add_fee(maker_subaccount, maker_fee);
        self.add_fee(taker_subaccount, taker_fee);

        Ok(())
    }

    /// Convert into the subaccount-sorted update list, consuming the
    /// accumulator. Fees are folded into each subaccount's quote delta.
    pub fn into_updates(self) -> Vec<SubaccountBalanceUpdate> {
        self.per_subaccount
            .into_iter()
            .map(|(subaccount_id, mut deltas)| {
                if deltas.fee_quote_quantums != 0 {
                    *deltas.asset_deltas.entry(QUOTE_ASSET_ID).or_insert(0) -=
                        deltas.fee_quote_quantums;
                }
                SubaccountBalanceUpdate {
                    subaccount_id,
                    asset_deltas: deltas.asset_deltas,
                    perpetual_deltas: deltas.perpetual_deltas,
                }
            })
            .collect()
    }
}

fn to_i128(value: u128, context: &'static str) -> Result<i128, ClobError> {
    i128::try_from(value).map_err(|_| ClobError::ArithmeticOverflow { context })
}

/// Fee in quote quantums for a fill's quote value at a ppm rate,
/// rounding down.
fn fee_for(quote_quantums: u128, fee_ppm: u32) -> Result<i128, ClobError> {
    let fee = quote_quantums
        .checked_mul(u128::from(fee_ppm))
        .ok_or(ClobError::ArithmeticOverflow {
            context: "computing a fill fee",
        })?
        / ONE_MILLION;
    to_i128(fee, "converting a fill fee")
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClobPairStatus;

    fn perpetual_pair() -> ClobPair {
        ClobPair {
            id: 0,
            metadata: ClobPairMetadata::Perpetual { perpetual_id: 7 },
            step_base_quantums: 1,
            subticks_per_tick: 1,
            quantum_conversion_exponent: 0,
            min_order_base_quantums: 1,
            status: ClobPairStatus::Active,
            maker_fee_ppm: 200,
            taker_fee_ppm: 500,
        }
    }

    fn alice() -> SubaccountId {
        SubaccountId::new("alice", 0)
    }

    fn bob() -> SubaccountId {
        SubaccountId::new("bob", 0)
    }

    #[test]
    fn test_deltas_net_per_subaccount() {
        let mut pending = PendingUpdates::new();
        pending.add_asset_delta(&alice(), QUOTE_ASSET_ID, 100);
        pending.add_asset_delta(&alice(), QUOTE_ASSET_ID, -30);
        pending.add_perpetual_delta(&alice(), 7, 5);
        pending.add_perpetual_delta(&alice(), 7, -2);

        let updates = pending.into_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].asset_deltas[&QUOTE_ASSET_ID], 70);
        assert_eq!(updates[0].perpetual_deltas[&7], 3);
    }

    #[test]
    fn test_apply_fill_both_legs() {
        let mut pending = PendingUpdates::new();
        let pair = perpetual_pair();

        // Taker bob buys 100 base from maker alice at 50 subticks:
        // quote value 5000.
        pending
            .apply_fill(&pair, &alice(), &bob(), true, 100, 50)
            .expect("fill in range");

        let updates = pending.into_updates();
        assert_eq!(updates.len(), 2);

        // BTreeMap keying sorts alice before bob.
        let (alice_update, bob_update) = (&updates[0], &updates[1]);
        assert_eq!(alice_update.subaccount_id, alice());
        assert_eq!(bob_update.subaccount_id, bob());

        // Seller alice gains quote minus her maker fee (5000 * 200ppm = 1).
        assert_eq!(alice_update.asset_deltas[&QUOTE_ASSET_ID], 5_000 - 1);
        assert_eq!(alice_update.perpetual_deltas[&7], -100);

        // Buyer bob pays quote plus his taker fee (5000 * 500ppm = 2).
        assert_eq!(bob_update.asset_deltas[&QUOTE_ASSET_ID], -5_000 - 2);
        assert_eq!(bob_update.perpetual_deltas[&7], 100);
    }

    #[test]
    fn test_apply_fill_spot_pair_moves_base_asset() {
        let mut pending = PendingUpdates::new();
        let pair = ClobPair {
            metadata: ClobPairMetadata::Spot {
                base_asset_id: 3,
                quote_asset_id: QUOTE_ASSET_ID,
            },
            maker_fee_ppm: 0,
            taker_fee_ppm: 0,
            ..perpetual_pair()
        };

        // Taker alice sells 10 base to maker bob at 4 subticks.
        pending
            .apply_fill(&pair, &bob(), &alice(), false, 10, 4)
            .expect("fill in range");

        let updates = pending.into_updates();
        let alice_update = &updates[0];
        assert_eq!(alice_update.asset_deltas[&QUOTE_ASSET_ID], 40);
        assert_eq!(alice_update.asset_deltas[&3], -10);
        assert!(alice_update.perpetual_deltas.is_empty());
    }

    #[test]
    fn test_fills_net_across_a_pass() {
        let mut pending = PendingUpdates::new();
        let pair = ClobPair {
            maker_fee_ppm: 0,
            taker_fee_ppm: 0,
            ..perpetual_pair()
        };

        // Bob buys 100 then sells 40 back, both against alice at 50.
        pending.apply_fill(&pair, &alice(), &bob(), true, 100, 50).expect("in range");
        pending.apply_fill(&pair, &alice(), &bob(), false, 40, 50).expect("in range");

        let updates = pending.into_updates();
        let bob_update = &updates[1];
        assert_eq!(bob_update.perpetual_deltas[&7], 60);
        assert_eq!(bob_update.asset_deltas[&QUOTE_ASSET_ID], -3_000);
    }

    #[test]
    fn test_explicit_fee_folds_into_quote_delta() {
        let mut pending = PendingUpdates::new();
        pending.add_asset_delta(&alice(), QUOTE_ASSET_ID, 1_000);
        pending.add_fee(&alice(), 25);

        let updates = pending.into_updates();
        assert_eq!(updates[0].asset_deltas[&QUOTE_ASSET_ID], 975);
    }

    #[test]
    fn test_fee_rounds_down() {
        // 999 quote at 500 ppm = 0.4995, charged as 0.
        assert_eq!(fee_for(999, 500), Ok(0));
        assert_eq!(fee_for(2_000, 500), Ok(1));
    }

    #[test]
    fn test_subaccount_sorted_output() {
        let mut pending = PendingUpdates::new();
        pending.add_asset_delta(&SubaccountId::new("zed", 0), QUOTE_ASSET_ID, 1);
        pending.add_asset_delta(&SubaccountId::new("amy", 1), QUOTE_ASSET_ID, 1);
        pending.add_asset_delta(&SubaccountId::new("amy", 0), QUOTE_ASSET_ID, 1);

        let owners: Vec<(String, u32)> = pending
            .into_updates()
            .into_iter()
            .map(|u| (u.subaccount_id.owner.clone(), u.subaccount_id.number))
            .collect();
        assert_eq!(
            owners,
            vec![
                ("amy".to_string(), 0),
                ("amy".to_string(), 1),
                ("zed".to_string(), 0),
            ]
        );
    }
}
