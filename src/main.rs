//! Demonstration binary: one block's life cycle end to end.
//!
//! Places two short-term orders, matches them, assembles the operations
//! queue a proposer would emit, replays it through the stateless
//! validator, and settles the resulting fill into balance updates.

use std::collections::BTreeMap;

use perp_clob::interfaces::{InMemoryLedger, SubaccountLedger};
use perp_clob::proposal::{validate_operations_queue, OperationsToPropose};
use perp_clob::settlement::PendingUpdates;
use perp_clob::types::{
    subticks_to_price_decimal, ClobPair, ClobPairMetadata, ClobPairStatus, Order, OrderExpiration,
    OrderId, Side, SubaccountId, ORDER_FLAGS_SHORT_TERM, QUOTE_ASSET_ID,
};
use perp_clob::{MatchingEngine, Orderbook};

fn main() {
    println!("===========================================");
    println!("  perp-clob - block proposal walkthrough");
    println!("===========================================");
    println!();

    let pair = ClobPair {
        id: 0,
        metadata: ClobPairMetadata::Perpetual { perpetual_id: 0 },
        step_base_quantums: 1,
        subticks_per_tick: 1,
        quantum_conversion_exponent: -8,
        min_order_base_quantums: 1,
        status: ClobPairStatus::Active,
        maker_fee_ppm: 200,
        taker_fee_ppm: 500,
    };

    let mut ledger = InMemoryLedger::new();
    ledger.fund(SubaccountId::new("alice", 0), 1_000_000_000_000);
    ledger.fund(SubaccountId::new("bob", 0), 1_000_000_000_000);

    // Maker alice asks 5 @ 50.00, taker bob bids 5 at the same price.
    let maker = Order::new(
        OrderId::new(SubaccountId::new("alice", 0), 1, ORDER_FLAGS_SHORT_TERM, 0),
        Side::Sell,
        5_000_000,
        5_000_000_000,
        OrderExpiration::GoodTilBlock(20),
    );
    let taker = Order::new(
        OrderId::new(SubaccountId::new("bob", 0), 1, ORDER_FLAGS_SHORT_TERM, 0),
        Side::Buy,
        5_000_000,
        5_000_000_000,
        OrderExpiration::GoodTilBlock(15),
    );

    println!("Placing maker {} (sell 5 @ 50.00)...", maker.order_id);
    let mut book = Orderbook::new(pair.id);
    book.add_order(maker.clone());
    if let Some(price) = book
        .best_ask()
        .and_then(|ask| subticks_to_price_decimal(ask, pair.quantum_conversion_exponent))
    {
        println!("  best ask now {}", price);
    }

    println!("Matching taker {} (buy 5 @ 50.00)...", taker.order_id);
    let result = MatchingEngine::match_order(&mut book, &pair, &taker, &ledger)
        .expect("demo match is well-formed");
    println!("  status: {:?}", result.taker_status);
    for fill in &result.fills {
        println!(
            "  filled {} base quantums against {}",
            fill.fill_amount, fill.order.order_id
        );
    }
    println!();

    // Assemble the operations queue the proposer would broadcast.
    println!("Assembling operations queue...");
    let mut otp = OperationsToPropose::new();
    otp.assign_nonce_to_order(&maker, false);
    otp.assign_nonce_to_order(&taker, false);
    otp.add_short_term_order_placement_to_operations_queue(maker.clone(), maker.must_canonical_bytes());
    otp.add_short_term_order_placement_to_operations_queue(taker.clone(), taker.must_canonical_bytes());
    otp.add_match_to_operations_queue(&taker, &result.fills);

    let queue = otp.get_operations_queue();
    println!("  {} operations queued", queue.len());
    for (index, operation) in queue.iter().enumerate() {
        println!("  [{}] {}", index, operation.operation_hash());
    }
    println!();

    // Every other validator runs the stateless pass before replaying.
    println!("Replay validation...");
    match validate_operations_queue(&queue) {
        Ok(()) => println!("  queue accepted"),
        Err(e) => println!("  queue rejected: {}", e),
    }
    println!();

    // Fold the fill into net balance updates and apply them.
    println!("Settling...");
    let mut pending = PendingUpdates::new();
    for fill in &result.fills {
        pending
            .apply_fill(
                &pair,
                &fill.order.order_id.subaccount_id,
                &taker.order_id.subaccount_id,
                true,
                fill.fill_amount,
                fill.order.subticks,
            )
            .expect("demo fill is in range");
    }
    let updates = pending.into_updates();
    ledger.update_subaccounts(&updates);
    for update in &updates {
        let quote = update
            .asset_deltas
            .get(&QUOTE_ASSET_ID)
            .copied()
            .unwrap_or(0);
        let position: BTreeMap<u32, i128> = update.perpetual_deltas.clone();
        println!(
            "  {}: quote {:+}, positions {:?}",
            update.subaccount_id, quote, position
        );
    }
    println!();
    println!("Done.");
}
