//! Property tests: random operation interleavings preserve book coherence

use common::{Action, MboEvent, Px, Qty, Side, Ts, RTYPE_MBO};
use lob::Book;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add {
        order_id: u64,
        side: Side,
        price: i64,
        size: u32,
    },
    Cancel {
        order_id: u64,
        side: Side,
        size: u32,
    },
    TradeSequence {
        order_id: u64,
        aggressor: Side,
        price: i64,
        size: u32,
        with_fill: bool,
    },
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bid), Just(Side::Ask)]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..50, arb_side(), 900_000i64..1_100_000, 1u32..500).prop_map(
            |(order_id, side, price, size)| {
                let price = price / 10_000 * 10_000;
                Op::Add {
                    order_id,
                    side,
                    price,
                    size,
                }
            }
        ),
        (1u64..50, arb_side(), 0u32..500).prop_map(|(order_id, side, size)| Op::Cancel {
            order_id,
            side,
            size,
        }),
        (1u64..50, arb_side(), 900_000i64..1_100_000, 1u32..500, any::<bool>()).prop_map(
            |(order_id, aggressor, price, size, with_fill)| {
                let price = price / 10_000 * 10_000;
                Op::TradeSequence {
                    order_id,
                    aggressor,
                    price,
                    size,
                    with_fill,
                }
            }
        ),
    ]
}

fn event(
    action: Action,
    side: Side,
    price: i64,
    size: u32,
    order_id: u64,
    sequence: u64,
) -> MboEvent {
    MboEvent {
        ts_recv: Ts::from_nanos(sequence as i64),
        ts_event: Ts::from_nanos(sequence as i64),
        rtype: RTYPE_MBO,
        publisher_id: 1,
        instrument_id: 1,
        action,
        side,
        price: Px::from_i64(price),
        size: Qty::new(size),
        channel_id: 0,
        order_id,
        flags: 0,
        ts_in_delta: 0,
        sequence,
        symbol: "PROP".to_string(),
    }
}

fn drive(book: &mut Book, op: &Op, sequence: &mut u64) {
    let mut next = |action, side, price, size, order_id| {
        *sequence += 1;
        event(action, side, price, size, order_id, *sequence)
    };
    match *op {
        Op::Add {
            order_id,
            side,
            price,
            size,
        } => {
            let e = next(Action::Add, side, price, size, order_id);
            book.apply(&e);
        }
        Op::Cancel {
            order_id,
            side,
            size,
        } => {
            let e = next(Action::Cancel, side, 0, size, order_id);
            book.apply(&e);
        }
        Op::TradeSequence {
            order_id,
            aggressor,
            price,
            size,
            with_fill,
        } => {
            let t = next(Action::Trade, aggressor, price, size, order_id);
            book.apply(&t);
            if with_fill {
                let f = next(Action::Fill, aggressor, price, size, order_id);
                book.apply(&f);
            }
            let c = next(Action::Cancel, aggressor, price, size, order_id);
            book.apply(&c);
        }
    }
}

fn assert_depth_sorted(book: &Book) {
    let bids = book.bids().top_levels();
    for window in bids.windows(2) {
        if !window[1].is_empty() {
            assert!(!window[0].is_empty(), "gap before a populated bid slot");
            assert!(
                window[0].price > window[1].price,
                "bid prices not strictly descending"
            );
        }
    }
    let asks = book.asks().top_levels();
    for window in asks.windows(2) {
        if !window[1].is_empty() {
            assert!(!window[0].is_empty(), "gap before a populated ask slot");
            assert!(
                window[0].price < window[1].price,
                "ask prices not strictly ascending"
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_streams_keep_book_coherent(ops in prop::collection::vec(arb_op(), 1..120)) {
        let mut book = Book::new();
        let mut sequence = 0u64;
        for op in &ops {
            drive(&mut book, op, &mut sequence);
            book.bids().assert_invariants();
            book.asks().assert_invariants();
            assert_depth_sorted(&book);
        }
    }

    #[test]
    fn add_then_full_cancel_always_empties(
        order_id in 1u64..1000,
        side in arb_side(),
        price in 1i64..2_000_000,
        size in 1u32..10_000,
    ) {
        let mut book = Book::new();
        let mut sequence = 0u64;
        drive(&mut book, &Op::Add { order_id, side, price, size }, &mut sequence);
        drive(&mut book, &Op::Cancel { order_id, side, size: 0 }, &mut sequence);
        prop_assert!(book.bids().is_empty());
        prop_assert!(book.asks().is_empty());
    }
}
