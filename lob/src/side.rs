//! One side of the book: price-ordered levels plus an order-id index
//!
//! Levels live in a `BTreeMap` keyed so that iteration always starts at the
//! best price (bid keys are negated). A side-scoped `FxHashMap` maps each
//! resting order to its price and remaining size, keeping cancels near
//! constant time.

use common::{DepthLevel, Px, Qty, Side, DEPTH};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use thiserror::Error;

/// Recoverable signals from side book mutations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    /// An add named an order id that is already resting
    #[error("order {order_id} is already resting")]
    DuplicateOrder {
        /// The colliding order id
        order_id: u64,
    },
    /// A cancel or consume named an order id that is not resting here
    #[error("order {order_id} is not resting on this side")]
    UnknownOrder {
        /// The missing order id
        order_id: u64,
    },
}

/// Location and remaining size of one resting order
#[derive(Debug, Clone, Copy)]
struct OrderRef {
    price: Px,
    remaining: Qty,
}

/// Aggregation bucket for all resting orders at one price
#[derive(Debug)]
struct PriceLevel {
    price: Px,
    total_size: u64,
    orders: FxHashMap<u64, Qty>,
}

impl PriceLevel {
    fn new(price: Px) -> Self {
        Self {
            price,
            total_size: 0,
            orders: FxHashMap::default(),
        }
    }
}

/// One side (bid or ask) of a reconstructed limit order book
#[derive(Debug)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<i64, PriceLevel>,
    index: FxHashMap<u64, OrderRef>,
}

impl SideBook {
    /// Create an empty side book
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            index: FxHashMap::default(),
        }
    }

    /// Which side this book aggregates
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    // Bid keys are negated so the best price is always the smallest key.
    fn level_key(&self, price: Px) -> i64 {
        match self.side {
            Side::Bid => -price.as_i64(),
            _ => price.as_i64(),
        }
    }

    /// Insert a new resting order, creating its price level if absent.
    ///
    /// Zero-size adds are dropped; they would create a level with no
    /// resting quantity.
    pub fn add(&mut self, order_id: u64, price: Px, size: Qty) -> Result<(), BookError> {
        if self.index.contains_key(&order_id) {
            return Err(BookError::DuplicateOrder { order_id });
        }
        if size.is_zero() {
            return Ok(());
        }
        let level = self
            .levels
            .entry(self.level_key(price))
            .or_insert_with(|| PriceLevel::new(price));
        level.total_size += size.as_u64();
        level.orders.insert(order_id, size);
        self.index.insert(
            order_id,
            OrderRef {
                price,
                remaining: size,
            },
        );
        Ok(())
    }

    /// Cancel up to `size_hint` from a resting order.
    ///
    /// A hint of zero, or one at least as large as the remaining size, is a
    /// full cancel. Returns the size actually removed.
    pub fn cancel(&mut self, order_id: u64, size_hint: Qty) -> Result<Qty, BookError> {
        self.reduce(order_id, size_hint)
    }

    /// Remove traded size from a resting order (trade-sequence fill).
    ///
    /// Same decrement semantics as [`SideBook::cancel`]; the consumed size
    /// is clipped to the order's remaining size.
    pub fn consume(&mut self, order_id: u64, size: Qty) -> Result<Qty, BookError> {
        self.reduce(order_id, size)
    }

    fn reduce(&mut self, order_id: u64, size_hint: Qty) -> Result<Qty, BookError> {
        let Some(entry) = self.index.get(&order_id).copied() else {
            return Err(BookError::UnknownOrder { order_id });
        };
        let take = if size_hint.is_zero() {
            entry.remaining
        } else {
            size_hint.min(entry.remaining)
        };
        let left = entry.remaining.saturating_sub(take);
        let key = self.level_key(entry.price);

        let Some(level) = self.levels.get_mut(&key) else {
            // Index said the order rests here but the level is gone; drop
            // the stale entry rather than leave the maps disagreeing.
            self.index.remove(&order_id);
            return Err(BookError::UnknownOrder { order_id });
        };
        level.total_size = level.total_size.saturating_sub(take.as_u64());
        if left.is_zero() {
            level.orders.remove(&order_id);
            self.index.remove(&order_id);
        } else {
            level.orders.insert(order_id, left);
            if let Some(entry) = self.index.get_mut(&order_id) {
                entry.remaining = left;
            }
        }
        if level.total_size == 0 {
            self.levels.remove(&key);
        }
        Ok(take)
    }

    /// Project the top levels in this side's canonical order.
    ///
    /// Bids come out in descending price order, asks ascending. Slots past
    /// the last real level hold the all-zero sentinel.
    #[must_use]
    pub fn top_levels(&self) -> [DepthLevel; DEPTH] {
        let mut out = [DepthLevel::EMPTY; DEPTH];
        for (slot, level) in out.iter_mut().zip(self.levels.values()) {
            *slot = DepthLevel {
                price: level.price,
                size: level.total_size,
                count: u32::try_from(level.orders.len()).unwrap_or(u32::MAX),
            };
        }
        out
    }

    /// Whether an order id is resting on this side
    #[must_use]
    pub fn contains(&self, order_id: u64) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Remaining size of a resting order, if present
    #[must_use]
    pub fn order_size(&self, order_id: u64) -> Option<Qty> {
        self.index.get(&order_id).map(|entry| entry.remaining)
    }

    /// Number of resting orders
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the side has no resting orders
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of occupied price levels
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Drop all levels and index entries
    pub fn clear(&mut self) {
        self.levels.clear();
        self.index.clear();
    }

    /// Panic if the level map and the order index disagree.
    ///
    /// Every indexed order must appear in exactly the level its price names
    /// with the same remaining size; every level's aggregate must equal the
    /// sum of its members and be positive.
    pub fn assert_invariants(&self) {
        for (&order_id, entry) in &self.index {
            let key = self.level_key(entry.price);
            let level = self
                .levels
                .get(&key)
                .unwrap_or_else(|| panic!("order {order_id} indexed at missing level"));
            let member = level
                .orders
                .get(&order_id)
                .unwrap_or_else(|| panic!("order {order_id} missing from its level"));
            assert_eq!(
                *member, entry.remaining,
                "order {order_id} size disagrees between index and level"
            );
        }
        for level in self.levels.values() {
            assert!(level.total_size > 0, "empty level left in map");
            assert!(!level.orders.is_empty(), "level with no members left in map");
            let sum: u64 = level.orders.values().map(|q| q.as_u64()).sum();
            assert_eq!(level.total_size, sum, "level aggregate out of sync");
            for order_id in level.orders.keys() {
                assert!(
                    self.index.contains_key(order_id),
                    "level member {order_id} missing from index"
                );
            }
        }
    }
}
