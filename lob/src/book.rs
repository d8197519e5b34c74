//! The per-instrument book: event dispatch and depth projection

use crate::side::{BookError, SideBook};
use crate::stats::BookStats;
use crate::tracker::TradeTracker;
use common::{Action, MboEvent, MbpRecord, Side, RTYPE_MBP};
use std::time::Instant;
use tracing::{debug, warn};

/// Reconstructed limit order book for a single instrument
///
/// All mutation happens through [`Book::apply`] on one thread; the
/// statistics block may be read concurrently.
#[derive(Debug)]
pub struct Book {
    bids: SideBook,
    asks: SideBook,
    tracker: TradeTracker,
    stats: BookStats,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    /// Create an empty book
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: SideBook::new(Side::Bid),
            asks: SideBook::new(Side::Ask),
            tracker: TradeTracker::new(),
            stats: BookStats::new(),
        }
    }

    /// Bid side, best price first
    #[must_use]
    pub fn bids(&self) -> &SideBook {
        &self.bids
    }

    /// Ask side, best price first
    #[must_use]
    pub fn asks(&self) -> &SideBook {
        &self.asks
    }

    /// Statistics counter block
    #[must_use]
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Apply one event to the book.
    ///
    /// Semantic anomalies (unknown orders, duplicate adds) are logged and
    /// counted but never abort the stream.
    pub fn apply(&mut self, event: &MboEvent) {
        let started = Instant::now();
        match event.action {
            Action::Add => self.apply_add(event),
            Action::Cancel => self.apply_cancel(event),
            Action::Trade => {
                if !self.tracker.observe_trade(event) {
                    self.stats.record_unknown_order();
                }
            }
            Action::Fill => {
                if !self.tracker.observe_fill(event) {
                    debug!(
                        order_id = event.order_id,
                        sequence = event.sequence,
                        "fill without an open trade sequence"
                    );
                    self.stats.record_unknown_order();
                }
            }
            // Clear markers never mutate the book.
            Action::Clear => {}
        }
        let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.stats.record_event(event.action, elapsed);
    }

    fn apply_add(&mut self, event: &MboEvent) {
        if event.side == Side::Neutral {
            debug!(
                order_id = event.order_id,
                sequence = event.sequence,
                "add with neutral side ignored"
            );
            return;
        }
        // The stale entry may rest on either side. The feed is the source
        // of truth; the prior order cannot be recovered, so it is displaced
        // by the new one.
        if self.bids.contains(event.order_id) || self.asks.contains(event.order_id) {
            warn!(
                order_id = event.order_id,
                sequence = event.sequence,
                "duplicate add displaces resting order"
            );
            self.stats.record_duplicate_order();
            self.evict(event.order_id);
        }
        let book = match event.side {
            Side::Bid => &mut self.bids,
            _ => &mut self.asks,
        };
        let _ = book.add(event.order_id, event.price, event.size);
    }

    fn apply_cancel(&mut self, event: &MboEvent) {
        // A cancel terminating an open trade sequence carries the aggressor
        // side; the consume lands on the recorded resting side instead.
        if let Some(pending) = self.tracker.take(event.order_id) {
            let consumed = pending.consumed();
            if consumed.is_zero() {
                return;
            }
            let Some(book) = self.side_mut(pending.resting_side) else {
                return;
            };
            if let Err(BookError::UnknownOrder { order_id }) =
                book.consume(event.order_id, consumed)
            {
                warn!(
                    order_id,
                    sequence = event.sequence,
                    "trade sequence terminated for an order not resting"
                );
                self.stats.record_unknown_order();
            }
            return;
        }

        let Some(book) = self.side_mut(event.side) else {
            debug!(
                order_id = event.order_id,
                sequence = event.sequence,
                "cancel with neutral side ignored"
            );
            return;
        };
        match book.cancel(event.order_id, event.size) {
            Ok(_) => {}
            Err(BookError::UnknownOrder { order_id }) => {
                debug!(
                    order_id,
                    sequence = event.sequence,
                    "cancel for unknown order"
                );
                self.stats.record_unknown_order();
            }
            Err(BookError::DuplicateOrder { .. }) => {}
        }
    }

    fn side_mut(&mut self, side: Side) -> Option<&mut SideBook> {
        match side {
            Side::Bid => Some(&mut self.bids),
            Side::Ask => Some(&mut self.asks),
            Side::Neutral => None,
        }
    }

    /// Remove an order id from whichever side currently holds it
    fn evict(&mut self, order_id: u64) {
        if self.bids.cancel(order_id, common::Qty::ZERO).is_err() {
            let _ = self.asks.cancel(order_id, common::Qty::ZERO);
        }
    }

    /// Project the current depth into a fresh record
    #[must_use]
    pub fn snapshot(&self, event: &MboEvent) -> MbpRecord {
        let mut record = MbpRecord::default();
        self.snapshot_into(event, &mut record);
        record
    }

    /// Project the current depth into a caller-provided record, reusing its
    /// buffers. The header mirrors the event; the depth arrays reflect the
    /// book state after the event was applied.
    pub fn snapshot_into(&self, event: &MboEvent, out: &mut MbpRecord) {
        out.ts_recv = event.ts_recv;
        out.ts_event = event.ts_event;
        out.rtype = RTYPE_MBP;
        out.publisher_id = event.publisher_id;
        out.instrument_id = event.instrument_id;
        out.action = event.action;
        out.side = event.side;
        out.depth = 0;
        out.price = event.price;
        out.size = event.size;
        out.flags = event.flags;
        out.ts_in_delta = event.ts_in_delta;
        out.sequence = event.sequence;
        out.bid_levels = self.bids.top_levels();
        out.ask_levels = self.asks.top_levels();
        out.symbol.clone_from(&event.symbol);
        out.order_id = event.order_id;
    }
}
