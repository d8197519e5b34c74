//! Trade-sequence tracking
//!
//! A trade arrives as a triplet sharing one order id: a `T` event, zero or
//! more `F` fills, and a terminating `C`. The `T` side names the aggressor,
//! so the consumed size must land on the opposite (resting) side of the
//! book. This table holds the open sequences between the `T` and its `C`.

use common::{MboEvent, Px, Qty, Side, Ts};
use rustc_hash::FxHashMap;
use tracing::warn;

/// An open trade sequence awaiting its terminating cancel
#[derive(Debug, Clone, Copy)]
pub struct PendingTrade {
    /// Side of the book the resting order lives on
    pub resting_side: Side,
    /// Price reported by the trade event
    pub price: Px,
    /// Size reported by the trade event
    pub trade_size: Qty,
    /// Accumulated fill size from `F` events
    pub filled: Qty,
    /// Event timestamp of the originating trade
    pub ts_event: Ts,
}

impl PendingTrade {
    /// Net size to remove from the resting order when the sequence
    /// terminates: the accumulated fills when any were reported, else the
    /// trade size.
    #[must_use]
    pub fn consumed(&self) -> Qty {
        if self.filled.is_zero() {
            self.trade_size
        } else {
            self.filled
        }
    }
}

/// Table of open trade sequences, keyed by order id
#[derive(Debug, Default)]
pub struct TradeTracker {
    pending: FxHashMap<u64, PendingTrade>,
}

impl TradeTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a sequence for a trade event.
    ///
    /// Returns `false` when the aggressor side is neutral, in which case no
    /// resting side can be named and the event is left untracked. A second
    /// trade for an already-open order id replaces the entry.
    pub fn observe_trade(&mut self, event: &MboEvent) -> bool {
        let Some(resting_side) = event.side.opposite() else {
            warn!(
                order_id = event.order_id,
                sequence = event.sequence,
                "trade with neutral aggressor side cannot be attributed"
            );
            return false;
        };
        let entry = PendingTrade {
            resting_side,
            price: event.price,
            trade_size: event.size,
            filled: Qty::ZERO,
            ts_event: event.ts_event,
        };
        if self.pending.insert(event.order_id, entry).is_some() {
            warn!(
                order_id = event.order_id,
                sequence = event.sequence,
                "new trade replaces an open trade sequence"
            );
        }
        true
    }

    /// Accumulate a fill into its open sequence.
    ///
    /// Returns `false` when no sequence is open for the order id.
    pub fn observe_fill(&mut self, event: &MboEvent) -> bool {
        match self.pending.get_mut(&event.order_id) {
            Some(entry) => {
                entry.filled = entry.filled.saturating_add(event.size);
                true
            }
            None => false,
        }
    }

    /// Close and return the sequence for an order id, if one is open
    pub fn take(&mut self, order_id: u64) -> Option<PendingTrade> {
        self.pending.remove(&order_id)
    }

    /// Whether a sequence is open for an order id
    #[must_use]
    pub fn contains(&self, order_id: u64) -> bool {
        self.pending.contains_key(&order_id)
    }

    /// Number of open sequences
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no sequences are open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop all open sequences
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
