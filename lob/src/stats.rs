//! Processing statistics
//!
//! Monotone counters bumped by the single applying thread and readable from
//! monitor threads without coordination. Reads across counters are not a
//! consistent cut; a monitor may observe a slightly stale tuple.

use common::Action;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter block for one book
#[derive(Debug, Default)]
pub struct BookStats {
    events: AtomicU64,
    orders_added: AtomicU64,
    orders_cancelled: AtomicU64,
    trades_processed: AtomicU64,
    unknown_orders: AtomicU64,
    duplicate_orders: AtomicU64,
    processing_ns: AtomicU64,
}

impl BookStats {
    /// Create a zeroed counter block
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one applied event and its action
    #[inline]
    pub fn record_event(&self, action: Action, elapsed_ns: u64) {
        self.events.fetch_add(1, Ordering::Relaxed);
        self.processing_ns.fetch_add(elapsed_ns, Ordering::Relaxed);
        match action {
            Action::Add => {
                self.orders_added.fetch_add(1, Ordering::Relaxed);
            }
            Action::Cancel => {
                self.orders_cancelled.fetch_add(1, Ordering::Relaxed);
            }
            Action::Trade => {
                self.trades_processed.fetch_add(1, Ordering::Relaxed);
            }
            Action::Fill | Action::Clear => {}
        }
    }

    /// Count a cancel, fill, or trade terminator naming an unknown order
    #[inline]
    pub fn record_unknown_order(&self) {
        self.unknown_orders.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an add that displaced an already-resting order id
    #[inline]
    pub fn record_duplicate_order(&self) {
        self.duplicate_orders.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters into a plain-value snapshot
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events: self.events.load(Ordering::Acquire),
            orders_added: self.orders_added.load(Ordering::Acquire),
            orders_cancelled: self.orders_cancelled.load(Ordering::Acquire),
            trades_processed: self.trades_processed.load(Ordering::Acquire),
            unknown_orders: self.unknown_orders.load(Ordering::Acquire),
            duplicate_orders: self.duplicate_orders.load(Ordering::Acquire),
            processing_ns: self.processing_ns.load(Ordering::Acquire),
        }
    }

    /// Reset every counter to zero
    pub fn reset(&self) {
        self.events.store(0, Ordering::Release);
        self.orders_added.store(0, Ordering::Release);
        self.orders_cancelled.store(0, Ordering::Release);
        self.trades_processed.store(0, Ordering::Release);
        self.unknown_orders.store(0, Ordering::Release);
        self.duplicate_orders.store(0, Ordering::Release);
        self.processing_ns.store(0, Ordering::Release);
    }
}

/// Plain-value view of the counters at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events applied
    pub events: u64,
    /// Add actions seen
    pub orders_added: u64,
    /// Cancel actions seen
    pub orders_cancelled: u64,
    /// Trade actions seen
    pub trades_processed: u64,
    /// Cancels/fills/terminators naming unknown orders
    pub unknown_orders: u64,
    /// Adds that displaced a resting order id
    pub duplicate_orders: u64,
    /// Cumulative apply time in nanoseconds
    pub processing_ns: u64,
}

impl StatsSnapshot {
    /// Average apply time per event in nanoseconds
    #[must_use]
    pub fn avg_processing_ns(&self) -> u64 {
        if self.events == 0 {
            0
        } else {
            self.processing_ns / self.events
        }
    }

    /// Multi-line human-readable report
    #[must_use]
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Reconstruction Statistics ===\n");
        report.push_str(&format!("Events processed: {}\n", self.events));
        report.push_str(&format!(
            "Orders: {} added, {} cancelled\n",
            self.orders_added, self.orders_cancelled
        ));
        report.push_str(&format!("Trades processed: {}\n", self.trades_processed));
        report.push_str(&format!(
            "Anomalies: {} unknown orders, {} duplicate adds\n",
            self.unknown_orders, self.duplicate_orders
        ));
        report.push_str(&format!(
            "Processing time: {}ns total, {}ns/event average\n",
            self.processing_ns,
            self.avg_processing_ns()
        ));
        report
    }
}
