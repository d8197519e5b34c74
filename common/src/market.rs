//! Wire-model records for the MBO input and MBP-10 output streams

use crate::{Px, Qty, Ts};
use serde::{Deserialize, Serialize};

/// Number of depth levels carried per side in an MBP record
pub const DEPTH: usize = 10;

/// Record type tag for market-by-order input rows
pub const RTYPE_MBO: u16 = 160;

/// Record type tag for market-by-price output rows
pub const RTYPE_MBP: u16 = 10;

/// Book side of an order or event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Bid,
    /// Sell side (asks/offers)
    Ask,
    /// No side (trades with unattributed aggressor, clear markers)
    Neutral,
}

impl Side {
    /// Parse from the single-character wire form `B|A|N`
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(Self::Bid),
            'A' => Some(Self::Ask),
            'N' => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Single-character wire form
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Bid => 'B',
            Self::Ask => 'A',
            Self::Neutral => 'N',
        }
    }

    /// The opposite book side; `None` for neutral
    #[must_use]
    pub const fn opposite(self) -> Option<Self> {
        match self {
            Self::Bid => Some(Self::Ask),
            Self::Ask => Some(Self::Bid),
            Self::Neutral => None,
        }
    }
}

/// Event action in the order stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// New order added to the book
    Add,
    /// Order cancelled (possibly partially)
    Cancel,
    /// Trade reported against a resting order
    Trade,
    /// Fill portion of a trade sequence
    Fill,
    /// Book clear marker
    Clear,
}

impl Action {
    /// Parse from the single-character wire form `A|C|T|F|R`
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Add),
            'C' => Some(Self::Cancel),
            'T' => Some(Self::Trade),
            'F' => Some(Self::Fill),
            'R' => Some(Self::Clear),
            _ => None,
        }
    }

    /// Single-character wire form
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Add => 'A',
            Self::Cancel => 'C',
            Self::Trade => 'T',
            Self::Fill => 'F',
            Self::Clear => 'R',
        }
    }
}

/// One parsed market-by-order input event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MboEvent {
    /// Receive timestamp
    pub ts_recv: Ts,
    /// Exchange event timestamp
    pub ts_event: Ts,
    /// Record type tag as it appeared on the wire
    pub rtype: u16,
    /// Publisher identifier
    pub publisher_id: u16,
    /// Instrument identifier
    pub instrument_id: u32,
    /// Event action
    pub action: Action,
    /// Book side (for trades, the aggressor side)
    pub side: Side,
    /// Order price
    pub price: Px,
    /// Order/trade size
    pub size: Qty,
    /// Feed channel
    pub channel_id: u16,
    /// Order identifier
    pub order_id: u64,
    /// Venue flags
    pub flags: u32,
    /// Capture-to-send delta in nanoseconds
    pub ts_in_delta: i32,
    /// Venue sequence number
    pub sequence: u64,
    /// Instrument symbol
    pub symbol: String,
}

/// One aggregated price level in a depth snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Level price (zero in unused slots)
    pub price: Px,
    /// Total resting size across all orders at this price
    pub size: u64,
    /// Number of resting orders at this price
    pub count: u32,
}

impl DepthLevel {
    /// The all-zero sentinel marking an unused depth slot
    pub const EMPTY: Self = Self {
        price: Px::ZERO,
        size: 0,
        count: 0,
    };

    /// Whether this slot holds a real level
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// One market-by-price output record: event header plus both depth arrays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MbpRecord {
    /// Receive timestamp, mirrored from the triggering event
    pub ts_recv: Ts,
    /// Exchange event timestamp, mirrored from the triggering event
    pub ts_event: Ts,
    /// Record type tag (always [`RTYPE_MBP`])
    pub rtype: u16,
    /// Publisher identifier
    pub publisher_id: u16,
    /// Instrument identifier
    pub instrument_id: u32,
    /// Action of the triggering event
    pub action: Action,
    /// Side of the triggering event
    pub side: Side,
    /// Reserved depth indicator, always zero
    pub depth: u8,
    /// Price of the triggering event
    pub price: Px,
    /// Size of the triggering event
    pub size: Qty,
    /// Venue flags
    pub flags: u32,
    /// Capture-to-send delta in nanoseconds
    pub ts_in_delta: i32,
    /// Venue sequence number
    pub sequence: u64,
    /// Top bid levels, best (highest) first
    pub bid_levels: [DepthLevel; DEPTH],
    /// Top ask levels, best (lowest) first
    pub ask_levels: [DepthLevel; DEPTH],
    /// Instrument symbol
    pub symbol: String,
    /// Order identifier of the triggering event
    pub order_id: u64,
}

impl Default for MbpRecord {
    fn default() -> Self {
        Self {
            ts_recv: Ts::ZERO,
            ts_event: Ts::ZERO,
            rtype: RTYPE_MBP,
            publisher_id: 0,
            instrument_id: 0,
            action: Action::Clear,
            side: Side::Neutral,
            depth: 0,
            price: Px::ZERO,
            size: Qty::ZERO,
            flags: 0,
            ts_in_delta: 0,
            sequence: 0,
            bid_levels: [DepthLevel::EMPTY; DEPTH],
            ask_levels: [DepthLevel::EMPTY; DEPTH],
            symbol: String::new(),
            order_id: 0,
        }
    }
}
