//! Market-by-order CSV source
//!
//! Rows carry fifteen comma-separated fields:
//! `ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,
//! size,channel_id,order_id,flags,ts_in_delta,sequence,symbol`.
//! The first line is a header. Malformed rows are dropped and counted so
//! the engine only ever sees well-typed events. Files ending in `.gz` are
//! decompressed transparently.

use crate::timefmt;
use anyhow::{Context, Result};
use common::{Action, MboEvent, Px, Qty, Side};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Number of fields in one MBO row
pub const MBO_FIELD_COUNT: usize = 15;

/// Streaming reader over an MBO CSV file
pub struct MboReader<R> {
    input: R,
    line: String,
    header_skipped: bool,
    rows_read: u64,
    rows_dropped: u64,
}

impl MboReader<Box<dyn BufRead>> {
    /// Open a CSV file, decompressing when the path ends in `.gz`
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open input file {}", path.display()))?;
        let input: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(input))
    }
}

impl<R: BufRead> MboReader<R> {
    /// Wrap an already-open source
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
            header_skipped: false,
            rows_read: 0,
            rows_dropped: 0,
        }
    }

    /// Data rows seen so far (header excluded)
    #[must_use]
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows dropped as malformed so far
    #[must_use]
    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped
    }

    fn read_line(&mut self) -> Result<Option<&str>> {
        self.line.clear();
        let n = self
            .input
            .read_line(&mut self.line)
            .context("failed reading input row")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }
}

enum Row {
    Blank,
    Parsed(MboEvent),
    Malformed,
}

impl<R: BufRead> Iterator for MboReader<R> {
    type Item = Result<MboEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.header_skipped {
                self.header_skipped = true;
                match self.read_line() {
                    Ok(Some(_)) => {}
                    Ok(None) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }
            let row = {
                let line = match self.read_line() {
                    Ok(Some(line)) => line,
                    Ok(None) => return None,
                    Err(e) => return Some(Err(e)),
                };
                if line.is_empty() {
                    Row::Blank
                } else {
                    match parse_row(line) {
                        Some(event) => Row::Parsed(event),
                        None => Row::Malformed,
                    }
                }
            };
            match row {
                Row::Blank => {}
                Row::Parsed(event) => {
                    self.rows_read += 1;
                    return Some(Ok(event));
                }
                Row::Malformed => {
                    self.rows_read += 1;
                    self.rows_dropped += 1;
                    debug!(row = self.rows_read, "dropped malformed row");
                }
            }
        }
    }
}

fn single_char(field: &str) -> Option<char> {
    let mut chars = field.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn parse_price(field: &str) -> Option<Px> {
    // Clear markers may carry an empty price.
    if field.is_empty() {
        return Some(Px::ZERO);
    }
    Px::parse_decimal(field)
}

/// Parse one data row into an event; `None` when any field is malformed
#[must_use]
pub fn parse_row(line: &str) -> Option<MboEvent> {
    let mut fields = [""; MBO_FIELD_COUNT];
    let mut count = 0;
    for field in line.split(',') {
        if count == MBO_FIELD_COUNT {
            return None;
        }
        fields[count] = field;
        count += 1;
    }
    if count != MBO_FIELD_COUNT {
        return None;
    }

    Some(MboEvent {
        ts_recv: timefmt::parse_timestamp(fields[0])?,
        ts_event: timefmt::parse_timestamp(fields[1])?,
        rtype: fields[2].parse().ok()?,
        publisher_id: fields[3].parse().ok()?,
        instrument_id: fields[4].parse().ok()?,
        action: Action::from_char(single_char(fields[5])?)?,
        side: Side::from_char(single_char(fields[6])?)?,
        price: parse_price(fields[7])?,
        size: fields[8].parse().ok().map(Qty::new)?,
        channel_id: fields[9].parse().ok()?,
        order_id: fields[10].parse().ok()?,
        flags: fields[11].parse().ok()?,
        ts_in_delta: fields[12].parse().ok()?,
        sequence: fields[13].parse().ok()?,
        symbol: fields[14].to_string(),
    })
}
