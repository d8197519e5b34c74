//! Market-by-price CSV sink
//!
//! Emits a header row and then one 76-column row per record: a leading
//! empty field, thirteen header fields, ten bid `px,sz,ct` triples, ten ask
//! triples, then symbol and order id. Prices carry exactly six fractional
//! digits; unused depth slots emit `0.000000,0,0`.

use crate::timefmt;
use anyhow::{Context, Result};
use common::{DepthLevel, MbpRecord, DEPTH};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Buffered writer for MBP records
pub struct MbpWriter<W: Write> {
    out: W,
    row: String,
    records: u64,
}

impl MbpWriter<BufWriter<File>> {
    /// Create (truncating) the output file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("cannot create output file {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> MbpWriter<W> {
    /// Wrap an already-open sink
    pub fn new(out: W) -> Self {
        Self {
            out,
            row: String::with_capacity(512),
            records: 0,
        }
    }

    /// Records written so far
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Write the column header row
    pub fn write_header(&mut self) -> Result<()> {
        self.row.clear();
        self.row
            .push_str(",ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,depth,price,size,flags,ts_in_delta,sequence");
        for i in 0..DEPTH {
            let _ = write!(self.row, ",bid_px_{i:02},bid_sz_{i:02},bid_ct_{i:02}");
        }
        for i in 0..DEPTH {
            let _ = write!(self.row, ",ask_px_{i:02},ask_sz_{i:02},ask_ct_{i:02}");
        }
        self.row.push_str(",symbol,order_id\n");
        self.out
            .write_all(self.row.as_bytes())
            .context("failed writing output header")
    }

    /// Write one record row
    pub fn write_record(&mut self, record: &MbpRecord) -> Result<()> {
        self.row.clear();
        self.row.push(',');
        timefmt::write_timestamp(&mut self.row, record.ts_recv);
        self.row.push(',');
        timefmt::write_timestamp(&mut self.row, record.ts_event);
        let _ = write!(
            self.row,
            ",{},{},{},{},{},{},{},{},{},{},{}",
            record.rtype,
            record.publisher_id,
            record.instrument_id,
            record.action.as_char(),
            record.side.as_char(),
            record.depth,
            record.price,
            record.size,
            record.flags,
            record.ts_in_delta,
            record.sequence,
        );
        for level in &record.bid_levels {
            write_level(&mut self.row, level);
        }
        for level in &record.ask_levels {
            write_level(&mut self.row, level);
        }
        let _ = write!(self.row, ",{},{}", record.symbol, record.order_id);
        self.row.push('\n');

        self.out
            .write_all(self.row.as_bytes())
            .context("failed writing output row")?;
        self.records += 1;
        Ok(())
    }

    /// Flush buffered rows and return the count written
    pub fn finish(mut self) -> Result<u64> {
        self.out.flush().context("failed flushing output")?;
        Ok(self.records)
    }
}

fn write_level(row: &mut String, level: &DepthLevel) {
    let _ = write!(row, ",{},{},{}", level.price, level.size, level.count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Action, Px, Qty, Side, RTYPE_MBP};

    fn sample_record() -> MbpRecord {
        let mut record = MbpRecord {
            ts_recv: crate::timefmt::parse_timestamp("2025-07-17T08:05:03.360677248Z").unwrap(),
            ts_event: crate::timefmt::parse_timestamp("2025-07-17T08:05:03.360018154Z").unwrap(),
            rtype: RTYPE_MBP,
            publisher_id: 2,
            instrument_id: 1108,
            action: Action::Add,
            side: Side::Bid,
            depth: 0,
            price: Px::from_i64(5_510_000),
            size: Qty::new(100),
            flags: 130,
            ts_in_delta: 165,
            sequence: 851_012,
            symbol: "ARL".to_string(),
            order_id: 817_593,
            ..MbpRecord::default()
        };
        record.bid_levels[0] = DepthLevel {
            price: Px::from_i64(5_510_000),
            size: 100,
            count: 1,
        };
        record
    }

    #[test]
    fn header_has_expected_columns() {
        let mut writer = MbpWriter::new(Vec::new());
        writer.write_header().unwrap();
        let out = String::from_utf8(writer.out).unwrap();

        assert!(out.starts_with(",ts_recv,ts_event,rtype,"));
        assert!(out.contains(",bid_px_00,bid_sz_00,bid_ct_00,"));
        assert!(out.contains(",bid_px_09,bid_sz_09,bid_ct_09,"));
        assert!(out.contains(",ask_px_09,ask_sz_09,ask_ct_09,"));
        assert!(out.trim_end().ends_with(",symbol,order_id"));
        assert_eq!(out.trim_end().split(',').count(), 76);
    }

    #[test]
    fn record_row_layout() {
        let mut writer = MbpWriter::new(Vec::new());
        writer.write_record(&sample_record()).unwrap();
        let out = String::from_utf8(writer.out).unwrap();

        let expected = concat!(
            ",2025-07-17T08:05:03.360677248Z,2025-07-17T08:05:03.360018154Z,",
            "10,2,1108,A,B,0,5.510000,100,130,165,851012",
            ",5.510000,100,1",
            ",0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0",
            ",0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0",
            ",0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0",
            ",0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0,0.000000,0,0",
            ",ARL,817593\n"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn row_field_count_is_stable() {
        let mut writer = MbpWriter::new(Vec::new());
        writer.write_record(&sample_record()).unwrap();
        let out = String::from_utf8(writer.out).unwrap();
        assert_eq!(out.trim_end().split(',').count(), 76);
    }

    #[test]
    fn header_fields_reparse_identically() {
        let record = sample_record();
        let mut writer = MbpWriter::new(Vec::new());
        writer.write_record(&record).unwrap();
        let out = String::from_utf8(writer.out).unwrap();
        let fields: Vec<&str> = out.trim_end().split(',').collect();

        assert_eq!(fields[0], "");
        assert_eq!(
            crate::timefmt::parse_timestamp(fields[1]),
            Some(record.ts_recv)
        );
        assert_eq!(
            crate::timefmt::parse_timestamp(fields[2]),
            Some(record.ts_event)
        );
        assert_eq!(fields[3].parse::<u16>().unwrap(), record.rtype);
        assert_eq!(fields[4].parse::<u16>().unwrap(), record.publisher_id);
        assert_eq!(fields[5].parse::<u32>().unwrap(), record.instrument_id);
        assert_eq!(fields[6].chars().next().and_then(Action::from_char), Some(record.action));
        assert_eq!(fields[7].chars().next().and_then(Side::from_char), Some(record.side));
        assert_eq!(fields[8].parse::<u8>().unwrap(), record.depth);
        assert_eq!(Px::parse_decimal(fields[9]), Some(record.price));
        assert_eq!(fields[10].parse::<u32>().map(Qty::new).unwrap(), record.size);
        assert_eq!(fields[11].parse::<u32>().unwrap(), record.flags);
        assert_eq!(fields[12].parse::<i32>().unwrap(), record.ts_in_delta);
        assert_eq!(fields[13].parse::<u64>().unwrap(), record.sequence);
        assert_eq!(fields[74], record.symbol);
        assert_eq!(fields[75].parse::<u64>().unwrap(), record.order_id);
    }

    #[test]
    fn finish_reports_count() {
        let mut writer = MbpWriter::new(Vec::new());
        writer.write_header().unwrap();
        writer.write_record(&sample_record()).unwrap();
        writer.write_record(&sample_record()).unwrap();
        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.finish().unwrap(), 2);
    }
}
