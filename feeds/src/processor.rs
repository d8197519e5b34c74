//! Reconstruction driver: stream events through a book into depth records

use crate::reader::MboReader;
use crate::writer::MbpWriter;
use anyhow::Result;
use common::MbpRecord;
use lob::{Book, StatsSnapshot};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one processing run
#[derive(Debug, Clone)]
pub struct ProcessorReport {
    /// Data rows seen in the input (header excluded)
    pub rows_read: u64,
    /// Rows dropped as malformed
    pub rows_dropped: u64,
    /// Depth records written
    pub records_written: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Book statistics at end of run
    pub stats: StatsSnapshot,
}

impl ProcessorReport {
    /// Records written per second of wall time
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_written as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives one book over an input file, emitting one depth record per event
#[derive(Debug, Default)]
pub struct Processor {
    book: Book,
}

impl Processor {
    /// Create a processor with an empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The book being maintained
    #[must_use]
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Process `input` into `output`.
    ///
    /// Every well-formed input event is applied and projected; the snapshot
    /// written for an event reflects the book state immediately after it.
    pub fn run(&mut self, input: &Path, output: &Path) -> Result<ProcessorReport> {
        info!(input = %input.display(), output = %output.display(), "starting reconstruction");
        let started = Instant::now();

        let mut reader = MboReader::open(input)?;
        let mut writer = MbpWriter::create(output)?;
        writer.write_header()?;

        let mut record = MbpRecord::default();
        for next in reader.by_ref() {
            let event = next?;
            self.book.apply(&event);
            self.book.snapshot_into(&event, &mut record);
            writer.write_record(&record)?;
        }

        let rows_read = reader.rows_read();
        let rows_dropped = reader.rows_dropped();
        let records_written = writer.finish()?;
        let elapsed = started.elapsed();

        let report = ProcessorReport {
            rows_read,
            rows_dropped,
            records_written,
            elapsed,
            stats: self.book.stats().snapshot(),
        };
        info!(
            rows_read,
            rows_dropped,
            records_written,
            elapsed_ms = elapsed.as_millis() as u64,
            "reconstruction finished"
        );
        Ok(report)
    }
}
