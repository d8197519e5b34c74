//! Command-line driver: rebuild MBP-10 depth records from an MBO event file

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use feeds::Processor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mbp-rebuild")]
#[command(about = "Rebuild MBP-10 depth records from an MBO event stream")]
#[command(version)]
struct Cli {
    /// Input MBO CSV file (plain or gzip-compressed)
    input: PathBuf,

    /// Output file for the MBP records
    #[arg(long, default_value = "output_mbp.csv")]
    output: PathBuf,

    /// Suppress the end-of-run statistics report
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut processor = Processor::new();
    let report = processor.run(&cli.input, &cli.output)?;

    if !cli.quiet {
        print!("{}", report.stats.format_report());
        println!(
            "Rows read: {} ({} dropped as malformed)",
            report.rows_read, report.rows_dropped
        );
        println!("Records written: {}", report.records_written);
        println!(
            "Wall time: {}ms ({:.0} records/second)",
            report.elapsed.as_millis(),
            report.throughput()
        );
        println!("Output written to: {}", cli.output.display());
    }

    Ok(())
}
