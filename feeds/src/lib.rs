//! External collaborators for the reconstruction engine
//!
//! - `reader`: market-by-order CSV source (plain or gzip-compressed)
//! - `writer`: market-by-price CSV sink
//! - `timefmt`: ISO-8601 nanosecond timestamp codec
//! - `processor`: the read → apply → snapshot → write driver

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod processor;
pub mod reader;
pub mod timefmt;
pub mod writer;

pub use processor::{Processor, ProcessorReport};
pub use reader::MboReader;
pub use writer::MbpWriter;
