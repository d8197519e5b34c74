//! Common types for the market depth reconstruction pipeline

#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod market;
pub mod types;

pub use market::*;
pub use types::*;
