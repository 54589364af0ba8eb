//! Chain activity analysis.
//!
//! Turns a ledger snapshot of an address (balance, recent transactions) into
//! the behavioral flags the risk aggregator scores.

mod analyzer;

pub use analyzer::{ActivityAnalyzer, ChainActivityAnalyzer};
