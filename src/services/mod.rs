//! Core services of the recipient guard.
//!
//! - `activity`: on-chain activity analysis of a recipient
//! - `blockchain`: ledger RPC transports and chain clients
//! - `registry`: external abuse registry client
//! - `risk`: scoring policy and the risk aggregator
//! - `workflow`: the send workflow gated on risk verdicts

pub mod activity;
pub mod blockchain;
pub mod registry;
pub mod risk;
pub mod workflow;
