//! Recipient risk screening for wallet transfers.
//!
//! Before a transfer is signed, the recipient address is checked against the
//! user's own blocklist, an external abuse registry and its on-chain activity.
//! The resulting [`models::RiskVerdict`] gates the send workflow.
//!
//! # Components
//! - `models`: domain types and configuration
//! - `repositories`: per-user storage (blocklist, trusted contacts, receipts)
//!   and community fraud reports
//! - `services`: ledger clients, registry client, risk aggregation, workflow
//! - `utils`: address normalization, HTTP client construction, logging
//! - `bootstrap`: wiring services from configuration

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
