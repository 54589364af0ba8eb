//! Abuse registry lookups.
//!
//! Queries an external fraud-report registry for an address, accepting the
//! response envelopes the registry is known to use and reporting outages as
//! degraded results instead of errors.

mod client;
mod envelope;
mod error;

pub use client::{AbuseRegistry, AbuseRegistryClient};
pub use envelope::{parse_envelope, ParsedReports};
pub use error::RegistryError;
