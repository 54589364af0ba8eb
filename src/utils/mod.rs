//! Utility modules for common functionality.
//!
//! - address: Normalization of raw recipient input into validated addresses
//! - http: Retryable HTTP client construction
//! - logging: Logging utilities

pub mod address;
pub mod http;
pub mod logging;

pub use address::{extract_candidate, normalize, AddressError};
