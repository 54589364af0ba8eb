//! Repository implementations for per-user data.
//!
//! This module contains the storage seam for user records and the services
//! built on top of it:
//!
//! - `user`: user record storage (file and memory backends)
//! - `blocklist`: the user's address blocklist
//! - `contacts`: the user's trusted contacts
//! - `report`: community fraud reports per address
//! - `receipt`: the audit trail of completed transfers

mod blocklist;
mod contacts;
mod error;
mod receipt;
mod report;
mod storage;
mod user;

pub use blocklist::{BlocklistChecker, BlocklistService, DUPLICATE_BLOCKLIST_MESSAGE};
pub use contacts::{TrustedContactService, DUPLICATE_CONTACT_MESSAGE};
pub use error::RepositoryError;
pub use receipt::{FileReceiptStore, NoopReceiptSink, ReceiptSink};
pub use report::{
	FileFraudReportRepository, FraudReportRepositoryTrait, FraudReportService,
	MemoryFraudReportRepository, ReportMutation, DEFAULT_REPORT_LIST_LIMIT,
	DUPLICATE_REPORT_MESSAGE,
};
pub use storage::storage_key;
pub use user::{
	FileUserRepository, MemoryUserRepository, RecordChange, RecordMutation, UserRepositoryTrait,
};
