//! Send workflow.
//!
//! The state machine gating a transfer on the risk verdict of its recipient.

mod error;
mod machine;

pub use error::WorkflowError;
pub use machine::{
	AssessmentTicket, SendWorkflow, TransferBroadcaster, WorkflowStep, WorkflowView,
	MAX_FAILURE_REASON_CHARS,
};
