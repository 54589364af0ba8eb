//! Send workflow state machine.
//!
//! One instance drives one user's transfer from recipient entry to result:
//!
//! ```text
//! AddressEntry -> RiskReview -> AmountEntry -> Submitting -> Result
//!       ^              |             |
//!       +--------------+-------------+   (back / reset)
//! ```
//!
//! Risk checks are tagged with an [`AssessmentTicket`]. Changing the recipient,
//! going back or resetting invalidates every outstanding ticket, so a verdict
//! that arrives late is dropped instead of being applied to the wrong
//! recipient. The transfer is re-authorized against the current verdict when
//! submission starts, not only when the amount step is entered.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::{
	models::{
		Address, Chain, Receipt, RiskVerdict, SourceWallet, Token, TransferOutcome,
		TransferRequest,
	},
	repositories::{BlocklistChecker, ReceiptSink},
	services::{
		activity::ActivityAnalyzer, registry::AbuseRegistry, risk::RiskAggregator,
		workflow::WorkflowError,
	},
	utils::normalize,
};

/// Longest failure message kept in a [`TransferOutcome::Failed`]
pub const MAX_FAILURE_REASON_CHARS: usize = 200;

/// Signs and broadcasts a transfer through the user's wallet
#[async_trait]
pub trait TransferBroadcaster: Send + Sync {
	/// Returns the ledger reference (signature or hash) of the broadcast transfer
	async fn broadcast(&self, request: &TransferRequest) -> Result<String, anyhow::Error>;
}

/// Steps of the send workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStep {
	AddressEntry,
	RiskReview,
	AmountEntry,
	Submitting,
	Result,
}

impl WorkflowStep {
	/// Position shown in the step indicator. Submission and its result share
	/// the last position.
	pub fn number(&self) -> u8 {
		match self {
			WorkflowStep::AddressEntry => 1,
			WorkflowStep::RiskReview => 2,
			WorkflowStep::AmountEntry => 3,
			WorkflowStep::Submitting | WorkflowStep::Result => 4,
		}
	}
}

impl fmt::Display for WorkflowStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			WorkflowStep::AddressEntry => "address entry",
			WorkflowStep::RiskReview => "risk review",
			WorkflowStep::AmountEntry => "amount entry",
			WorkflowStep::Submitting => "submitting",
			WorkflowStep::Result => "result",
		};
		write!(f, "{}", name)
	}
}

/// Tag of one in-flight risk check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentTicket {
	generation: u64,
	address: Address,
}

impl AssessmentTicket {
	/// The normalized recipient the check was issued for
	pub fn address(&self) -> &Address {
		&self.address
	}
}

/// Snapshot of the workflow for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
	pub step: WorkflowStep,
	pub step_number: u8,
	pub checking: bool,
	pub address: Option<Address>,
	pub verdict: Option<RiskVerdict>,
	pub can_proceed: bool,
	pub wallet: Option<SourceWallet>,
	pub amount: Option<Decimal>,
	pub max_sendable: Option<Decimal>,
	pub error: Option<String>,
	pub outcome: Option<TransferOutcome>,
}

/// Collapses a broadcast error into a single bounded line
fn sanitize_failure(reason: &str) -> String {
	let line = reason
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ");
	if line.is_empty() {
		return "Transfer failed".to_string();
	}
	if line.chars().count() <= MAX_FAILURE_REASON_CHARS {
		return line;
	}
	let mut truncated: String = line.chars().take(MAX_FAILURE_REASON_CHARS).collect();
	truncated.push_str("...");
	truncated
}

/// Per-session send workflow
#[derive(Debug)]
pub struct SendWorkflow {
	user_id: String,
	chain: Chain,
	step: WorkflowStep,
	generation: u64,
	pending: Option<AssessmentTicket>,
	address: Option<Address>,
	verdict: Option<RiskVerdict>,
	wallet: Option<SourceWallet>,
	amount: Option<Decimal>,
	token: Token,
	error: Option<String>,
	outcome: Option<TransferOutcome>,
}

impl SendWorkflow {
	/// Creates a workflow for `user_id` sending on `chain`
	pub fn new(user_id: impl Into<String>, chain: Chain) -> Self {
		Self {
			user_id: user_id.into(),
			chain,
			step: WorkflowStep::AddressEntry,
			generation: 0,
			pending: None,
			address: None,
			verdict: None,
			wallet: None,
			amount: None,
			token: Token::Native,
			error: None,
			outcome: None,
		}
	}

	pub fn user_id(&self) -> &str {
		&self.user_id
	}

	pub fn chain(&self) -> Chain {
		self.chain
	}

	pub fn step(&self) -> WorkflowStep {
		self.step
	}

	pub fn address(&self) -> Option<&Address> {
		self.address.as_ref()
	}

	pub fn verdict(&self) -> Option<&RiskVerdict> {
		self.verdict.as_ref()
	}

	pub fn wallet(&self) -> Option<&SourceWallet> {
		self.wallet.as_ref()
	}

	pub fn amount(&self) -> Option<Decimal> {
		self.amount
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn outcome(&self) -> Option<&TransferOutcome> {
		self.outcome.as_ref()
	}

	/// Whether a risk check is outstanding
	pub fn is_checking(&self) -> bool {
		self.pending.is_some()
	}

	fn reject(&mut self, error: WorkflowError) -> WorkflowError {
		self.error = Some(error.to_string());
		error
	}

	fn require_step(
		&mut self,
		action: &'static str,
		allowed: &[WorkflowStep],
	) -> Result<(), WorkflowError> {
		if allowed.contains(&self.step) {
			Ok(())
		} else {
			let step = self.step;
			Err(self.reject(WorkflowError::invalid_state(action, step)))
		}
	}

	fn invalidate_checks(&mut self) {
		self.generation += 1;
		self.pending = None;
		self.verdict = None;
	}

	/// Checks that the verdict on hand authorizes a transfer to the current
	/// recipient
	fn authorization(&self) -> Result<(), WorkflowError> {
		let (Some(address), Some(verdict)) = (&self.address, &self.verdict) else {
			return Err(WorkflowError::no_verdict());
		};
		if verdict.address() != address {
			return Err(WorkflowError::stale_verdict());
		}
		if !verdict.authorizes(address) {
			return Err(WorkflowError::unsafe_verdict(
				verdict.risk_level(),
				verdict.risk_score(),
			));
		}
		Ok(())
	}

	fn wallet_matches_recipient(&self) -> Result<(), WorkflowError> {
		match (&self.wallet, &self.address) {
			(Some(wallet), Some(address)) if wallet.chain() != address.chain() => {
				Err(WorkflowError::chain_mismatch(format!(
					"{} wallet, {} recipient",
					wallet.chain(),
					address.chain()
				)))
			}
			_ => Ok(()),
		}
	}

	/// Normalizes the recipient input and opens a risk check for it.
	///
	/// Available from address entry and risk review. Any earlier check is
	/// invalidated. Invalid input leaves the workflow where it was.
	pub fn begin_assessment(&mut self, input: &str) -> Result<AssessmentTicket, WorkflowError> {
		self.require_step(
			"check a recipient",
			&[WorkflowStep::AddressEntry, WorkflowStep::RiskReview],
		)?;

		let address = match normalize(input, self.chain) {
			Ok(address) => address,
			Err(e) => return Err(self.reject(WorkflowError::invalid_address(e))),
		};

		self.invalidate_checks();
		self.step = WorkflowStep::AddressEntry;
		self.address = Some(address.clone());
		self.amount = None;
		self.error = None;

		let ticket = AssessmentTicket {
			generation: self.generation,
			address,
		};
		self.pending = Some(ticket.clone());
		debug!(address = %ticket.address, generation = ticket.generation, "risk check started");
		Ok(ticket)
	}

	/// Applies the verdict of a risk check.
	///
	/// Returns `false` and leaves the workflow untouched when the ticket is no
	/// longer the outstanding one or the verdict is for another address.
	pub fn apply_verdict(&mut self, ticket: AssessmentTicket, verdict: RiskVerdict) -> bool {
		if self.pending.as_ref() != Some(&ticket) || verdict.address() != &ticket.address {
			debug!(
				address = %ticket.address,
				generation = ticket.generation,
				"discarding verdict of a superseded risk check"
			);
			return false;
		}

		self.pending = None;
		self.verdict = Some(verdict);
		self.step = WorkflowStep::RiskReview;
		true
	}

	/// Normalizes `input`, assesses it and moves to risk review
	#[instrument(skip(self, aggregator, input), fields(user_id = %self.user_id))]
	pub async fn check_recipient<B, R, A>(
		&mut self,
		aggregator: &RiskAggregator<B, R, A>,
		input: &str,
	) -> Result<&RiskVerdict, WorkflowError>
	where
		B: BlocklistChecker,
		R: AbuseRegistry,
		A: ActivityAnalyzer,
	{
		let ticket = self.begin_assessment(input)?;
		let verdict = aggregator.assess(&self.user_id, ticket.address()).await;
		self.apply_verdict(ticket, verdict);
		self.verdict.as_ref().ok_or_else(WorkflowError::no_verdict)
	}

	/// Returns to address entry, discarding the verdict
	pub fn back_to_address(&mut self) -> Result<(), WorkflowError> {
		self.require_step(
			"go back",
			&[
				WorkflowStep::AddressEntry,
				WorkflowStep::RiskReview,
				WorkflowStep::AmountEntry,
			],
		)?;
		self.invalidate_checks();
		self.step = WorkflowStep::AddressEntry;
		self.amount = None;
		self.error = None;
		Ok(())
	}

	/// Moves to amount entry. Only a safe, unblocked verdict for the current
	/// recipient allows this.
	pub fn proceed_to_amount(&mut self) -> Result<(), WorkflowError> {
		self.require_step("enter an amount", &[WorkflowStep::RiskReview])?;
		if let Err(e) = self.authorization() {
			return Err(self.reject(e));
		}
		self.step = WorkflowStep::AmountEntry;
		self.error = None;
		Ok(())
	}

	/// Selects the wallet to send from
	pub fn select_wallet(&mut self, wallet: SourceWallet) -> Result<(), WorkflowError> {
		self.require_step(
			"select a wallet",
			&[
				WorkflowStep::AddressEntry,
				WorkflowStep::RiskReview,
				WorkflowStep::AmountEntry,
			],
		)?;
		if wallet.chain() != self.chain {
			let error = WorkflowError::chain_mismatch(format!(
				"{} wallet, {} workflow",
				wallet.chain(),
				self.chain
			));
			return Err(self.reject(error));
		}
		self.wallet = Some(wallet);
		self.error = None;
		Ok(())
	}

	/// Sets the amount in whole native tokens
	pub fn set_amount(&mut self, amount: Decimal) -> Result<(), WorkflowError> {
		self.require_step("enter an amount", &[WorkflowStep::AmountEntry])?;
		if amount <= Decimal::ZERO {
			return Err(self.reject(WorkflowError::invalid_amount(
				"amount must be greater than zero",
			)));
		}
		self.amount = Some(amount);
		self.error = None;
		Ok(())
	}

	/// Sets the amount to the selected wallet's max sendable balance
	pub fn use_max_amount(&mut self) -> Result<Decimal, WorkflowError> {
		let max = match &self.wallet {
			Some(wallet) => wallet.max_sendable(),
			None => return Err(self.reject(WorkflowError::no_wallet())),
		};
		self.set_amount(max)?;
		Ok(max)
	}

	fn prepare_request(&self) -> Result<TransferRequest, WorkflowError> {
		self.authorization()?;
		let Some(wallet) = &self.wallet else {
			return Err(WorkflowError::no_wallet());
		};
		self.wallet_matches_recipient()?;
		let Some(amount) = self.amount else {
			return Err(WorkflowError::invalid_amount("enter an amount"));
		};
		if amount <= Decimal::ZERO {
			return Err(WorkflowError::invalid_amount(
				"amount must be greater than zero",
			));
		}
		if amount > wallet.balance {
			return Err(WorkflowError::insufficient_balance(amount, wallet.balance));
		}
		let Some(to) = self.address.clone() else {
			return Err(WorkflowError::no_verdict());
		};

		Ok(TransferRequest {
			from: wallet.clone(),
			to,
			amount,
			token: self.token,
		})
	}

	/// Validates the transfer and enters the submitting step.
	///
	/// The returned request is what the signer has to broadcast; report the
	/// result through [`SendWorkflow::complete_submission`].
	pub fn begin_submission(&mut self) -> Result<TransferRequest, WorkflowError> {
		self.require_step("submit", &[WorkflowStep::AmountEntry])?;
		let request = match self.prepare_request() {
			Ok(request) => request,
			Err(e) => return Err(self.reject(e)),
		};
		self.step = WorkflowStep::Submitting;
		self.error = None;
		info!(
			recipient = %request.to,
			amount = %request.amount,
			wallet = %request.from.name,
			"transfer submitted"
		);
		Ok(request)
	}

	/// Records the broadcast result and enters the result step.
	///
	/// `result` holds the ledger reference on success or the error message on
	/// failure. Failures are not retried.
	pub fn complete_submission(
		&mut self,
		result: Result<String, String>,
	) -> Result<TransferOutcome, WorkflowError> {
		self.require_step("finish a transfer", &[WorkflowStep::Submitting])?;
		let outcome = match result {
			Ok(reference) => {
				info!(reference = %reference, "transfer broadcast");
				TransferOutcome::Succeeded { reference }
			}
			Err(reason) => {
				let reason = sanitize_failure(&reason);
				warn!(reason = %reason, "transfer failed");
				TransferOutcome::Failed { reason }
			}
		};
		self.outcome = Some(outcome.clone());
		self.step = WorkflowStep::Result;
		Ok(outcome)
	}

	/// Submits the transfer through `broadcaster` and records a receipt on
	/// success. A receipt that cannot be stored is logged and does not change
	/// the outcome.
	#[instrument(skip(self, broadcaster, receipts), fields(user_id = %self.user_id))]
	pub async fn submit<T, S>(
		&mut self,
		broadcaster: &T,
		receipts: &S,
	) -> Result<TransferOutcome, WorkflowError>
	where
		T: TransferBroadcaster + ?Sized,
		S: ReceiptSink + ?Sized,
	{
		let request = self.begin_submission()?;
		let result = broadcaster
			.broadcast(&request)
			.await
			.map_err(|e| format!("{:#}", e));

		if let Ok(reference) = &result {
			let receipt = Receipt::for_transfer(&self.user_id, &request, reference);
			if let Err(e) = receipts.record(&receipt).await {
				warn!(error = %e, reference = %reference, "failed to record receipt");
			}
		}

		self.complete_submission(result)
	}

	/// Clears all workflow state and returns to address entry
	pub fn reset(&mut self) {
		self.invalidate_checks();
		self.step = WorkflowStep::AddressEntry;
		self.address = None;
		self.wallet = None;
		self.amount = None;
		self.token = Token::Native;
		self.error = None;
		self.outcome = None;
	}

	/// What the UI needs to render the current step
	pub fn view(&self) -> WorkflowView {
		WorkflowView {
			step: self.step,
			step_number: self.step.number(),
			checking: self.is_checking(),
			address: self.address.clone(),
			verdict: self.verdict.clone(),
			can_proceed: self.step == WorkflowStep::RiskReview && self.authorization().is_ok(),
			wallet: self.wallet.clone(),
			amount: self.amount,
			max_sendable: self.wallet.as_ref().map(SourceWallet::max_sendable),
			error: self.error.clone(),
			outcome: self.outcome.clone(),
		}
	}
}
