use chrono::Utc;
use mockall::predicate;
use rust_decimal::Decimal;
use std::time::Duration;

use crate::integration::mocks::{
	MockAnalyzer, MockBlocklist, MockBroadcaster, MockReceipts, MockRegistry,
};
use wallet_guard::{
	models::{
		AbuseQueryResult, AbuseReport, AddedBy, Address, BlocklistEntry, Chain,
		ChainActivityResult, ChainActivitySnapshot, RiskLevel, SourceWallet, TransferOutcome,
	},
	repositories::RepositoryError,
	services::{
		risk::RiskAggregator,
		workflow::{SendWorkflow, WorkflowError, WorkflowStep},
	},
};

const RECIPIENT: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const WALLET: &str = "11111111111111111111111111111111";

fn funded() -> ChainActivityResult {
	ChainActivityResult::from_snapshot(
		Chain::Solana,
		ChainActivitySnapshot {
			balance: 3_000_000_000,
			transaction_count: 20,
			recent_transaction_refs: vec!["5abc".to_string()],
		},
		5,
	)
}

fn wallet() -> SourceWallet {
	SourceWallet {
		name: "Phantom".to_string(),
		address: Address::parse(WALLET, Chain::Solana).unwrap(),
		balance: Decimal::from(10),
	}
}

fn aggregator(
	blocked: bool,
	reports: Vec<AbuseReport>,
) -> RiskAggregator<MockBlocklist, MockRegistry, MockAnalyzer> {
	let mut blocklist = MockBlocklist::new();
	blocklist.expect_lookup().returning(move |_, address| {
		Ok(blocked.then(|| BlocklistEntry {
			address: address.as_str().to_string(),
			reason: None,
			blocked_at: Utc::now(),
			added_by: AddedBy::Manual,
		}))
	});

	let mut registry = MockRegistry::new();
	registry
		.expect_query()
		.returning(move |_| AbuseQueryResult::from_reports(reports.clone(), None));

	let mut analyzer = MockAnalyzer::new();
	analyzer.expect_analyze().returning(|_| funded());

	RiskAggregator::new(blocklist, registry, analyzer, Duration::from_secs(5))
}

async fn ready_to_submit(amount: Decimal) -> SendWorkflow {
	let mut workflow = SendWorkflow::new("alice", Chain::Solana);
	let verdict = workflow
		.check_recipient(&aggregator(false, Vec::new()), &format!("solana:{}", RECIPIENT))
		.await
		.unwrap();
	assert!(verdict.safe());

	workflow.proceed_to_amount().unwrap();
	workflow.select_wallet(wallet()).unwrap();
	workflow.set_amount(amount).unwrap();
	workflow
}

#[tokio::test]
async fn test_check_recipient_normalizes_link_input() {
	let mut workflow = SendWorkflow::new("alice", Chain::Solana);
	let verdict = workflow
		.check_recipient(
			&aggregator(false, Vec::new()),
			&format!("solana:{}?amount=1", RECIPIENT),
		)
		.await
		.unwrap();

	assert_eq!(verdict.address().as_str(), RECIPIENT);
	assert_eq!(verdict.risk_level(), RiskLevel::Low);
	assert_eq!(workflow.step(), WorkflowStep::RiskReview);
	assert!(!workflow.is_checking());
	assert!(workflow.view().can_proceed);
}

#[tokio::test]
async fn test_blocked_recipient_never_reaches_amount_entry() {
	let mut workflow = SendWorkflow::new("alice", Chain::Solana);
	let verdict = workflow
		.check_recipient(&aggregator(true, Vec::new()), RECIPIENT)
		.await
		.unwrap();
	assert!(verdict.is_blocked());

	let err = workflow.proceed_to_amount().unwrap_err();
	assert!(matches!(
		err,
		WorkflowError::UnsafeVerdict {
			level: RiskLevel::Blocked,
			score: 100
		}
	));
	assert_eq!(workflow.step(), WorkflowStep::RiskReview);
	assert!(workflow.error().is_some());
}

#[tokio::test]
async fn test_rechecking_replaces_the_verdict() {
	let report = AbuseReport {
		category: "Scam".to_string(),
		subcategory: None,
		description: None,
		reporter: None,
		reported_at: None,
	};

	let mut workflow = SendWorkflow::new("alice", Chain::Solana);
	workflow
		.check_recipient(&aggregator(false, vec![report]), RECIPIENT)
		.await
		.unwrap();
	assert!(!workflow.view().can_proceed);

	workflow
		.check_recipient(&aggregator(false, Vec::new()), RECIPIENT)
		.await
		.unwrap();
	assert!(workflow.view().can_proceed);
}

#[tokio::test]
async fn test_submit_broadcasts_and_records_receipt() {
	let mut workflow = ready_to_submit(Decimal::new(25, 1)).await;

	let mut broadcaster = MockBroadcaster::new();
	broadcaster
		.expect_broadcast()
		.withf(|request| {
			request.to.as_str() == RECIPIENT
				&& request.amount == Decimal::new(25, 1)
				&& request.from.address.as_str() == WALLET
		})
		.times(1)
		.returning(|_| Ok("4vJ9sig".to_string()));

	let mut receipts = MockReceipts::new();
	receipts
		.expect_record()
		.withf(|receipt| {
			receipt.user_id == "alice"
				&& receipt.transaction_signature == "4vJ9sig"
				&& receipt.recipient_address == RECIPIENT
		})
		.times(1)
		.returning(|_| Ok(()));

	let outcome = workflow.submit(&broadcaster, &receipts).await.unwrap();
	assert_eq!(
		outcome,
		TransferOutcome::Succeeded {
			reference: "4vJ9sig".to_string()
		}
	);
	assert_eq!(workflow.step(), WorkflowStep::Result);
	assert_eq!(workflow.view().step_number, 4);
}

#[tokio::test]
async fn test_receipt_failure_does_not_change_outcome() {
	let mut workflow = ready_to_submit(Decimal::ONE).await;

	let mut broadcaster = MockBroadcaster::new();
	broadcaster
		.expect_broadcast()
		.returning(|_| Ok("sig".to_string()));
	let mut receipts = MockReceipts::new();
	receipts
		.expect_record()
		.times(1)
		.returning(|_| Err(RepositoryError::save_error("disk full")));

	let outcome = workflow.submit(&broadcaster, &receipts).await.unwrap();
	assert!(matches!(outcome, TransferOutcome::Succeeded { .. }));
	assert_eq!(workflow.outcome(), Some(&outcome));
}

#[tokio::test]
async fn test_failed_broadcast_writes_no_receipt() {
	let mut workflow = ready_to_submit(Decimal::ONE).await;

	let mut broadcaster = MockBroadcaster::new();
	broadcaster
		.expect_broadcast()
		.returning(|_| Err(anyhow::anyhow!("Transaction simulation failed:   blockhash not found")));
	let mut receipts = MockReceipts::new();
	receipts.expect_record().times(0);

	let outcome = workflow.submit(&broadcaster, &receipts).await.unwrap();
	assert_eq!(
		outcome,
		TransferOutcome::Failed {
			reason: "Transaction simulation failed: blockhash not found".to_string()
		}
	);
	assert_eq!(workflow.step(), WorkflowStep::Result);
}

#[tokio::test]
async fn test_insufficient_balance_never_broadcasts() {
	let mut workflow = ready_to_submit(Decimal::from(11)).await;

	let mut broadcaster = MockBroadcaster::new();
	broadcaster.expect_broadcast().times(0);
	let mut receipts = MockReceipts::new();
	receipts.expect_record().times(0);

	let err = workflow.submit(&broadcaster, &receipts).await.unwrap_err();
	assert_eq!(
		err,
		WorkflowError::InsufficientBalance {
			requested: Decimal::from(11),
			available: Decimal::from(10),
		}
	);
	assert_eq!(workflow.step(), WorkflowStep::AmountEntry);
}

#[tokio::test]
async fn test_submit_outside_amount_entry_is_rejected() {
	let mut workflow = SendWorkflow::new("alice", Chain::Solana);

	let mut broadcaster = MockBroadcaster::new();
	broadcaster.expect_broadcast().times(0);
	let receipts = MockReceipts::new();

	let err = workflow.submit(&broadcaster, &receipts).await.unwrap_err();
	assert!(matches!(
		err,
		WorkflowError::InvalidState {
			step: WorkflowStep::AddressEntry,
			..
		}
	));
}

#[tokio::test]
async fn test_late_verdict_is_ignored_after_recipient_change() {
	let mut workflow = SendWorkflow::new("alice", Chain::Solana);
	let aggregator = aggregator(false, Vec::new());

	let stale = workflow.begin_assessment(RECIPIENT).unwrap();
	let current = workflow
		.begin_assessment("SysvarC1ock11111111111111111111111111111111")
		.unwrap();

	let late = aggregator.assess("alice", stale.address()).await;
	assert!(!workflow.apply_verdict(stale, late));
	assert!(workflow.is_checking());

	let fresh = aggregator.assess("alice", current.address()).await;
	assert!(workflow.apply_verdict(current, fresh));
	assert_eq!(
		workflow.verdict().unwrap().address().as_str(),
		"SysvarC1ock11111111111111111111111111111111"
	);
}

#[tokio::test]
async fn test_blocklist_is_consulted_with_the_workflow_user() {
	let mut blocklist = MockBlocklist::new();
	blocklist
		.expect_lookup()
		.with(predicate::eq("bob"), predicate::always())
		.times(1)
		.returning(|_, _| Ok(None));
	let mut registry = MockRegistry::new();
	registry
		.expect_query()
		.returning(|_| AbuseQueryResult::from_reports(Vec::new(), Some(0)));
	let mut analyzer = MockAnalyzer::new();
	analyzer.expect_analyze().returning(|_| funded());
	let aggregator = RiskAggregator::new(blocklist, registry, analyzer, Duration::from_secs(5));

	let mut workflow = SendWorkflow::new("bob", Chain::Solana);
	workflow.check_recipient(&aggregator, RECIPIENT).await.unwrap();
	assert_eq!(workflow.user_id(), "bob");
}
