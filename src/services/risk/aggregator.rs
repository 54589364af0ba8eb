//! Risk aggregator.
//!
//! Runs the checks in fixed order: the blocklist first (a hit ends the
//! assessment), then the abuse registry and the activity analyzer
//! concurrently. Each source is bounded by its own timeout so a slow one never
//! holds back the other's result.
//!
//! A panic inside an assessment is caught and turned into an unsafe verdict,
//! which needs unwinding: builds with `panic = "abort"` are rejected.

use futures::FutureExt;
use std::{any::Any, panic::AssertUnwindSafe, time::Duration};
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

use crate::{
	models::{AbuseQueryResult, Address, ChainActivityResult, RiskVerdict},
	repositories::BlocklistChecker,
	services::{
		activity::ActivityAnalyzer,
		registry::AbuseRegistry,
		risk::scoring::{blocked_verdict, failed_verdict, score_signals},
	},
};

#[cfg(not(panic = "unwind"))]
compile_error!("wallet-guard must be built with panic = \"unwind\" so failed assessments stay unsafe");

/// Combines the blocklist, registry and activity signals into a verdict
pub struct RiskAggregator<B, R, A> {
	blocklist: B,
	registry: R,
	analyzer: A,
	source_timeout: Duration,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"internal assessment error".to_string()
	}
}

impl<B, R, A> RiskAggregator<B, R, A>
where
	B: BlocklistChecker,
	R: AbuseRegistry,
	A: ActivityAnalyzer,
{
	/// # Arguments
	/// * `source_timeout` - Bound applied separately to each source
	pub fn new(blocklist: B, registry: R, analyzer: A, source_timeout: Duration) -> Self {
		Self {
			blocklist,
			registry,
			analyzer,
			source_timeout,
		}
	}

	/// Assesses `address` for `user_id`.
	///
	/// Always returns a verdict. Source outages are folded into the verdict as
	/// degraded results; an unexpected fault inside the assessment produces an
	/// `unknown`, unsafe verdict.
	#[instrument(skip(self, address), fields(address = %address))]
	pub async fn assess(&self, user_id: &str, address: &Address) -> RiskVerdict {
		match AssertUnwindSafe(self.evaluate(user_id, address))
			.catch_unwind()
			.await
		{
			Ok(verdict) => {
				info!(
					score = verdict.risk_score(),
					level = %verdict.risk_level(),
					safe = verdict.safe(),
					"assessment complete"
				);
				verdict
			}
			Err(payload) => {
				let message = panic_message(payload.as_ref());
				error!(error = %message, "assessment failed unexpectedly");
				failed_verdict(address.clone(), &message)
			}
		}
	}

	async fn evaluate(&self, user_id: &str, address: &Address) -> RiskVerdict {
		let blocklist_error =
			match timeout(self.source_timeout, self.blocklist.lookup(user_id, address)).await {
				Ok(Ok(Some(entry))) => {
					info!("address is blocklisted");
					return blocked_verdict(address.clone(), entry);
				}
				Ok(Ok(None)) => None,
				Ok(Err(e)) => {
					warn!(error = %e, "blocklist unavailable, continuing without it");
					Some(e.to_string())
				}
				Err(_) => {
					warn!("blocklist lookup timed out, continuing without it");
					Some(format!(
						"Blocklist lookup timed out after {} ms",
						self.source_timeout.as_millis()
					))
				}
			};

		let (registry, activity) = tokio::join!(
			timeout(self.source_timeout, self.registry.query(address)),
			timeout(self.source_timeout, self.analyzer.analyze(address)),
		);

		let registry = registry.unwrap_or_else(|_| {
			warn!("registry lookup timed out");
			AbuseQueryResult::unavailable(
				"Address verification timed out. Please verify the recipient manually.",
			)
		});
		let activity = activity.unwrap_or_else(|_| {
			warn!("activity analysis timed out");
			ChainActivityResult::unavailable(format!(
				"Ledger query timed out after {} ms",
				self.source_timeout.as_millis()
			))
		});

		score_signals(address.clone(), registry, activity, blocklist_error)
	}
}
