//! Optional observability for the trust-boundary operations.
//!
//! # Feature Flags
//!
//! - `tracing`: every operation runs inside a `zoom_trust.op` span carrying `op`, `stage`,
//!   and (once finished) `outcome` fields. Rejections also emit a `warn` event.
//! - `metrics`: `zoom_trust_op_total{op, outcome}` counts attempts, successes, and failures;
//!   `zoom_trust_op_duration_seconds{op, outcome}` records how long finished operations took.
//!
//! Without either feature the helpers just forward the wrapped result.

mod metrics;
mod tracing;

pub use self::tracing::{OpSpan, OpSpanGuard};

pub(crate) use self::tracing::warn;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// [`TokenCache::token`](crate::token_cache::TokenCache::token) lookups and refreshes.
	TokenCache,
	/// Webhook verification and classification.
	Webhook,
	/// Join-token issuance.
	JoinToken,
	/// REST calls made through the meetings client.
	Meetings,
}
impl OpKind {
	/// Stable label used in span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::TokenCache => "token_cache",
			OpKind::Webhook => "webhook",
			OpKind::JoinToken => "join_token",
			OpKind::Meetings => "meetings",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Stable label used in span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure }
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs a synchronous operation inside its span and records its outcome.
pub fn observe<T, E, F>(kind: OpKind, stage: &'static str, op: F) -> std::result::Result<T, E>
where
	F: FnOnce() -> std::result::Result<T, E>,
{
	let span = OpSpan::new(kind, stage);
	let started = Instant::now();

	metrics::count(kind, OpOutcome::Attempt);

	let result = {
		let _guard = span.clone().entered();

		op()
	};

	finish(&span, kind, started, &result);

	result
}

/// Awaits an asynchronous operation inside its span and records its outcome.
///
/// The span is attached to the future rather than entered, so no guard lives across an
/// await point.
pub async fn observe_async<T, E, Fut>(
	kind: OpKind,
	stage: &'static str,
	op: Fut,
) -> std::result::Result<T, E>
where
	Fut: Future<Output = std::result::Result<T, E>>,
{
	let span = OpSpan::new(kind, stage);
	let started = Instant::now();

	metrics::count(kind, OpOutcome::Attempt);

	let result = span.instrument(op).await;

	finish(&span, kind, started, &result);

	result
}

fn finish<T, E>(
	span: &OpSpan,
	kind: OpKind,
	started: Instant,
	result: &std::result::Result<T, E>,
) {
	let outcome = OpOutcome::of(result);

	span.record_outcome(outcome);
	metrics::count(kind, outcome);
	metrics::time(kind, outcome, started.elapsed());
}
