// std
use std::time::Duration as StdDuration;
// self
use crate::obs::{OpKind, OpOutcome};

pub(super) fn count(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("zoom_trust_op_total", "op" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

pub(super) fn time(kind: OpKind, outcome: OpOutcome, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!(
			"zoom_trust_op_duration_seconds",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.record(elapsed.as_secs_f64());
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome, elapsed);
	}
}
