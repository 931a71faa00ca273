// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome},
};

#[cfg(feature = "tracing")]
type Instrumented<F> = tracing::instrument::Instrumented<F>;
#[cfg(not(feature = "tracing"))]
type Instrumented<F> = F;

/// Span wrapping one operation; a zero-sized no-op without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Opens a `zoom_trust.op` span for `kind` at `stage`.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"zoom_trust.op",
					op = kind.as_str(),
					stage,
					outcome = tracing::field::Empty
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span until the guard drops.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { _entered: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}

	pub(crate) fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	pub(crate) fn record_outcome(&self, outcome: OpOutcome) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = outcome;
		}
	}
}

/// Guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard")
	}
}

/// Emits a `warn` event tagged with the operation.
pub(crate) fn warn(kind: OpKind, message: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = kind.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, message);
	}
}
