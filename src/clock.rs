//! Time sources injected into the token cache, webhook guard, and join-token issuer.

// self
use crate::_prelude::*;

/// Source of the current UTC instant.
pub trait Clock
where
	Self: 'static + Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually driven clock for tests and simulations.
///
/// Clones share the same instant, so a test can hold one handle while the component
/// under test owns another.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
impl ManualClock {
	/// Creates a clock frozen at `at`.
	pub fn new(at: OffsetDateTime) -> Self {
		Self(Arc::new(Mutex::new(at)))
	}

	/// Moves the clock to `at`.
	pub fn set(&self, at: OffsetDateTime) {
		*self.0.lock() = at;
	}

	/// Moves the clock forward (or backward, for negative values) by `by`.
	pub fn advance(&self, by: Duration) {
		let mut now = self.0.lock();

		*now += by;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}
