//! The cached S2S bearer credential and its lifecycle helpers.

// self
use crate::{_prelude::*, auth::Secret};

/// Lifecycle status of a [`CachedCredential`] relative to a safety margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialStatus {
	/// More than the safety margin remains before expiry.
	Fresh,
	/// Still valid, but within the safety margin; callers must refresh before use.
	Expiring,
	/// The expiry instant has passed.
	Expired,
}

/// Bearer credential issued by the token endpoint.
///
/// Values are immutable; a refresh replaces the whole credential instead of mutating
/// fields in place.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedCredential {
	/// Access token presented as `Authorization: Bearer`.
	pub token: Secret,
	/// Instant the exchange was started.
	pub issued_at: OffsetDateTime,
	/// `issued_at` plus the declared `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl CachedCredential {
	/// Builds a credential from a token and its relative lifetime.
	///
	/// Returns `None` when `issued_at + expires_in` falls outside the representable range.
	pub fn new(token: Secret, issued_at: OffsetDateTime, expires_in: Duration) -> Option<Self> {
		let expires_at = issued_at.checked_add(expires_in)?;

		Some(Self { token, issued_at, expires_at })
	}

	/// Lifetime left at `now`; negative once expired.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}

	/// Computes the status at `now` using `margin` as the refresh threshold.
	pub fn status_at(&self, now: OffsetDateTime, margin: Duration) -> CredentialStatus {
		let remaining = self.remaining_at(now);

		if remaining <= Duration::ZERO {
			CredentialStatus::Expired
		} else if remaining <= margin {
			CredentialStatus::Expiring
		} else {
			CredentialStatus::Fresh
		}
	}

	/// Returns `true` if strictly more than `margin` remains at `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		matches!(self.status_at(now, margin), CredentialStatus::Fresh)
	}

	/// Expiry expressed as Unix epoch seconds.
	pub fn expires_at_epoch_seconds(&self) -> i64 {
		self.expires_at.unix_timestamp()
	}
}
impl Debug for CachedCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedCredential")
			.field("token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn credential() -> CachedCredential {
		CachedCredential::new(
			Secret::new("access"),
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::hours(1),
		)
		.expect("One hour past 2025 should be representable.")
	}

	#[test]
	fn status_transitions_respect_margin() {
		let credential = credential();
		let margin = Duration::seconds(60);

		assert_eq!(credential.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(
			credential.status_at(macros::datetime!(2025-01-01 00:30 UTC), margin),
			CredentialStatus::Fresh
		);
		assert_eq!(
			credential.status_at(macros::datetime!(2025-01-01 00:58:59 UTC), margin),
			CredentialStatus::Fresh
		);
		// Exactly the margin left counts as expiring.
		assert_eq!(
			credential.status_at(macros::datetime!(2025-01-01 00:59 UTC), margin),
			CredentialStatus::Expiring
		);
		assert_eq!(
			credential.status_at(macros::datetime!(2025-01-01 01:00 UTC), margin),
			CredentialStatus::Expired
		);
	}

	#[test]
	fn epoch_seconds_and_debug_redaction() {
		let credential = credential();

		assert_eq!(credential.expires_at_epoch_seconds(), 1_735_693_200);
		assert!(!format!("{credential:?}").contains("access\""));
		assert!(format!("{credential:?}").contains("<redacted>"));
	}

	#[test]
	fn unrepresentable_expiry_is_rejected() {
		let issued_at = macros::datetime!(2025-01-01 00:00 UTC);

		assert!(
			CachedCredential::new(Secret::new("access"), issued_at, Duration::seconds(i64::MAX))
				.is_none()
		);
	}
}
