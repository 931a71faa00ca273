//! Webhook authenticity checks and URL-validation challenge answers.
//!
//! [`WebhookGuard::verify_and_classify`] runs entirely in memory: no token refresh, no
//! outbound call, no await. The platform expects challenge answers within about three
//! seconds and disables endpoints that miss the deadline.

pub mod event;
pub mod signature;

pub use event::*;
pub use signature::{SIGNATURE_VERSION, challenge_token, sign, signatures_match};

// self
use crate::{
	_prelude::*,
	auth::Secret,
	clock::{Clock, SystemClock},
	error::ConfigError,
	obs::{self, OpKind},
};

/// Verifies webhook deliveries against the shared secret and classifies them.
pub struct WebhookGuard<K = SystemClock>
where
	K: ?Sized + Clock,
{
	secret: Secret,
	clock: Arc<K>,
	timestamp_tolerance: Option<Duration>,
}
impl WebhookGuard {
	/// Creates a guard for `secret`; a blank secret is a configuration fault.
	pub fn new(secret: impl Into<Secret>) -> Result<Self, ConfigError> {
		Self::with_clock(secret, SystemClock)
	}
}
impl<K> WebhookGuard<K>
where
	K: ?Sized + Clock,
{
	/// Creates a guard that reads time from `clock` when checking timestamps.
	pub fn with_clock(
		secret: impl Into<Secret>,
		clock: impl Into<Arc<K>>,
	) -> Result<Self, ConfigError> {
		let secret = secret.into();

		if secret.is_blank() {
			return Err(ConfigError::MissingSetting { name: "webhook_secret" });
		}

		Ok(Self { secret, clock: clock.into(), timestamp_tolerance: None })
	}

	/// Rejects deliveries whose timestamp is further than `tolerance` from now.
	///
	/// Disabled by default. Rejections are reported as [`Error::InvalidSignature`] so the
	/// sender learns nothing about which check failed.
	pub fn with_timestamp_tolerance(mut self, tolerance: Duration) -> Self {
		self.timestamp_tolerance = Some(tolerance.abs());

		self
	}

	/// Checks the signature (and timestamp, when a tolerance is configured).
	pub fn verify(&self, event: &WebhookEvent) -> Result<()> {
		let expected =
			signature::sign(self.secret.expose().as_bytes(), event.timestamp(), event.raw_body())?;

		if !signature::signatures_match(&expected, event.signature()) {
			obs::warn(OpKind::Webhook, "webhook signature rejected");

			return Err(Error::InvalidSignature);
		}
		if !self.timestamp_within_tolerance(event.timestamp()) {
			obs::warn(OpKind::Webhook, "webhook timestamp outside tolerance");

			return Err(Error::InvalidSignature);
		}

		Ok(())
	}

	/// Verifies a delivery and classifies it.
	///
	/// Unverified deliveries are never parsed. A verified body that is not a JSON envelope
	/// `{ event, payload }` fails with [`Error::InvalidRequest`]; unknown event names are
	/// [`Classification::Unhandled`], not errors.
	pub fn verify_and_classify(&self, event: &WebhookEvent) -> Result<Classification> {
		obs::observe(OpKind::Webhook, "verify_and_classify", || {
			self.verify(event).and_then(|()| self.classify(event.raw_body()))
		})
	}

	/// Answers a URL-validation challenge.
	pub fn answer_challenge(&self, challenge: &ChallengePayload) -> Result<ChallengeResponse> {
		if challenge.plain_token.is_empty() {
			return Err(Error::invalid_request("plainToken must not be empty"));
		}

		let encrypted_token =
			signature::challenge_token(self.secret.expose().as_bytes(), &challenge.plain_token)?;

		Ok(ChallengeResponse { plain_token: challenge.plain_token.clone(), encrypted_token })
	}

	fn classify(&self, raw_body: &[u8]) -> Result<Classification> {
		let envelope: Envelope = serde_json::from_slice(raw_body)
			.map_err(|_| Error::invalid_request("webhook body is not a JSON event envelope"))?;

		if envelope.event == URL_VALIDATION_EVENT {
			let challenge: ChallengePayload = serde_json::from_value(envelope.payload)
				.map_err(|_| Error::invalid_request("payload.plainToken is required"))?;

			return self.answer_challenge(&challenge).map(Classification::UrlValidation);
		}

		Ok(match EventKind::from_name(&envelope.event) {
			Some(kind) => Classification::Business(BusinessEvent { kind, payload: envelope.payload }),
			None => Classification::Unhandled { event: envelope.event },
		})
	}

	fn timestamp_within_tolerance(&self, timestamp: &str) -> bool {
		let Some(tolerance) = self.timestamp_tolerance else {
			return true;
		};
		let Ok(seconds) = timestamp.trim().parse::<i64>() else {
			return false;
		};
		let Ok(sent_at) = OffsetDateTime::from_unix_timestamp(seconds) else {
			return false;
		};

		(self.clock.now() - sent_at).abs() <= tolerance
	}
}
impl<K> Debug for WebhookGuard<K>
where
	K: ?Sized + Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("WebhookGuard")
			.field("secret", &self.secret)
			.field("timestamp_tolerance", &self.timestamp_tolerance)
			.finish()
	}
}
