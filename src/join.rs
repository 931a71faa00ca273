//! Meeting SDK join-token issuance.
//!
//! [`JoinTokenIssuer::issue`] signs a two-hour HS256 token in the compact
//! `header.payload.signature` form any JWS verifier accepts. The SDK key travels in the
//! payload; the SDK secret only keys the signature.

pub mod claims;

pub use claims::*;

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	clock::{Clock, SystemClock},
	error::ConfigError,
	obs::{self, OpKind},
};

/// Fixed lifetime of every join token.
pub const JOIN_TOKEN_LIFETIME: Duration = Duration::hours(2);

const MISSING_FIELDS: &str = "meetingNumber and role required";

/// HTTP request body accepted by the join-authorization route.
///
/// Both fields are optional at the type level so a missing `role` can be told apart from
/// `role: 0`. Browser clients forward the numeric meeting id from the create-meeting
/// response, so `meetingNumber` accepts a JSON string or a non-negative integer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
	/// Meeting (session) number, normalized to its decimal string form.
	#[serde(rename = "meetingNumber", default, deserialize_with = "meeting_number")]
	pub meeting_number: Option<String>,
	/// Participant role.
	#[serde(default)]
	pub role: Option<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MeetingNumber {
	Text(String),
	Numeric(u64),
}

fn meeting_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<MeetingNumber>::deserialize(deserializer)?.map(|number| match number {
		MeetingNumber::Text(text) => text,
		MeetingNumber::Numeric(id) => id.to_string(),
	}))
}

/// HTTP response body of the join-authorization route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
	/// Compact signed join token.
	pub signature: String,
}

/// Signed join authorization for one session/role pair. Never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinAuthorization {
	/// Meeting (session) number.
	pub session_number: String,
	/// Participant role.
	pub role: i32,
	/// Issued-at, Unix epoch seconds.
	pub issued_at: i64,
	/// Expiry, Unix epoch seconds.
	pub expires_at: i64,
	/// Compact signed token.
	pub signature: String,
}
impl JoinAuthorization {
	/// Converts into the response body.
	pub fn into_response(self) -> JoinResponse {
		JoinResponse { signature: self.signature }
	}
}

/// Signs join tokens with the Meeting SDK key pair.
pub struct JoinTokenIssuer<K = SystemClock>
where
	K: ?Sized + Clock,
{
	sdk_key: String,
	encoding_key: EncodingKey,
	clock: Arc<K>,
}
impl JoinTokenIssuer {
	/// Creates an issuer; a blank key or secret is a configuration fault.
	pub fn new(sdk_key: impl Into<String>, sdk_secret: &Secret) -> Result<Self, ConfigError> {
		Self::with_clock(sdk_key, sdk_secret, SystemClock)
	}
}
impl<K> JoinTokenIssuer<K>
where
	K: ?Sized + Clock,
{
	/// Creates an issuer that stamps tokens with `clock`.
	pub fn with_clock(
		sdk_key: impl Into<String>,
		sdk_secret: &Secret,
		clock: impl Into<Arc<K>>,
	) -> Result<Self, ConfigError> {
		let sdk_key = sdk_key.into();

		if sdk_key.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: "sdk_key" });
		}
		if sdk_secret.is_blank() {
			return Err(ConfigError::MissingSetting { name: "sdk_secret" });
		}

		Ok(Self {
			sdk_key,
			encoding_key: EncodingKey::from_secret(sdk_secret.expose().as_bytes()),
			clock: clock.into(),
		})
	}

	/// Public SDK key embedded in every token.
	pub fn sdk_key(&self) -> &str {
		&self.sdk_key
	}

	/// Signs a join token for `session_number` and `role`.
	///
	/// A blank session number or an absent role fails with [`Error::InvalidRequest`]
	/// before anything is signed. `Some(0)` is a valid role.
	pub fn issue(&self, session_number: &str, role: Option<i32>) -> Result<JoinAuthorization> {
		obs::observe(OpKind::JoinToken, "issue", || self.sign(session_number, role))
	}

	/// Validates and signs a deserialized request body.
	pub fn issue_request(&self, request: &JoinRequest) -> Result<JoinAuthorization> {
		self.issue(request.meeting_number.as_deref().unwrap_or_default(), request.role)
	}

	fn sign(&self, session_number: &str, role: Option<i32>) -> Result<JoinAuthorization> {
		let session_number = session_number.trim();

		let Some(role) = role.filter(|_| !session_number.is_empty()) else {
			return Err(Error::invalid_request(MISSING_FIELDS));
		};

		let claims = JoinClaims::new(
			&self.sdk_key,
			session_number,
			role,
			self.clock.now(),
			JOIN_TOKEN_LIFETIME,
		);
		let signature =
			jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
				.map_err(ConfigError::from)?;

		Ok(JoinAuthorization {
			session_number: claims.mn,
			role,
			issued_at: claims.iat,
			expires_at: claims.exp,
			signature,
		})
	}
}
impl<K> Debug for JoinTokenIssuer<K>
where
	K: ?Sized + Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JoinTokenIssuer")
			.field("sdk_key", &self.sdk_key)
			.field("sdk_secret", &"<redacted>")
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	use jsonwebtoken::{DecodingKey, Validation};
	use time::macros;
	// self
	use super::*;
	use crate::clock::ManualClock;

	const SDK_KEY: &str = "sdk-key";
	const SDK_SECRET: &str = "sdk-secret";

	fn issuer() -> (JoinTokenIssuer<ManualClock>, ManualClock) {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let issuer =
			JoinTokenIssuer::<ManualClock>::with_clock(SDK_KEY, &Secret::new(SDK_SECRET), clock.clone())
				.expect("Non-empty key pair should build an issuer.");

		(issuer, clock)
	}

	fn decode_segment(segment: &str) -> serde_json::Value {
		let bytes = URL_SAFE_NO_PAD.decode(segment).expect("Segment should be base64url.");

		serde_json::from_slice(&bytes).expect("Segment should be JSON.")
	}

	#[test]
	fn issues_three_part_token_with_expected_claims() {
		let (issuer, _clock) = issuer();
		let authorization =
			issuer.issue("123456789", Some(1)).expect("Valid request should be signed.");
		let parts: Vec<&str> = authorization.signature.split('.').collect();

		assert_eq!(parts.len(), 3);

		let header = decode_segment(parts[0]);
		let payload = decode_segment(parts[1]);

		assert_eq!(header["alg"], "HS256");
		assert_eq!(header["typ"], "JWT");
		assert_eq!(payload["role"], 1);
		assert_eq!(payload["mn"], "123456789");
		assert_eq!(payload["sdkKey"], SDK_KEY);
		assert_eq!(payload["appKey"], SDK_KEY);
		assert_eq!(payload["video_webrtc_mode"], true);
		assert_eq!(payload["exp"], payload["tokenExp"]);
		assert_eq!(
			payload["exp"].as_i64().expect("exp should be numeric.")
				- payload["iat"].as_i64().expect("iat should be numeric."),
			7200
		);
		assert_eq!(authorization.expires_at - authorization.issued_at, 7200);
		assert_eq!(authorization.issued_at, 1_735_689_600);
		assert!(!authorization.signature.contains(SDK_SECRET));
		assert!(!String::from_utf8_lossy(
			&URL_SAFE_NO_PAD.decode(parts[1]).expect("Payload should be base64url.")
		)
		.contains(SDK_SECRET));
	}

	#[test]
	fn signing_is_deterministic_at_a_fixed_instant() {
		let (issuer, clock) = issuer();
		let first = issuer.issue("123456789", Some(0)).expect("Role 0 should be accepted.");
		let second = issuer.issue("123456789", Some(0)).expect("Role 0 should be accepted.");

		assert_eq!(first, second);

		clock.advance(Duration::seconds(1));

		let later = issuer.issue("123456789", Some(0)).expect("Role 0 should be accepted.");

		assert_ne!(first.signature, later.signature);
	}

	#[test]
	fn compliant_verifier_accepts_token_with_sdk_secret_only() {
		let (issuer, _clock) = issuer();
		let authorization =
			issuer.issue("987654321", Some(1)).expect("Valid request should be signed.");
		let mut validation = Validation::new(Algorithm::HS256);

		validation.validate_exp = false;
		validation.required_spec_claims.clear();

		let decoded = jsonwebtoken::decode::<JoinClaims>(
			&authorization.signature,
			&DecodingKey::from_secret(SDK_SECRET.as_bytes()),
			&validation,
		)
		.expect("Token should verify under the SDK secret.");

		assert_eq!(decoded.claims.mn, "987654321");
		assert_eq!(decoded.claims.role, 1);

		let forged = jsonwebtoken::decode::<JoinClaims>(
			&authorization.signature,
			&DecodingKey::from_secret(SDK_KEY.as_bytes()),
			&validation,
		);

		assert!(forged.is_err());
	}

	#[test]
	fn missing_role_is_rejected_but_zero_is_not() {
		let (issuer, _clock) = issuer();
		let err = issuer.issue("123456789", None).expect_err("Absent role should be rejected.");

		assert!(matches!(err, Error::InvalidRequest { ref reason } if reason == MISSING_FIELDS));
		assert_eq!(err.http_status(), 400);

		let authorization = issuer.issue("123456789", Some(0)).expect("Role 0 should be accepted.");

		assert_eq!(authorization.role, 0);
	}

	#[test]
	fn blank_session_number_is_rejected() {
		let (issuer, _clock) = issuer();

		for session in ["", "   "] {
			assert!(matches!(issuer.issue(session, Some(1)), Err(Error::InvalidRequest { .. })));
		}
	}

	#[test]
	fn request_bodies_distinguish_absent_from_zero() {
		let (issuer, _clock) = issuer();
		let absent: JoinRequest =
			serde_json::from_str(r#"{"meetingNumber":"123456789"}"#).expect("Body should parse.");
		let zero: JoinRequest = serde_json::from_str(r#"{"meetingNumber":"123456789","role":0}"#)
			.expect("Body should parse.");
		let no_meeting: JoinRequest =
			serde_json::from_str(r#"{"role":1}"#).expect("Body should parse.");

		assert_eq!(absent.role, None);
		assert!(issuer.issue_request(&absent).is_err());
		assert!(issuer.issue_request(&no_meeting).is_err());

		let response = issuer
			.issue_request(&zero)
			.expect("Role 0 should be accepted.")
			.into_response();

		assert_eq!(response.signature.split('.').count(), 3);
	}

	#[test]
	fn numeric_meeting_numbers_are_normalized_to_strings() {
		let (issuer, _clock) = issuer();
		let numeric: JoinRequest = serde_json::from_str(r#"{"meetingNumber":85746065432,"role":1}"#)
			.expect("Numeric meeting id should parse.");
		let null: JoinRequest = serde_json::from_str(r#"{"meetingNumber":null,"role":1}"#)
			.expect("Null meeting id should parse.");

		assert_eq!(numeric.meeting_number.as_deref(), Some("85746065432"));
		assert_eq!(null.meeting_number, None);
		assert!(serde_json::from_str::<JoinRequest>(r#"{"meetingNumber":true,"role":1}"#).is_err());

		let authorization = issuer.issue_request(&numeric).expect("Numeric id should be signed.");

		assert_eq!(authorization.session_number, "85746065432");
	}

	#[test]
	fn blank_key_material_is_a_configuration_fault() {
		let err = JoinTokenIssuer::new("", &Secret::new(SDK_SECRET))
			.expect_err("Blank SDK key should be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "sdk_key" }));

		let err = JoinTokenIssuer::new(SDK_KEY, &Secret::new(""))
			.expect_err("Blank SDK secret should be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "sdk_secret" }));
	}
}
