//! Inbound delivery envelope and the verified classification handed to the router.

// self
use crate::_prelude::*;

/// Header carrying the delivery timestamp (epoch seconds).
pub const TIMESTAMP_HEADER: &str = "x-zm-request-timestamp";
/// Header carrying the `v0=<hex>` signature.
pub const SIGNATURE_HEADER: &str = "x-zm-signature";
/// Event name of the URL-validation challenge.
pub const URL_VALIDATION_EVENT: &str = "endpoint.url_validation";

/// One inbound webhook delivery, captured before any JSON parsing.
///
/// The HTTP layer must hand over the body exactly as received. Frameworks that parse
/// and re-serialize JSON before this point break signature verification.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookEvent {
	raw_body: Vec<u8>,
	timestamp: String,
	signature: String,
}
impl WebhookEvent {
	/// Captures a delivery from its raw body and header values.
	pub fn new(
		raw_body: impl Into<Vec<u8>>,
		timestamp: impl Into<String>,
		signature: impl Into<String>,
	) -> Self {
		Self { raw_body: raw_body.into(), timestamp: timestamp.into(), signature: signature.into() }
	}

	/// Captures a delivery from an iterator of `(name, value)` header pairs.
	///
	/// Header names match case-insensitively. A missing header fails with
	/// [`Error::InvalidSignature`], the same answer a wrong signature gets.
	pub fn from_headers<I, N, V>(headers: I, raw_body: impl Into<Vec<u8>>) -> Result<Self>
	where
		I: IntoIterator<Item = (N, V)>,
		N: AsRef<str>,
		V: AsRef<str>,
	{
		let mut timestamp = None;
		let mut signature = None;

		for (name, value) in headers {
			let name = name.as_ref();

			if name.eq_ignore_ascii_case(TIMESTAMP_HEADER) {
				timestamp = Some(value.as_ref().to_owned());
			} else if name.eq_ignore_ascii_case(SIGNATURE_HEADER) {
				signature = Some(value.as_ref().to_owned());
			}
		}

		match (timestamp, signature) {
			(Some(timestamp), Some(signature)) => Ok(Self::new(raw_body, timestamp, signature)),
			_ => Err(Error::InvalidSignature),
		}
	}

	/// Body bytes exactly as received.
	pub fn raw_body(&self) -> &[u8] {
		&self.raw_body
	}

	/// Value of [`TIMESTAMP_HEADER`].
	pub fn timestamp(&self) -> &str {
		&self.timestamp
	}

	/// Value of [`SIGNATURE_HEADER`].
	pub fn signature(&self) -> &str {
		&self.signature
	}
}
impl Debug for WebhookEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("WebhookEvent")
			.field("body_len", &self.raw_body.len())
			.field("timestamp", &self.timestamp)
			.finish()
	}
}

/// JSON envelope shared by every delivery.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
	pub(crate) event: String,
	#[serde(default)]
	pub(crate) payload: serde_json::Value,
}

/// Payload of a URL-validation challenge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
	/// Random token chosen by the platform.
	pub plain_token: String,
}

/// Answer to a URL-validation challenge, serialized as the 200 response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
	/// Token echoed unchanged.
	pub plain_token: String,
	/// Lowercase hex HMAC-SHA256 of `plain_token` under the webhook secret.
	pub encrypted_token: String,
}

/// Business events the platform delivers and this crate recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
	/// `meeting.started`
	#[serde(rename = "meeting.started")]
	MeetingStarted,
	/// `meeting.ended`
	#[serde(rename = "meeting.ended")]
	MeetingEnded,
	/// `participant.joined`
	#[serde(rename = "participant.joined")]
	ParticipantJoined,
	/// `participant.left`
	#[serde(rename = "participant.left")]
	ParticipantLeft,
}
impl EventKind {
	/// Every recognized kind.
	pub const ALL: [EventKind; 4] = [
		EventKind::MeetingStarted,
		EventKind::MeetingEnded,
		EventKind::ParticipantJoined,
		EventKind::ParticipantLeft,
	];

	/// Wire name of the event.
	pub const fn as_str(self) -> &'static str {
		match self {
			EventKind::MeetingStarted => "meeting.started",
			EventKind::MeetingEnded => "meeting.ended",
			EventKind::ParticipantJoined => "participant.joined",
			EventKind::ParticipantLeft => "participant.left",
		}
	}

	/// Looks up a kind by wire name.
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == name)
	}
}
impl Display for EventKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Verified business event ready for dispatch to state trackers or notifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct BusinessEvent {
	/// Recognized event kind.
	pub kind: EventKind,
	/// Event payload as delivered.
	pub payload: serde_json::Value,
}

/// Outcome of verifying and classifying a delivery.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
	/// URL-validation challenge; respond with the contained body.
	UrlValidation(ChallengeResponse),
	/// Recognized business event.
	Business(BusinessEvent),
	/// Authentic delivery of an event this crate does not model; acknowledge it anyway.
	Unhandled {
		/// Event name as delivered.
		event: String,
	},
}
impl Classification {
	/// HTTP status the front end should answer with. Every verified delivery is acknowledged.
	pub fn http_status(&self) -> u16 {
		200
	}

	/// Response body, present only for URL-validation challenges.
	pub fn response_body(&self) -> Option<&ChallengeResponse> {
		match self {
			Self::UrlValidation(response) => Some(response),
			_ => None,
		}
	}

	/// Event name the classification was derived from.
	pub fn event_name(&self) -> &str {
		match self {
			Self::UrlValidation(_) => URL_VALIDATION_EVENT,
			Self::Business(event) => event.kind.as_str(),
			Self::Unhandled { event } => event,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn headers_match_case_insensitively() {
		let headers = [
			("Content-Type", "application/json"),
			("X-Zm-Request-Timestamp", "1700000000"),
			("X-ZM-SIGNATURE", "v0=abc"),
		];
		let event = WebhookEvent::from_headers(headers, b"{}".to_vec())
			.expect("Both headers are present.");

		assert_eq!(event.timestamp(), "1700000000");
		assert_eq!(event.signature(), "v0=abc");
		assert_eq!(event.raw_body(), b"{}");
	}

	#[test]
	fn missing_header_is_an_invalid_signature() {
		let err = WebhookEvent::from_headers([(TIMESTAMP_HEADER, "1700000000")], Vec::new())
			.expect_err("Missing signature header should fail.");

		assert!(matches!(err, Error::InvalidSignature));
	}

	#[test]
	fn event_kinds_round_trip_names() {
		for kind in EventKind::ALL {
			assert_eq!(EventKind::from_name(kind.as_str()), Some(kind));
		}

		assert_eq!(EventKind::from_name("recording.completed"), None);
	}

	#[test]
	fn challenge_response_serializes_camel_case() {
		let response = ChallengeResponse {
			plain_token: "abc123".into(),
			encrypted_token: "deadbeef".into(),
		};

		assert_eq!(
			serde_json::to_string(&response).expect("Challenge response should serialize."),
			r#"{"plainToken":"abc123","encryptedToken":"deadbeef"}"#
		);
	}
}
