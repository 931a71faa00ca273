//! Crate-level error types shared by the token cache, webhook guard, and join-token issuer.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Missing or malformed startup configuration; fatal.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The S2S token could not be refreshed; never masked by a stale token.
	#[error(transparent)]
	CredentialRefresh(#[from] CredentialRefreshError),
	/// Transport failure while calling the upstream REST API.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Webhook authenticity check failed.
	///
	/// Deliberately carries no detail so nothing about the mismatch leaks to the sender.
	#[error("Webhook signature is invalid.")]
	InvalidSignature,
	/// Caller input is missing or malformed; the reason is safe to expose.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Human-readable reason returned to the caller.
		reason: String,
	},
	/// The upstream REST API answered with a non-success status.
	#[error("Upstream API returned HTTP {status}.")]
	Upstream {
		/// HTTP status code returned upstream.
		status: u16,
		/// Truncated response body.
		body: String,
	},
}
impl Error {
	/// Builds an [`Error::InvalidRequest`] from any displayable reason.
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}

	/// HTTP status the front end should answer with.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::InvalidSignature => 401,
			Self::InvalidRequest { .. } => 400,
			Self::Upstream { status, .. } => *status,
			Self::CredentialRefresh(_) | Self::Transport(_) => 502,
			Self::Config(_) => 500,
		}
	}

	/// JSON body the front end should answer with.
	///
	/// Only [`Error::InvalidRequest`] exposes its reason; every other variant maps to a
	/// fixed label.
	pub fn response_body(&self) -> ErrorResponse {
		let error = match self {
			Self::InvalidSignature => "invalid_signature".into(),
			Self::InvalidRequest { reason } => reason.clone(),
			Self::Upstream { .. } => "upstream_request_failed".into(),
			Self::CredentialRefresh(_) => "token_refresh_failed".into(),
			Self::Transport(_) => "upstream_unreachable".into(),
			Self::Config(_) => "internal_error".into(),
		};

		ErrorResponse { error }
	}
}

/// Error body returned to HTTP callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error label or safe-to-expose reason.
	pub error: String,
}

/// Configuration and validation failures raised while wiring components.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting is absent or blank.
	#[error("Required setting `{name}` is missing.")]
	MissingSetting {
		/// Setting name (environment variable or builder field).
		name: &'static str,
	},
	/// An endpoint URL could not be parsed.
	#[error("Endpoint `{name}` is not a valid URL.")]
	InvalidEndpoint {
		/// Endpoint name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An endpoint does not use HTTPS and is not a loopback address.
	#[error("The {name} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint name.
		name: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// An endpoint cannot carry path segments (e.g. `mailto:` URLs).
	#[error("The {name} endpoint cannot be used as a base URL.")]
	CannotBeABase {
		/// Endpoint name.
		name: &'static str,
	},
	/// A keyed hash could not be initialized with the configured key.
	#[error("The {name} key was rejected by the MAC implementation.")]
	InvalidKey {
		/// Key name.
		name: &'static str,
	},
	/// The join-token signer rejected the claims or key.
	#[error("Join token could not be signed.")]
	Signing(#[from] jsonwebtoken::errors::Error),
}

/// Failures of the S2S token exchange. None of them are retried automatically.
#[derive(Debug, ThisError)]
pub enum CredentialRefreshError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the exchange with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Token endpoint response carried an empty `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a zero or negative `expires_in`.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned an `expires_in` too large to turn into an expiry instant.
	#[error("The expires_in value is out of range.")]
	ExpiresInOutOfRange,
	/// Token endpoint did not answer in time.
	#[error("Token endpoint did not answer within {timeout_ms} ms.")]
	Timeout {
		/// Configured timeout in milliseconds.
		timeout_ms: u128,
	},
	/// Network or IO failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl CredentialRefreshError {
	/// HTTP status returned by the token endpoint, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } | Self::Malformed { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Truncates a response body for inclusion in error values.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut end = BODY_PREVIEW_LIMIT;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}...", &text[..end])
}
