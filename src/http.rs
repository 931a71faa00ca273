//! Transport primitives for the S2S token exchange.
//!
//! [`TokenEndpoint`] is the cache's only dependency on an HTTP stack. The default
//! [`ReqwestTokenEndpoint`] performs the `account_credentials` grant with HTTP Basic client
//! authentication; tests and alternative stacks plug in their own implementations.

// std
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{self, CredentialRefreshError},
};
#[cfg(feature = "reqwest")] use crate::{config::AccountCredentials, error::TransportError};

/// Grant type sent to the token endpoint.
pub const ACCOUNT_CREDENTIALS_GRANT: &str = "account_credentials";

/// Boxed future returned by [`TokenEndpoint::exchange`].
pub type TokenEndpointFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenGrant, CredentialRefreshError>> + 'a + Send>>;

/// Source of fresh S2S access tokens.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can be shared by
/// every request handler, and the returned future must be `Send` so callers can hop
/// executors while awaiting it.
pub trait TokenEndpoint
where
	Self: 'static + Send + Sync,
{
	/// Exchanges the configured credentials for a new access token.
	fn exchange(&self) -> TokenEndpointFuture<'_>;
}

/// Successful token endpoint answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Bearer token value.
	pub access_token: Secret,
	/// Declared lifetime relative to issuance.
	pub expires_in: Duration,
}

#[derive(Deserialize)]
struct RawTokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// Interprets a token endpoint answer.
///
/// Any non-2xx status becomes [`CredentialRefreshError::Rejected`] carrying a body preview,
/// and a success body must contain a non-empty `access_token` and a positive `expires_in`.
pub fn parse_token_response(status: u16, body: &[u8]) -> Result<TokenGrant, CredentialRefreshError> {
	if !(200..300).contains(&status) {
		return Err(CredentialRefreshError::Rejected { status, body: error::body_preview(body) });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let raw: RawTokenResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| CredentialRefreshError::Malformed { source, status })?;

	if raw.access_token.trim().is_empty() {
		return Err(CredentialRefreshError::MissingAccessToken);
	}

	let expires_in = raw.expires_in.ok_or(CredentialRefreshError::MissingExpiresIn)?;

	if expires_in <= 0 {
		return Err(CredentialRefreshError::NonPositiveExpiresIn);
	}

	Ok(TokenGrant {
		access_token: Secret::new(raw.access_token),
		expires_in: Duration::seconds(expires_in),
	})
}

/// Reqwest-backed [`TokenEndpoint`].
///
/// Sends `POST {token_url}?grant_type=account_credentials&account_id=...` with the client
/// id/secret as HTTP Basic credentials. Every exchange carries a timeout so callers
/// waiting on a refresh are never stalled for long.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTokenEndpoint {
	client: ReqwestClient,
	credentials: AccountCredentials,
	timeout: StdDuration,
}
#[cfg(feature = "reqwest")]
impl ReqwestTokenEndpoint {
	/// Timeout applied to each exchange unless overridden.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(5);

	/// Creates an endpoint backed by a default reqwest client.
	pub fn new(credentials: AccountCredentials) -> Self {
		Self::with_client(ReqwestClient::default(), credentials)
	}

	/// Wraps an existing reqwest client.
	///
	/// Token endpoints answer directly, so custom clients should not follow redirects.
	pub fn with_client(client: ReqwestClient, credentials: AccountCredentials) -> Self {
		Self { client, credentials, timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Overrides the per-exchange timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Credentials used for every exchange.
	pub fn credentials(&self) -> &AccountCredentials {
		&self.credentials
	}

	fn map_reqwest_error(&self, err: ReqwestError) -> CredentialRefreshError {
		if err.is_timeout() {
			CredentialRefreshError::Timeout { timeout_ms: self.timeout.as_millis() }
		} else {
			TransportError::from(err).into()
		}
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTokenEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTokenEndpoint")
			.field("token_url", &self.credentials.token_url.as_str())
			.field("account_id", &self.credentials.account_id)
			.field("client_id", &self.credentials.client_id)
			.field("timeout", &self.timeout)
			.finish()
	}
}
#[cfg(feature = "reqwest")]
impl TokenEndpoint for ReqwestTokenEndpoint {
	fn exchange(&self) -> TokenEndpointFuture<'_> {
		Box::pin(async move {
			let credentials = &self.credentials;
			let response = self
				.client
				.post(credentials.token_url.clone())
				.query(&[
					("grant_type", ACCOUNT_CREDENTIALS_GRANT),
					("account_id", credentials.account_id.as_str()),
				])
				.basic_auth(&credentials.client_id, Some(credentials.client_secret.expose()))
				.timeout(self.timeout)
				.send()
				.await
				.map_err(|err| self.map_reqwest_error(err))?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(|err| self.map_reqwest_error(err))?;

			parse_token_response(status, &body)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_successful_grant() {
		let grant = parse_token_response(
			200,
			br#"{"access_token":"abc","token_type":"bearer","expires_in":3599,"scope":"meeting:read"}"#,
		)
		.expect("Well-formed grant should parse.");

		assert_eq!(grant.access_token.expose(), "abc");
		assert_eq!(grant.expires_in, Duration::seconds(3599));
	}

	#[test]
	fn non_success_status_keeps_status_and_body() {
		let err = parse_token_response(401, br#"{"reason":"Invalid client_id or client_secret"}"#)
			.expect_err("401 should be rejected.");

		assert_eq!(err.status(), Some(401));
		assert!(matches!(
			err,
			CredentialRefreshError::Rejected { ref body, .. } if body.contains("Invalid client_id")
		));
	}

	#[test]
	fn malformed_and_incomplete_bodies_are_rejected() {
		let err = parse_token_response(200, b"<html>").expect_err("HTML should not parse.");

		assert!(matches!(err, CredentialRefreshError::Malformed { status: 200, .. }));

		let err = parse_token_response(200, br#"{"access_token":"abc","expires_in":"soon"}"#)
			.expect_err("String expires_in should not parse.");

		match err {
			CredentialRefreshError::Malformed { source, .. } =>
				assert_eq!(source.path().to_string(), "expires_in"),
			other => panic!("Unexpected error: {other:?}"),
		}

		assert!(matches!(
			parse_token_response(200, br#"{"access_token":"abc"}"#),
			Err(CredentialRefreshError::MissingExpiresIn)
		));
		assert!(matches!(
			parse_token_response(200, br#"{"access_token":"abc","expires_in":0}"#),
			Err(CredentialRefreshError::NonPositiveExpiresIn)
		));
		assert!(matches!(
			parse_token_response(200, br#"{"expires_in":3600}"#),
			Err(CredentialRefreshError::MissingAccessToken)
		));
	}
}
