//! Minimal REST client for the per-user meetings collection.
//!
//! Every call borrows a bearer token from the shared [`TokenCache`]. A 401 answer drops the
//! cached credential so the next call re-authenticates; the failing call itself is not
//! retried.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{Method, StatusCode};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	config::Settings,
	error::{self, ConfigError, TransportError},
	http::{ReqwestTokenEndpoint, TokenEndpoint},
	obs::{self, OpKind},
	token_cache::TokenCache,
};

/// User id substituted when the caller passes an empty one.
pub const DEFAULT_USER_ID: &str = "me";

/// Calls `/v2/users/{user_id}/meetings` on behalf of the S2S account.
pub struct MeetingsClient<E = ReqwestTokenEndpoint, K = SystemClock>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	http: ReqwestClient,
	api_base: Url,
	tokens: TokenCache<E, K>,
	timeout: StdDuration,
}
impl MeetingsClient {
	/// Wires a client, its token endpoint, and a fresh cache from validated settings.
	pub fn from_settings(settings: &Settings) -> Self {
		let http = ReqwestClient::default();
		let endpoint = ReqwestTokenEndpoint::with_client(http.clone(), settings.account_credentials());

		Self::new(http, settings.api_base_url.clone(), TokenCache::new(endpoint))
	}
}
impl<E, K> MeetingsClient<E, K>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	/// Timeout applied to each REST call unless overridden.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Creates a client over an existing token cache.
	pub fn new(http: ReqwestClient, api_base: Url, tokens: TokenCache<E, K>) -> Self {
		Self { http, api_base, tokens, timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Overrides the per-call timeout. The token exchange keeps its own.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Token cache backing this client.
	pub fn tokens(&self) -> &TokenCache<E, K> {
		&self.tokens
	}

	/// Lists meetings of `user_id` (`me` when empty).
	pub async fn list(&self, user_id: &str) -> Result<Value> {
		self.call(Method::GET, "list", user_id, None).await
	}

	/// Creates a meeting for `user_id` (`me` when empty) from a JSON body.
	pub async fn create(&self, user_id: &str, body: &Value) -> Result<Value> {
		self.call(Method::POST, "create", user_id, Some(body)).await
	}

	async fn call(
		&self,
		method: Method,
		stage: &'static str,
		user_id: &str,
		body: Option<&Value>,
	) -> Result<Value> {
		obs::observe_async(OpKind::Meetings, stage, self.send(method, user_id, body)).await
	}

	async fn send(&self, method: Method, user_id: &str, body: Option<&Value>) -> Result<Value> {
		let url = self.meetings_url(user_id)?;
		let token = self.tokens.token().await?;
		let mut request =
			self.http.request(method, url).bearer_auth(token.expose()).timeout(self.timeout);

		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(TransportError::from)?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if status == StatusCode::UNAUTHORIZED {
			obs::warn(OpKind::Meetings, "upstream rejected bearer token");

			self.tokens.invalidate();
		}
		if !status.is_success() {
			return Err(Error::Upstream {
				status: status.as_u16(),
				body: error::body_preview(&bytes),
			});
		}
		if bytes.is_empty() {
			return Ok(Value::Null);
		}

		serde_json::from_slice(&bytes).map_err(|_| Error::Upstream {
			status: status.as_u16(),
			body: error::body_preview(&bytes),
		})
	}

	fn meetings_url(&self, user_id: &str) -> Result<Url, ConfigError> {
		let user_id = match user_id.trim() {
			"" => DEFAULT_USER_ID,
			id => id,
		};
		let mut url = self.api_base.clone();

		url.path_segments_mut()
			.map_err(|()| ConfigError::CannotBeABase { name: "api_base_url" })?
			.pop_if_empty()
			.extend(["v2", "users", user_id, "meetings"]);

		Ok(url)
	}
}
impl<E, K> Clone for MeetingsClient<E, K>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	fn clone(&self) -> Self {
		Self {
			http: self.http.clone(),
			api_base: self.api_base.clone(),
			tokens: self.tokens.clone(),
			timeout: self.timeout,
		}
	}
}
impl<E, K> Debug for MeetingsClient<E, K>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MeetingsClient")
			.field("api_base", &self.api_base.as_str())
			.field("timeout", &self.timeout)
			.field("tokens", &self.tokens)
			.finish()
	}
}
