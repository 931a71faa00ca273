//! Single-slot S2S token cache with expiry pressure and single-flight refreshes.
//!
//! [`TokenCache::token`] returns the cached bearer token while more than the safety margin
//! (60 seconds by default) remains, and otherwise refreshes synchronously through the
//! injected [`TokenEndpoint`]. Refreshes are serialized behind one async gate: callers
//! that queue behind an in-flight refresh re-check the slot and reuse its result, so the
//! token endpoint sees one call per expiry window. A failed refresh leaves the slot
//! untouched and is surfaced to the caller; a stale credential is never handed out.

// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, Secret},
	clock::{Clock, SystemClock},
	error::CredentialRefreshError,
	http::TokenEndpoint,
	obs::{self, OpKind},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTokenEndpoint;

#[cfg(feature = "reqwest")]
/// Token cache specialized for the crate's default reqwest transport.
pub type ReqwestTokenCache = TokenCache<ReqwestTokenEndpoint>;

/// Shared cache for the process-wide S2S credential.
///
/// Clones share the same slot and refresh gate, so one instance can be handed to every
/// request handler.
pub struct TokenCache<E, K = SystemClock>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	endpoint: Arc<E>,
	clock: Arc<K>,
	safety_margin: Duration,
	slot: Arc<RwLock<Option<CachedCredential>>>,
	refresh_gate: Arc<AsyncMutex<()>>,
}
impl<E, K> TokenCache<E, K>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	/// Minimum lifetime a returned token must still have.
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(60);

	/// Creates an empty cache that reads time from `clock`.
	pub fn with_clock(endpoint: impl Into<Arc<E>>, clock: impl Into<Arc<K>>) -> Self {
		Self {
			endpoint: endpoint.into(),
			clock: clock.into(),
			safety_margin: Self::DEFAULT_SAFETY_MARGIN,
			slot: Default::default(),
			refresh_gate: Default::default(),
		}
	}

	/// Overrides the safety margin; negative values are clamped to zero.
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Safety margin in effect.
	pub fn safety_margin(&self) -> Duration {
		self.safety_margin
	}

	/// Returns a bearer token with more than the safety margin left, refreshing first when
	/// the cached one is missing or too close to expiry.
	pub async fn token(&self) -> Result<Secret> {
		obs::observe_async(OpKind::TokenCache, "token", async {
			if let Some(token) = self.fresh_token(self.clock.now()) {
				return Ok(token);
			}

			let _singleflight = self.refresh_gate.lock().await;

			// Another caller may have refreshed while this one queued on the gate.
			if let Some(token) = self.fresh_token(self.clock.now()) {
				return Ok(token);
			}

			self.refresh().await
		})
		.await
	}

	/// Drops the cached credential so the next [`token`](Self::token) call refreshes.
	///
	/// Intended for callers whose upstream request was rejected with HTTP 401.
	pub fn invalidate(&self) {
		*self.slot.write() = None;
	}

	/// Snapshot of the cached credential, fresh or not.
	pub fn cached(&self) -> Option<CachedCredential> {
		self.slot.read().clone()
	}

	fn fresh_token(&self, now: OffsetDateTime) -> Option<Secret> {
		self.slot
			.read()
			.as_ref()
			.filter(|credential| credential.is_fresh_at(now, self.safety_margin))
			.map(|credential| credential.token.clone())
	}

	async fn refresh(&self) -> Result<Secret> {
		let issued_at = self.clock.now();
		let grant = obs::observe_async(OpKind::TokenCache, "refresh", self.endpoint.exchange())
			.await
			.inspect_err(|_| obs::warn(OpKind::TokenCache, "token refresh failed"))?;
		let credential = CachedCredential::new(grant.access_token, issued_at, grant.expires_in)
			.ok_or(CredentialRefreshError::ExpiresInOutOfRange)
			.inspect_err(|_| obs::warn(OpKind::TokenCache, "token lifetime out of range"))?;
		let token = credential.token.clone();

		*self.slot.write() = Some(credential);

		Ok(token)
	}
}
#[cfg(feature = "reqwest")]
impl TokenCache<ReqwestTokenEndpoint> {
	/// Creates a cache backed by the reqwest token endpoint and the system clock.
	pub fn new(endpoint: ReqwestTokenEndpoint) -> Self {
		Self::with_clock(endpoint, SystemClock)
	}
}
impl<E, K> Clone for TokenCache<E, K>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	fn clone(&self) -> Self {
		Self {
			endpoint: self.endpoint.clone(),
			clock: self.clock.clone(),
			safety_margin: self.safety_margin,
			slot: self.slot.clone(),
			refresh_gate: self.refresh_gate.clone(),
		}
	}
}
impl<E, K> Debug for TokenCache<E, K>
where
	E: ?Sized + TokenEndpoint,
	K: ?Sized + Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("safety_margin", &self.safety_margin)
			.field("cached", &*self.slot.read())
			.finish()
	}
}
