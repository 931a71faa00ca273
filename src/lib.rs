//! Trust boundary for Zoom integrations: cached service-to-service OAuth tokens, verified
//! webhooks with URL-validation challenges, and signed Meeting SDK join tokens.
//!
//! The three components are independent:
//!
//! - [`token_cache::TokenCache`] keeps one S2S bearer credential fresh behind a single-flight
//!   refresh gate.
//! - [`webhook::WebhookGuard`] authenticates raw webhook deliveries and classifies them.
//! - [`join::JoinTokenIssuer`] signs two-hour Meeting SDK join tokens.
//!
//! HTTP routing stays with the caller; [`error::Error::http_status`] and the response types
//! carry the status/body contract the routes are expected to honor.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod join;
#[cfg(feature = "reqwest")] pub mod meetings;
pub mod obs;
pub mod token_cache;
pub mod webhook;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Shared helpers for integration tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Secret,
		clock::ManualClock,
		config::{Settings, SettingsBuilder},
		http::ReqwestTokenEndpoint,
		token_cache::TokenCache,
	};

	/// Account identifier used by the test settings.
	pub const TEST_ACCOUNT_ID: &str = "acct-test";
	/// OAuth client identifier used by the test settings.
	pub const TEST_CLIENT_ID: &str = "client-test";
	/// OAuth client secret used by the test settings.
	pub const TEST_CLIENT_SECRET: &str = "client-secret-test";
	/// Webhook secret token used by the test settings.
	pub const TEST_WEBHOOK_SECRET: &str = "webhook-secret-test";
	/// Meeting SDK key used by the test settings.
	pub const TEST_SDK_KEY: &str = "sdk-key-test";
	/// Meeting SDK secret used by the test settings.
	pub const TEST_SDK_SECRET: &str = "sdk-secret-test";

	/// Token cache type alias used by reqwest-backed integration tests.
	pub type ReqwestTestCache = TokenCache<ReqwestTokenEndpoint, ManualClock>;

	/// Returns a settings builder pre-populated with the test credentials.
	pub fn test_settings_builder() -> SettingsBuilder {
		Settings::builder()
			.account_id(TEST_ACCOUNT_ID)
			.client_id(TEST_CLIENT_ID)
			.client_secret(Secret::new(TEST_CLIENT_SECRET))
			.webhook_secret(Secret::new(TEST_WEBHOOK_SECRET))
			.sdk_key(TEST_SDK_KEY)
			.sdk_secret(Secret::new(TEST_SDK_SECRET))
	}

	/// Builds settings whose OAuth and REST endpoints point at a local mock server.
	pub fn test_settings(base_url: &str) -> Settings {
		let base = Url::parse(base_url).expect("Failed to parse mock server base URL.");

		test_settings_builder()
			.oauth_base_url(base.clone())
			.api_base_url(base)
			.build()
			.expect("Failed to build test settings.")
	}

	/// Constructs a [`TokenCache`] backed by the reqwest token endpoint and a manual clock
	/// anchored at `2025-01-01T00:00:00Z`.
	pub fn build_reqwest_test_cache(settings: &Settings) -> (ReqwestTestCache, ManualClock) {
		let clock = ManualClock::new(time::macros::datetime!(2025-01-01 00:00:00 UTC));
		let endpoint = ReqwestTokenEndpoint::new(settings.account_credentials());
		let cache = TokenCache::with_clock(endpoint, clock.clone());

		(cache, clock)
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {base64 as _, color_eyre as _, httpmock as _};
