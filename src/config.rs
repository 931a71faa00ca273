//! Static configuration: account credentials, webhook secret, SDK key pair, and endpoints.
//!
//! Values are supplied once at startup and stay immutable for the process lifetime. Missing
//! secrets fail fast here instead of producing broken signatures at request time.

/// Builder API for assembling [`Settings`].
pub mod builder;

pub use builder::*;

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Default base URL of the OAuth token endpoint.
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://zoom.us";
/// Default base URL of the REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.zoom.us";

/// Environment variable names read by [`Settings::from_env`].
pub mod env {
	/// Account identifier for the `account_credentials` grant.
	pub const ACCOUNT_ID: &str = "ZOOM_ACCOUNT_ID";
	/// OAuth client identifier.
	pub const CLIENT_ID: &str = "ZOOM_CLIENT_ID";
	/// OAuth client secret.
	pub const CLIENT_SECRET: &str = "ZOOM_CLIENT_SECRET";
	/// Webhook secret token.
	pub const WEBHOOK_SECRET: &str = "ZOOM_WEBHOOK_SECRET_TOKEN";
	/// Meeting SDK key.
	pub const SDK_KEY: &str = "ZOOM_SDK_KEY";
	/// Meeting SDK secret.
	pub const SDK_SECRET: &str = "ZOOM_SDK_SECRET";
	/// Optional OAuth base URL override.
	pub const OAUTH_BASE_URL: &str = "ZOOM_OAUTH_BASE_URL";
	/// Optional REST API base URL override.
	pub const API_BASE_URL: &str = "ZOOM_API_BASE_URL";
}

/// Credentials consumed by the S2S token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountCredentials {
	/// Account identifier sent as `account_id`.
	pub account_id: String,
	/// OAuth client identifier (HTTP Basic username).
	pub client_id: String,
	/// OAuth client secret (HTTP Basic password).
	pub client_secret: Secret,
	/// Absolute token endpoint URL.
	pub token_url: Url,
}

/// Validated process-wide settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
	/// Account identifier for the `account_credentials` grant.
	pub account_id: String,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Shared secret used to sign webhook deliveries.
	pub webhook_secret: Secret,
	/// Meeting SDK identity key; appears in join-token payloads.
	pub sdk_key: String,
	/// Meeting SDK signing secret; never leaves the process.
	pub sdk_secret: Secret,
	/// Absolute token endpoint URL, `{oauth_base_url}/oauth/token`.
	pub token_url: Url,
	/// Base URL of the REST API.
	pub api_base_url: Url,
}
impl Settings {
	/// Creates an empty builder.
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::default()
	}

	/// Loads settings from the process environment (see [`env`]).
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads settings through an arbitrary key lookup, e.g. a parsed `.env` map.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut builder = Self::builder();

		if let Some(value) = lookup(env::ACCOUNT_ID) {
			builder = builder.account_id(value);
		}
		if let Some(value) = lookup(env::CLIENT_ID) {
			builder = builder.client_id(value);
		}
		if let Some(value) = lookup(env::CLIENT_SECRET) {
			builder = builder.client_secret(Secret::new(value));
		}
		if let Some(value) = lookup(env::WEBHOOK_SECRET) {
			builder = builder.webhook_secret(Secret::new(value));
		}
		if let Some(value) = lookup(env::SDK_KEY) {
			builder = builder.sdk_key(value);
		}
		if let Some(value) = lookup(env::SDK_SECRET) {
			builder = builder.sdk_secret(Secret::new(value));
		}
		if let Some(value) = lookup(env::OAUTH_BASE_URL) {
			builder = builder.oauth_base_url(parse_endpoint("oauth_base_url", &value)?);
		}
		if let Some(value) = lookup(env::API_BASE_URL) {
			builder = builder.api_base_url(parse_endpoint("api_base_url", &value)?);
		}

		builder.build()
	}

	/// Bundles the values the token endpoint needs.
	pub fn account_credentials(&self) -> AccountCredentials {
		AccountCredentials {
			account_id: self.account_id.clone(),
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
			token_url: self.token_url.clone(),
		}
	}
}

pub(crate) fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidEndpoint { name, source })
}

pub(crate) fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { name });
	}
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	if url.scheme() != "http" {
		return false;
	}

	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
