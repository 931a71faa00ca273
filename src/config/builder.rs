// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::{self, DEFAULT_API_BASE_URL, DEFAULT_OAUTH_BASE_URL, Settings},
	error::ConfigError,
};

/// Builder for [`Settings`] values.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
	/// Account identifier for the `account_credentials` grant.
	pub account_id: Option<String>,
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<Secret>,
	/// Webhook secret token.
	pub webhook_secret: Option<Secret>,
	/// Meeting SDK key.
	pub sdk_key: Option<String>,
	/// Meeting SDK secret.
	pub sdk_secret: Option<Secret>,
	/// OAuth base URL; defaults to [`DEFAULT_OAUTH_BASE_URL`].
	pub oauth_base_url: Option<Url>,
	/// REST API base URL; defaults to [`DEFAULT_API_BASE_URL`].
	pub api_base_url: Option<Url>,
}
impl SettingsBuilder {
	/// Sets the account identifier.
	pub fn account_id(mut self, value: impl Into<String>) -> Self {
		self.account_id = Some(value.into());

		self
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, value: impl Into<Secret>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Sets the webhook secret token.
	pub fn webhook_secret(mut self, value: impl Into<Secret>) -> Self {
		self.webhook_secret = Some(value.into());

		self
	}

	/// Sets the Meeting SDK key.
	pub fn sdk_key(mut self, value: impl Into<String>) -> Self {
		self.sdk_key = Some(value.into());

		self
	}

	/// Sets the Meeting SDK secret.
	pub fn sdk_secret(mut self, value: impl Into<Secret>) -> Self {
		self.sdk_secret = Some(value.into());

		self
	}

	/// Overrides the OAuth base URL.
	pub fn oauth_base_url(mut self, url: Url) -> Self {
		self.oauth_base_url = Some(url);

		self
	}

	/// Overrides the REST API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting settings.
	pub fn build(self) -> Result<Settings, ConfigError> {
		let account_id = required_text("account_id", self.account_id)?;
		let client_id = required_text("client_id", self.client_id)?;
		let client_secret = required_secret("client_secret", self.client_secret)?;
		let webhook_secret = required_secret("webhook_secret", self.webhook_secret)?;
		let sdk_key = required_text("sdk_key", self.sdk_key)?;
		let sdk_secret = required_secret("sdk_secret", self.sdk_secret)?;
		let oauth_base_url = match self.oauth_base_url {
			Some(url) => url,
			None => config::parse_endpoint("oauth_base_url", DEFAULT_OAUTH_BASE_URL)?,
		};
		let api_base_url = match self.api_base_url {
			Some(url) => url,
			None => config::parse_endpoint("api_base_url", DEFAULT_API_BASE_URL)?,
		};

		config::validate_endpoint("oauth_base_url", &oauth_base_url)?;
		config::validate_endpoint("api_base_url", &api_base_url)?;

		let token_url = oauth_base_url
			.join("/oauth/token")
			.map_err(|source| ConfigError::InvalidEndpoint { name: "oauth_base_url", source })?;

		Ok(Settings {
			account_id,
			client_id,
			client_secret,
			webhook_secret,
			sdk_key,
			sdk_secret,
			token_url,
			api_base_url,
		})
	}
}

fn required_text(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	match value {
		Some(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(ConfigError::MissingSetting { name }),
	}
}

fn required_secret(name: &'static str, value: Option<Secret>) -> Result<Secret, ConfigError> {
	match value {
		Some(value) if !value.is_blank() => Ok(value),
		_ => Err(ConfigError::MissingSetting { name }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn complete() -> SettingsBuilder {
		Settings::builder()
			.account_id("acct")
			.client_id("client")
			.client_secret("client-secret")
			.webhook_secret("webhook-secret")
			.sdk_key("sdk-key")
			.sdk_secret("sdk-secret")
	}

	#[test]
	fn blank_values_count_as_missing() {
		let err = complete()
			.webhook_secret("   ")
			.build()
			.expect_err("Blank webhook secret should be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "webhook_secret" }));

		let err = complete().sdk_key("").build().expect_err("Empty SDK key should be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "sdk_key" }));
	}

	#[test]
	fn non_base_endpoints_are_rejected() {
		let url = Url::parse("mailto:ops@example.com").expect("Fixture URL should parse.");
		let err = complete()
			.api_base_url(url)
			.build()
			.expect_err("Cannot-be-a-base URLs should be rejected.");

		assert!(matches!(err, ConfigError::CannotBeABase { name: "api_base_url" }));
	}

	#[test]
	fn settings_debug_output_redacts_secrets() {
		let settings = complete().build().expect("Complete builder should succeed.");
		let debug = format!("{settings:?}");

		assert!(!debug.contains("client-secret"));
		assert!(!debug.contains("webhook-secret"));
		assert!(!debug.contains("sdk-secret"));
		assert!(debug.contains("sdk-key"));
	}
}
