//! Demonstrates the three trust-boundary components against a local mock of the platform:
//! listing meetings with a cached S2S token, answering a webhook URL-validation challenge,
//! and issuing a Meeting SDK join token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use zoom_trust::{
	auth::Secret,
	config::Settings,
	join::JoinTokenIssuer,
	meetings::MeetingsClient,
	url::Url,
	webhook::{self, WebhookEvent, WebhookGuard},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.query_param("grant_type", "account_credentials")
				.query_param("account_id", "demo-account");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":3599}");
		})
		.await;
	let meetings_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/users/me/meetings")
				.header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"total_records\":1,\"meetings\":[{\"id\":85746065432,\"topic\":\"Standup\"}]}");
		})
		.await;
	let base = Url::parse(&server.base_url())?;
	let settings = Settings::builder()
		.account_id("demo-account")
		.client_id("demo-client")
		.client_secret(Secret::new("demo-client-secret"))
		.webhook_secret(Secret::new("demo-webhook-secret"))
		.sdk_key("demo-sdk-key")
		.sdk_secret(Secret::new("demo-sdk-secret"))
		.oauth_base_url(base.clone())
		.api_base_url(base)
		.build()?;
	let client = MeetingsClient::from_settings(&settings);

	for _ in 0..2 {
		let meetings = client.list("").await?;

		println!("meetings: {meetings}");
	}

	token_mock.assert_calls_async(1).await;
	meetings_mock.assert_calls_async(2).await;

	let guard = WebhookGuard::new(settings.webhook_secret.clone())?;
	let body = r#"{"event":"endpoint.url_validation","payload":{"plainToken":"demo-plain"}}"#;
	let timestamp = "1735689600";
	let signature =
		webhook::sign(settings.webhook_secret.expose().as_bytes(), timestamp, body.as_bytes())?;
	let delivery = WebhookEvent::from_headers(
		[(webhook::TIMESTAMP_HEADER, timestamp), (webhook::SIGNATURE_HEADER, signature.as_str())],
		body,
	)?;
	let classification = guard.verify_and_classify(&delivery)?;

	println!(
		"webhook {} -> {} {}",
		classification.event_name(),
		classification.http_status(),
		serde_json::to_string(&classification.response_body())?
	);

	let issuer = JoinTokenIssuer::new(settings.sdk_key.clone(), &settings.sdk_secret)?;
	let authorization = issuer.issue("85746065432", Some(0))?;

	println!(
		"join token for {} expires at {}: {}",
		authorization.session_number, authorization.expires_at, authorization.signature
	);

	Ok(())
}
