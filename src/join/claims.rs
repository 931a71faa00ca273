//! Meeting SDK join-token payload.

// self
use crate::_prelude::*;

/// Claims signed into a Meeting SDK join token.
///
/// The identity key appears twice (`sdkKey`, `appKey`) and so does the expiry (`exp`,
/// `tokenExp`). Both pairs exist because the Web and native SDKs read different field
/// names; they are an external contract, not something to copy elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClaims {
	/// Meeting SDK identity key.
	#[serde(rename = "sdkKey")]
	pub sdk_key: String,
	/// Meeting (session) number.
	pub mn: String,
	/// Participant role; `0` joins as attendee, `1` as host.
	pub role: i32,
	/// Issued-at, Unix epoch seconds.
	pub iat: i64,
	/// Expiry, Unix epoch seconds.
	pub exp: i64,
	/// Identity key under its legacy name.
	#[serde(rename = "appKey")]
	pub app_key: String,
	/// Expiry under its legacy name.
	#[serde(rename = "tokenExp")]
	pub token_exp: i64,
	/// Enables the WebRTC media path in the Web SDK.
	pub video_webrtc_mode: bool,
}
impl JoinClaims {
	/// Builds claims for a session/role pair valid from `issued_at` for `lifetime`.
	pub fn new(
		sdk_key: &str,
		session_number: &str,
		role: i32,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Self {
		let iat = issued_at.unix_timestamp();
		let exp = (issued_at + lifetime).unix_timestamp();

		Self {
			sdk_key: sdk_key.to_owned(),
			mn: session_number.to_owned(),
			role,
			iat,
			exp,
			app_key: sdk_key.to_owned(),
			token_exp: exp,
			video_webrtc_mode: true,
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn serializes_duplicated_fields_in_wire_order() {
		let claims = JoinClaims::new(
			"sdk-key",
			"123456789",
			1,
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::hours(2),
		);

		assert_eq!(
			serde_json::to_string(&claims).expect("Claims should serialize."),
			"{\"sdkKey\":\"sdk-key\",\"mn\":\"123456789\",\"role\":1,\"iat\":1735689600,\
			 \"exp\":1735696800,\"appKey\":\"sdk-key\",\"tokenExp\":1735696800,\
			 \"video_webrtc_mode\":true}"
		);
	}
}
