//! `v0` HMAC-SHA256 signing scheme for webhook deliveries and URL-validation challenges.
//!
//! The signed message is `v0:{timestamp}:{raw body}` and the header value is
//! `v0=` followed by the lowercase hex digest. The raw body must be the exact bytes received;
//! a body that was parsed and re-serialized will not reproduce the signature.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::error::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Version prefix of the signing scheme.
pub const SIGNATURE_VERSION: &str = "v0";

/// Computes the `v0=<hex>` signature header value for a delivery.
pub fn sign(secret: &[u8], timestamp: &str, raw_body: &[u8]) -> Result<String, ConfigError> {
	let digest = hmac_hex(
		secret,
		&[SIGNATURE_VERSION.as_bytes(), b":", timestamp.as_bytes(), b":", raw_body],
	)?;

	Ok(format!("{SIGNATURE_VERSION}={digest}"))
}

/// Computes the `encryptedToken` answer for a URL-validation challenge.
pub fn challenge_token(secret: &[u8], plain_token: &str) -> Result<String, ConfigError> {
	hmac_hex(secret, &[plain_token.as_bytes()])
}

/// Compares two signature header values in constant time with respect to their contents.
pub fn signatures_match(expected: &str, provided: &str) -> bool {
	expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn hmac_hex(secret: &[u8], parts: &[&[u8]]) -> Result<String, ConfigError> {
	let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
		.map_err(|_| ConfigError::InvalidKey { name: "webhook_secret" })?;

	for part in parts {
		mac.update(part);
	}

	Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn signature_is_deterministic_and_prefixed() {
		let first = sign(b"secret", "1700000000", br#"{"event":"meeting.started"}"#)
			.expect("Signing should succeed.");
		let second = sign(b"secret", "1700000000", br#"{"event":"meeting.started"}"#)
			.expect("Signing should succeed.");

		assert_eq!(first, second);
		assert!(first.starts_with("v0="));
		assert_eq!(first.len(), 3 + 64);
		assert!(first[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}

	#[test]
	fn any_changed_body_byte_changes_signature() {
		let body = br#"{"event":"meeting.ended","payload":{"object":{"id":"85746065432"}}}"#.to_vec();
		let baseline = sign(b"secret", "1700000000", &body).expect("Signing should succeed.");

		for index in 0..body.len() {
			let mut tampered = body.clone();

			tampered[index] ^= 0x01;

			let signature = sign(b"secret", "1700000000", &tampered).expect("Signing should succeed.");

			assert_ne!(signature, baseline, "byte {index}");
		}
	}

	#[test]
	fn timestamp_is_part_of_the_message() {
		let a = sign(b"secret", "1700000000", b"{}").expect("Signing should succeed.");
		let b = sign(b"secret", "1700000001", b"{}").expect("Signing should succeed.");

		assert_ne!(a, b);
	}

	#[test]
	fn challenge_token_matches_known_answer() {
		// HMAC-SHA256(key = "shh", message = "abc123").
		assert_eq!(
			challenge_token(b"shh", "abc123").expect("Challenge should hash."),
			"2706c9eeb939cc23eb7120c401fed745f11628d889307ab125ad156b861deca5"
		);
	}

	#[test]
	fn signature_matches_known_answer() {
		// HMAC-SHA256(key = "secret", message = "v0:1700000000:{}").
		assert_eq!(
			sign(b"secret", "1700000000", b"{}").expect("Signing should succeed."),
			"v0=84dd7b277ba946b3a34369b43499bfd9258b410b8894583f1288b1911aa6a6d6"
		);
	}

	#[test]
	fn comparison_rejects_length_and_content_mismatches() {
		assert!(signatures_match("v0=abcd", "v0=abcd"));
		assert!(!signatures_match("v0=abcd", "v0=abce"));
		assert!(!signatures_match("v0=abcd", "v0=abc"));
		assert!(!signatures_match("v0=abcd", ""));
	}
}
