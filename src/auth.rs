//! Credential models shared by the token cache and the signing components.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
