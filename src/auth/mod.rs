//! Caller identity for studyshare.
//!
//! Authentication is delegated to an external identity service: callers
//! present an opaque bearer token, and the [`TokenVerifier`] either yields a
//! verified [`Principal`] or rejects the request. Nothing in this module is
//! persisted.

mod verifier;

pub use verifier::{JwksVerifier, TokenVerifier};

/// A verified caller identity, derived from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable subject id assigned by the identity service.
    pub id: String,
    /// Email address claimed by the token.
    pub email: String,
    /// Display name, when the token carries one.
    pub display_name: Option<String>,
}

impl Principal {
    /// Name to denormalize into uploaded records.
    pub fn uploader_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}
