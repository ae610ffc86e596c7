//! Bearer token verification against the external identity service.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::auth::Principal;
use crate::config::IdentityConfig;
use crate::{Result, ShareError};

/// Connect timeout for identity service calls, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total timeout for identity service calls, in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 20;

/// Verifies bearer credentials and produces a [`Principal`].
///
/// The verifier is a pure check against the identity service: it has no side
/// effects and must run before any mutating pipeline step.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validate a bearer token, yielding the verified principal.
    async fn verify(&self, token: &str) -> Result<Principal>;
}

/// Token claims this service cares about.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// One published signing key.
#[derive(Debug, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: String,
    #[serde(default)]
    n: String,
    #[serde(default)]
    e: String,
}

/// The identity service's JWKS document.
#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

/// Production [`TokenVerifier`] backed by the identity service's JWKS
/// endpoint.
///
/// Signing keys are fetched over HTTPS, cached by key id, and refreshed when
/// the cache ages out or an unknown key id shows up. Token signature, expiry,
/// issuer and audience are all validated.
pub struct JwksVerifier {
    http: reqwest::Client,
    jwks_url: String,
    validation: Validation,
    keys_ttl: Duration,
    cache: RwLock<KeyCache>,
}

impl JwksVerifier {
    /// Create a verifier from the identity configuration.
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .build()
            .map_err(|e| ShareError::Config(format!("failed to create HTTP client: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        Ok(Self {
            http,
            jwks_url: config.jwks_url.clone(),
            validation,
            keys_ttl: Duration::from_secs(config.keys_ttl_secs),
            cache: RwLock::new(KeyCache::default()),
        })
    }

    /// Look up the decoding key for a key id, refreshing the JWKS cache when
    /// the cache is stale or the key id is unknown.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        {
            let cache = self.cache.read().await;
            let fresh = cache
                .fetched_at
                .is_some_and(|at| at.elapsed() < self.keys_ttl);
            if fresh {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        self.refresh_keys().await?;

        let cache = self.cache.read().await;
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| ShareError::Unauthorized("unknown signing key".to_string()))
    }

    /// Fetch the JWKS document and rebuild the key cache.
    async fn refresh_keys(&self) -> Result<()> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| ShareError::Unauthorized(format!("identity service unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ShareError::Unauthorized(format!(
                "identity service returned {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| ShareError::Unauthorized(format!("invalid JWKS document: {e}")))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => {
                    tracing::warn!(kid = %jwk.kid, error = %e, "skipping unusable JWKS key");
                }
            }
        }

        let mut cache = self.cache.write().await;
        cache.keys = keys;
        cache.fetched_at = Some(Instant::now());

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<Principal> {
        let header = decode_header(token)
            .map_err(|e| ShareError::Unauthorized(format!("malformed token: {e}")))?;

        let kid = header
            .kid
            .ok_or_else(|| ShareError::Unauthorized("token missing key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token validation failed");
            ShareError::Unauthorized(format!("invalid token: {e}"))
        })?;

        Ok(Principal {
            id: data.claims.sub,
            email: data
                .claims
                .email
                .unwrap_or_else(|| "anonymous".to_string()),
            display_name: data.claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn test_verifier() -> JwksVerifier {
        JwksVerifier::new(&IdentityConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let verifier = test_verifier();
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(ShareError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_token_without_kid_rejected() {
        // Valid JWT structure but no key id in the header. Verification must
        // fail before any network access happens.
        let token = encode(
            &Header::default(),
            &json!({ "sub": "uid-1", "exp": 4102444800_u64 }),
            &EncodingKey::from_secret(b"local-secret"),
        )
        .unwrap();

        let verifier = test_verifier();
        let result = verifier.verify(&token).await;
        match result {
            Err(ShareError::Unauthorized(msg)) => assert!(msg.contains("key id")),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_checks_issuer_and_audience() {
        let verifier = test_verifier();
        assert!(verifier.validation.iss.is_some());
        assert!(verifier.validation.aud.is_some());
        assert!(verifier.validation.validate_exp);
    }
}
