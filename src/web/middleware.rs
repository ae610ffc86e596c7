//! Authentication middleware and CORS for the Web API.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{Principal, TokenVerifier};
use crate::web::error::ApiError;

/// Extractor requiring a verified bearer token.
///
/// Runs the [`TokenVerifier`] before the handler body, so unauthenticated
/// requests are rejected before the request body is touched and before any
/// external call is made.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Unauthorized: no token"))?;

        let verifier = parts
            .extensions
            .get::<Arc<dyn TokenVerifier>>()
            .ok_or_else(|| ApiError::internal("Token verifier not configured"))?;

        let principal = verifier.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            ApiError::unauthorized("Unauthorized: invalid token")
        })?;

        Ok(AuthPrincipal(principal))
    }
}

/// Middleware injecting the token verifier into request extensions.
pub async fn attach_verifier(
    verifier: Arc<dyn TokenVerifier>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(verifier);
    next.run(request).await
}

/// Build the CORS layer from the configured origins. An empty list allows
/// any origin.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_permissive_by_default() {
        let _layer = create_cors_layer(&[]);
    }

    #[test]
    fn test_cors_layer_with_origins() {
        let origins = vec!["https://app.example.com".to_string()];
        let _layer = create_cors_layer(&origins);
    }
}
