//! Bearer-token identity module.
//!
//! Sign-in itself happens at the external identity provider; this backend
//! only verifies the HS256 ID tokens it mints (`sub`/`name`/`email`/
//! `picture` claims) and turns them into an [`Identity`]. The middleware
//! attaches the verified identity as a request extension; handlers that
//! need one use the [`Identity`] extractor, which rejects with 401.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ErrorResponse};
use crate::models::PublicUser;

/// Claims carried by an identity token.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable user id
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    /// Expiry, seconds since the epoch
    pub exp: u64,
}

/// A verified caller identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    /// The profile document written to the `users` collection on sign-in.
    pub fn to_public_user(&self) -> PublicUser {
        PublicUser {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            uid: claims.sub,
            display_name: claims.name,
            email: claims.email,
            photo_url: claims.picture,
        }
    }
}

/// Verifies identity tokens against the configured shared secret.
pub struct TokenVerifier {
    secret: Option<String>,
}

impl TokenVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Decode and verify a bearer token.
    ///
    /// With no secret configured the signature check is skipped (insecure
    /// dev mode; startup logs a warning). Expiry is always enforced.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);

        let key = match &self.secret {
            Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
            None => {
                validation.insecure_disable_signature_validation();
                DecodingKey::from_secret(&[])
            }
        };

        let data = jsonwebtoken::decode::<IdentityClaims>(token, &key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid identity token: {}", e)))?;

        Ok(data.claims.into())
    }
}

/// Identity middleware.
///
/// Requests without an Authorization header pass through anonymous; public
/// viewer routes stay reachable. A bearer token that fails verification is
/// rejected immediately rather than downgraded to anonymous.
pub async fn identity_layer(
    verifier: Arc<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    if let Some(token) = bearer {
        match verifier.verify(&token) {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
            }
            Err(err) => return unauthorized_response(&err.message()),
        }
    }

    next.run(request).await
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse::new(&AppError::Unauthorized(message.to_string()));
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
