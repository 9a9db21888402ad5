use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use http::{StatusCode, request::Parts};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use usersync::Identity;

use crate::response::ApiResponse;

/// Errors raised while loading the token verification configuration
#[derive(Debug, Error)]
pub enum IdentityConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// Raw claims carried by the identity provider's bearer token
///
/// Field names follow the provider's wire format; mapping to [`Identity`]
/// prefers `oid` over `sub` for the subject and the `emails` list over the
/// single `email` claim.
#[derive(Debug, Default, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    emails: Option<Vec<String>>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tid: Option<String>,
}

impl IdTokenClaims {
    fn into_identity(self) -> Identity {
        let IdTokenClaims {
            oid,
            sub,
            emails,
            email,
            name,
            tid,
        } = self;
        Identity {
            external_user_id: oid.or(sub),
            email: emails.and_then(|mut e| if e.is_empty() { None } else { Some(e.remove(0)) }).or(email),
            name,
            tenant_id: tid,
        }
    }
}

/// Validates bearer tokens issued by the external identity provider
///
/// Issuer, audience, lifetime, and signature checks are all delegated to
/// jsonwebtoken's `Validation`; this type only maps the validated claims
/// onto [`Identity`].
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(decoding_key: DecodingKey, validation: Validation) -> Self {
        Self {
            decoding_key,
            validation,
        }
    }

    /// Build a verifier from environment configuration
    ///
    /// Requires `AUTH_ISSUER` and `AUTH_AUDIENCE`, plus either
    /// `AUTH_JWT_SECRET` (HS256) or `AUTH_JWT_PUBLIC_KEY_PEM` (RS256).
    pub fn from_env() -> Result<Self, IdentityConfigError> {
        let issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| IdentityConfigError::Missing("AUTH_ISSUER"))?;
        let audience = std::env::var("AUTH_AUDIENCE")
            .map_err(|_| IdentityConfigError::Missing("AUTH_AUDIENCE"))?;

        let (decoding_key, algorithm) = if let Ok(secret) = std::env::var("AUTH_JWT_SECRET") {
            (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
        } else if let Ok(pem) = std::env::var("AUTH_JWT_PUBLIC_KEY_PEM") {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                .map_err(|e| IdentityConfigError::InvalidKey(e.to_string()))?;
            (key, Algorithm::RS256)
        } else {
            return Err(IdentityConfigError::Missing(
                "AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY_PEM",
            ));
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        Ok(Self::new(decoding_key, validation))
    }

    /// Validate a bearer token and map its claims to an [`Identity`]
    pub fn verify(&self, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<IdTokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims.into_identity())
    }
}

/// Middleware: resolve the caller's identity from the Authorization header
///
/// A valid token inserts an [`Identity`] into the request extensions; an
/// absent or invalid token lets the request continue WITHOUT identity, so
/// anonymous endpoints keep working. Handlers that need identity enforce it
/// through the [`AuthIdentity`] extractor.
pub async fn authenticate(
    State(verifier): State<Arc<TokenVerifier>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(authorization)) = bearer {
        match verifier.verify(authorization.token()) {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
            }
            Err(err) => {
                tracing::debug!("Rejected bearer token: {}", err);
            }
        }
    }
    next.run(request).await
}

/// Authenticated identity, available as an Axum extractor
///
/// Extraction fails with a 401 envelope when the authenticate middleware did
/// not resolve an identity for this request.
#[derive(Clone, Debug)]
pub struct AuthIdentity(pub Identity);

/// Rejection returned when no identity was resolved for the request
#[derive(Debug)]
pub struct IdentityRejection;

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Authentication is required")
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthIdentity)
            .ok_or(IdentityRejection)
    }
}
