//! Admin access tokens.
//!
//! Tokens are issued elsewhere (the admin login flow). This server only validates them: an HS256 signature made with
//! the configured secret, and an `exp` claim in the future. The `userId` claim carries the admin's id.
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use sockify_engine::db_types::Actor;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClaims {
    pub user_id: String,
    pub exp: i64,
}

impl AdminClaims {
    pub fn new(admin_id: i64, expires_in: Duration) -> Self {
        Self { user_id: admin_id.to_string(), exp: (Utc::now() + expires_in).timestamp() }
    }

    pub fn admin_id(&self) -> Result<i64, AuthError> {
        self.user_id
            .trim()
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidClaims(format!("'{}' is not an admin id", self.user_id)))
    }

    /// The engine-side identity for changes made with this token.
    pub fn actor(&self) -> Result<Actor, AuthError> {
        self.admin_id().map(Actor::Admin)
    }
}

impl FromRequest for AdminClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AdminClaims>().cloned();
        ready(claims.ok_or_else(|| {
            warn!("🔐️ No admin claims found in request extensions for {}", req.path());
            ServerError::AuthenticationError(AuthError::MissingToken)
        }))
    }
}

/// Checks the token's signature and expiry, and that it names an admin.
pub fn validate_admin_token(token: &str, config: &AuthConfig) -> Result<AdminClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<AdminClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::ValidationError(e.to_string()),
    })?;
    let claims = data.claims;
    claims.admin_id()?;
    trace!("🔐️ Access token validated for admin #{}", claims.user_id);
    Ok(claims)
}

/// Signs `claims` with the configured secret.
pub fn issue_admin_token(claims: &AdminClaims, config: &AuthConfig) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| AuthError::ValidationError(e.to_string()))
}
