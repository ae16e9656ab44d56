use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use thiserror::Error;

use super::error::ApiError;
use super::AppState;
use crate::models::UserId;

/// Claims carried by caller tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Authorization header must be a Bearer token")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verifies HS256 caller tokens
///
/// Built once at startup from configuration and shared through [`AppState`].
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a raw token and return the caller's id
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims.user_id)
    }

    /// Verify an `Authorization` header value
    pub fn verify_header(&self, value: Option<&str>) -> Result<UserId, AuthError> {
        let value = value.ok_or(AuthError::MissingHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedHeader)?;
        self.verify(token.trim())
    }
}

/// The authenticated caller, extracted from the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(ApiError::Internal("application state not configured"))?;

    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    state
        .tokens
        .verify_header(value)
        .map(AuthenticatedUser)
        .map_err(|e| {
            tracing::debug!("Rejected caller on {}: {}", req.path(), e);
            ApiError::Unauthorized(e.to_string())
        })
}
