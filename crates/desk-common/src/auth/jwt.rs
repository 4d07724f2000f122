//! JWT utilities for authentication
//!
//! Provides token encoding, decoding, and validation using the `jsonwebtoken` crate.
//! Staff tokens are minted by the main platform; this service validates them
//! and can issue short-lived tokens for tooling and tests.

use chrono::{Duration, Utc};
use desk_core::{Actor, Role};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default token lifetime in seconds (1 hour)
const DEFAULT_TOKEN_EXPIRY: i64 = 3600;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Caller role
    pub role: Role,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Build the caller identity from the claims
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.sub.clone(),
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and expected issuer
    #[must_use]
    pub fn new(secret: &str, issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        }
    }

    /// Issue a token for an actor
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, actor: &Actor) -> Result<String, AppError> {
        let now = Utc::now();

        let claims = Claims {
            sub: actor.user_id.clone(),
            role: actor.role,
            name: actor.name.clone(),
            email: actor.email.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate a token and return the caller identity
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn authenticate(&self, token: &str) -> Result<Actor, AppError> {
        let claims = self.decode_token(token)?;
        Ok(claims.actor())
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}
