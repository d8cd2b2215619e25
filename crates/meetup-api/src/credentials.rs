//! Credential Service: password digests and signed access tokens.
//!
//! Digests are argon2id PHC strings with per-password random salts. Tokens are
//! HS256 JWTs carrying the caller's [`Identity`] and a fixed lifetime. Both
//! the secret and the lifetime are fixed for the life of the process.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use meetup_core::{Identity, Role};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;

/// Wire form of an [`Identity`] inside a token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  id:   String,
  role: Role,
  iat:  i64,
  exp:  i64,
}

#[derive(Clone)]
pub struct Credentials {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl Credentials {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }

  // ── Passwords ─────────────────────────────────────────────────────────

  /// One-way digest of `plaintext`, computed on the blocking pool.
  pub async fn hash(&self, plaintext: &str) -> Result<String, ApiError> {
    let plaintext = plaintext.to_owned();
    tokio::task::spawn_blocking(move || {
      let salt = SaltString::generate(&mut OsRng);
      Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("argon2 error: {e}")))
    })
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?
  }

  /// Whether `plaintext` matches `digest`. A digest that cannot be parsed
  /// never matches.
  pub async fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, ApiError> {
    let plaintext = plaintext.to_owned();
    let digest = digest.to_owned();
    tokio::task::spawn_blocking(move || {
      let Ok(parsed) = PasswordHash::new(&digest) else {
        warn!("stored password digest is not a PHC string");
        return false;
      };
      Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
    })
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))
  }

  // ── Tokens ────────────────────────────────────────────────────────────

  pub fn sign_token(&self, identity: &Identity) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
      id:   identity.id.clone(),
      role: identity.role,
      iat:  now.timestamp(),
      exp:  (now + self.ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(Box::new(e)))
  }

  /// Decode a token, failing if the signature is wrong or it has expired.
  pub fn verify_token(&self, token: &str) -> Result<Identity, ApiError> {
    let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
      .map_err(|e| {
        warn!(error = %e, "rejected access token");
        ApiError::Unauthorized("Invalid or expired token".to_string())
      })?;
    Ok(Identity { id: data.claims.id, role: data.claims.role })
  }
}
