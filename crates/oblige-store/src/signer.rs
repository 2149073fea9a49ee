//! Presigned retrieval links with JWT tokens.
//!
//! A presigned URL is a capability: whoever holds it can fetch one object
//! until the token expires. The token carries the object key and expiry and
//! is verified by the HTTP layer before the object is served.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Path the HTTP layer serves presigned objects from
pub const BLOB_ROUTE: &str = "/api/blob";

/// URL signing error
#[derive(Debug, Error)]
pub enum SignerError {
    /// JWT encoding failed
    #[error("Failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),

    /// System clock is before the Unix epoch
    #[error("System clock error")]
    Clock,

    /// Token expired
    #[error("Link expired")]
    Expired,

    /// Invalid or tampered token
    #[error("Invalid link token")]
    Invalid,

    /// Expiry would not fit in a Unix timestamp
    #[error("Link lifetime of {0} seconds is out of range")]
    TtlOutOfRange(u64),
}

/// JWT claims for a presigned link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkClaims {
    /// Object key the link grants access to
    pub key: String,

    /// Expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Issues and verifies presigned object links
pub struct UrlSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    base_url: String,
}

impl UrlSigner {
    /// Create a signer with the given secret and public base URL
    pub fn new(secret: &str, base_url: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sign a token granting access to `key` for `ttl_secs`
    pub fn sign_token(&self, key: &str, ttl_secs: u64) -> Result<String, SignerError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| SignerError::Clock)?
            .as_secs();

        let exp = now
            .checked_add(ttl_secs)
            .ok_or(SignerError::TtlOutOfRange(ttl_secs))?;

        let claims = LinkClaims {
            key: key.to_string(),
            exp,
            iat: now,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Build the full retrieval URL for `key`
    pub fn presign(&self, key: &str, ttl_secs: u64) -> Result<String, SignerError> {
        let token = self.sign_token(key, ttl_secs)?;
        Ok(format!("{}{}?token={}", self.base_url, BLOB_ROUTE, token))
    }

    /// Validate a token and return the key it grants
    pub fn verify(&self, token: &str) -> Result<String, SignerError> {
        let validation = Validation::default();
        let token_data = decode::<LinkClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SignerError::Expired,
                _ => SignerError::Invalid,
            })?;

        Ok(token_data.claims.key)
    }
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
