use crate::models::VerifiedIdentity;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when issuing or verifying sessions
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing session token")]
    Missing,

    #[error("Invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Session has been revoked")]
    Revoked,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Email of the logged-in user
    pub sub: String,
    pub username: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Freshly issued session token
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Session mechanism mapping a logged-in identity to a signed bearer token
///
/// Tokens are HS256 JWTs. Logout revokes a token by id; revocations are
/// kept in memory for the lifetime of a token.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: u64,
    revoked: moka::future::Cache<String, ()>,
}

impl SessionManager {
    pub fn new(secret: &str, issuer: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let revoked = moka::future::Cache::builder()
            .max_capacity(100_000)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.to_string(),
            ttl_secs,
            revoked,
        }
    }

    /// Issue a token for an authenticated user
    pub fn issue(&self, email: &str, username: &str) -> Result<IssuedSession, SessionError> {
        let now = Utc::now();
        let expires_at = now + ChronoDuration::seconds(self.ttl_secs as i64);

        let claims = SessionClaims {
            sub: email.to_string(),
            username: username.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        tracing::debug!("Issued session {} for {}", claims.jti, email);

        Ok(IssuedSession { token, expires_at })
    }

    /// Verify a token and return the identity it vouches for
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Missing);
        }

        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;

        if self.revoked.contains_key(&data.claims.jti) {
            return Err(SessionError::Revoked);
        }

        Ok(VerifiedIdentity {
            email: data.claims.sub,
            username: data.claims.username,
            token_id: data.claims.jti,
        })
    }

    /// Revoke the session behind a verified identity
    pub async fn revoke(&self, identity: &VerifiedIdentity) {
        self.revoked.insert(identity.token_id.clone(), ()).await;
        tracing::debug!("Revoked session {} for {}", identity.token_id, identity.email);
    }
}
