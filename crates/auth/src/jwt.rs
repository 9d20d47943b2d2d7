//! JWT decoding and signature verification.
//!
//! Signature checks use `jsonwebtoken`; temporal validity is delegated to the
//! deterministic [`crate::validate_claims`] so tests can control the clock.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token signature/decode failure: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HS256 (shared-secret) validator.
pub struct Hs256JwtValidator {
    decoding_key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(&secret),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Temporal claims are ours (issued_at/expires_at as RFC3339), so the
        // registered exp/nbf checks do not apply.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;

        let decoded = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &validation)?;
        validate_claims(&decoded.claims, now)?;
        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrincipalId, Role};
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use solvendo_core::TenantId;

    fn mint(secret: &str, issued: DateTime<Utc>, expires: DateTime<Utc>) -> String {
        let claims = JwtClaims {
            sub: PrincipalId::new(),
            tenant_id: TenantId::new(),
            roles: vec![Role::new("admin")],
            issued_at: issued,
            expires_at: expires,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("failed to encode jwt")
    }

    #[test]
    fn round_trip_validates() {
        let now = Utc::now();
        let token = mint("secret", now - Duration::minutes(1), now + Duration::minutes(10));
        let validator = Hs256JwtValidator::new(b"secret".to_vec());
        let claims = validator.validate(&token, now).expect("valid token");
        assert_eq!(claims.roles[0].as_str(), "admin");
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = Utc::now();
        let token = mint("secret", now - Duration::minutes(1), now + Duration::minutes(10));
        let validator = Hs256JwtValidator::new(b"other".to_vec());
        assert!(matches!(
            validator.validate(&token, now),
            Err(JwtError::Decode(_))
        ));
    }

    #[test]
    fn expired_token_rejected() {
        let now = Utc::now();
        let token = mint("secret", now - Duration::minutes(20), now - Duration::minutes(5));
        let validator = Hs256JwtValidator::new(b"secret".to_vec());
        assert!(matches!(
            validator.validate(&token, now),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }
}
