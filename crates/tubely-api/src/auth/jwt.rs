//! HS256 bearer token validation.
//!
//! Tokens are minted by an external identity service sharing `JWT_SECRET`;
//! this service only checks them. `issue_token` is built for tests only.

use crate::auth::models::JwtClaims;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
#[cfg(any(test, feature = "test-utils"))]
use {
    chrono::{Duration, Utc},
    jsonwebtoken::{encode, EncodingKey, Header},
    uuid::Uuid,
};
use tubely_core::AppError;

#[derive(Clone)]
pub struct JwtService {
    #[cfg(any(test, feature = "test-utils"))]
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            #[cfg(any(test, feature = "test-utils"))]
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn issue_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::Unauthorized("Invalid token signature".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                        AppError::Unauthorized("Unsupported token algorithm".to_string())
                    }
                    _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-chars!!";

    #[test]
    fn test_issue_then_validate() {
        let jwt = JwtService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = jwt.issue_token(user_id, Duration::minutes(5)).unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = JwtService::new(SECRET);
        let token = jwt
            .issue_token(Uuid::new_v4(), Duration::seconds(-60))
            .unwrap();

        match jwt.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = JwtService::new("another-secret-that-is-also-32-chars-long")
            .issue_token(Uuid::new_v4(), Duration::minutes(5))
            .unwrap();

        assert!(matches!(
            JwtService::new(SECRET).validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            JwtService::new(SECRET).validate_token("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
