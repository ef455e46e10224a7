use std::time::Duration;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims};

/// Validates HS256 bearer tokens and produces the request identity.
///
/// Token *issuance* belongs to the external identity provider; this service
/// only checks signatures and expiry.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway.as_secs();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(AuthenticatedUser {
            sub: data.claims.sub,
            roles: data.claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn issue(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600
    }

    #[test]
    fn test_valid_token_roundtrip() {
        let validator = JwtValidator::new("test-secret", Duration::from_secs(60));
        let token = issue(
            "test-secret",
            &Claims {
                sub: "user-1".to_string(),
                roles: vec!["citizen".to_string()],
                exp: future_exp(),
            },
        );

        let user = validator.validate_token(&token).unwrap();

        assert_eq!(user.sub, "user-1");
        assert!(user.has_role("citizen"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new("test-secret", Duration::from_secs(60));
        let token = issue(
            "other-secret",
            &Claims {
                sub: "user-1".to_string(),
                roles: vec![],
                exp: future_exp(),
            },
        );

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new("test-secret", Duration::from_secs(0));
        let token = issue(
            "test-secret",
            &Claims {
                sub: "user-1".to_string(),
                roles: vec![],
                exp: 1_000, // long past
            },
        );

        assert!(validator.validate_token(&token).is_err());
    }
}
