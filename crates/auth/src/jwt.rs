//! JWT decoding behind a trait, so the HTTP layer never names an algorithm.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and returns the session claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError>;
}

/// HS256 shared-secret validator.
///
/// Time-window validation is done deterministically against the supplied
/// `now` (not the library's wall clock), so tests can pin time.
pub struct Hs256JwtValidator {
    key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Claim time windows are checked by `validate_claims` against `now`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.key, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlatformRole, PrincipalId};
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(secret: &str, claims: &SessionClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode jwt")
    }

    #[test]
    fn round_trip_with_valid_secret() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: PrincipalId::new(),
            platform_role: PlatformRole::Admin,
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        };

        let token = mint("s3cret", &claims);
        let validator = Hs256JwtValidator::new("s3cret");
        let decoded = validator.validate(&token, now).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert!(decoded.platform_role.is_admin());
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: PrincipalId::new(),
            platform_role: PlatformRole::User,
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        };

        let token = mint("right", &claims);
        let validator = Hs256JwtValidator::new("wrong");
        assert!(matches!(
            validator.validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn expired_token_rejected() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: PrincipalId::new(),
            platform_role: PlatformRole::User,
            issued_at: now - Duration::minutes(20),
            expires_at: now - Duration::minutes(10),
        };

        let token = mint("s3cret", &claims);
        let validator = Hs256JwtValidator::new("s3cret");
        assert_eq!(
            validator.validate(&token, now),
            Err(TokenValidationError::Expired)
        );
    }
}
