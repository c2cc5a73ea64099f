//! HS256 JWT verification backed by `jsonwebtoken`.

use std::fmt;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::{AuthError, Claims};
use crate::config::SecuritySettings;
use crate::traits::TokenReader;

/// [`TokenReader`] that verifies HS256-signed JWTs.
///
/// Lifetime (`exp`) is always checked, with the configured leeway. The issuer
/// is not checked. The audience is checked only when one is configured.
#[derive(Clone)]
pub struct JwtTokenReader {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenReader {
    #[must_use]
    pub fn new(settings: &SecuritySettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = settings.token_leeway_secs;
        match settings.token_audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(settings.signing_key.as_bytes()),
            validation,
        }
    }
}

impl TokenReader for JwtTokenReader {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for JwtTokenReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenReader")
            .field("leeway", &self.validation.leeway)
            .field("validate_aud", &self.validation.validate_aud)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde_json::{json, Value};

    use super::*;

    pub(crate) const SECRET: &str = "test-signing-key";

    pub(crate) fn settings() -> SecuritySettings {
        SecuritySettings {
            signing_key: SECRET.to_string(),
            token_audience: None,
            token_leeway_secs: 0,
        }
    }

    /// Signs `claims` with `secret`, adding an `exp` one hour ahead unless
    /// the claims already carry one.
    pub(crate) fn sign(secret: &str, mut claims: Value) -> String {
        if claims.get("exp").is_none() {
            claims["exp"] = json!(get_current_timestamp() + 3600);
        }
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_token_signed_with_the_key() {
        let reader = JwtTokenReader::new(&settings());
        let token = sign(SECRET, json!({ "sub": "ana", "locale": "pt-BR" }));
        let claims = reader.verify(&token).unwrap();
        assert_eq!(claims["sub"], "ana");
        assert_eq!(reader.claim_value(&token, "locale").as_deref(), Some("pt-BR"));
    }

    #[test]
    fn rejects_token_signed_with_another_key() {
        let reader = JwtTokenReader::new(&settings());
        let token = sign("another-key", json!({ "sub": "ana" }));
        assert!(matches!(reader.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let reader = JwtTokenReader::new(&settings());
        let token = sign(SECRET, json!({ "sub": "ana", "exp": get_current_timestamp() - 600 }));
        assert!(reader.verify(&token).is_err());
    }

    #[test]
    fn leeway_tolerates_recent_expiry() {
        let reader = JwtTokenReader::new(&SecuritySettings {
            token_leeway_secs: 120,
            ..settings()
        });
        let token = sign(SECRET, json!({ "sub": "ana", "exp": get_current_timestamp() - 30 }));
        assert!(reader.verify(&token).is_ok());
    }

    #[test]
    fn rejects_garbage() {
        let reader = JwtTokenReader::new(&settings());
        assert!(reader.verify("not-a-jwt").is_err());
        assert!(reader.claim_value("not-a-jwt", "locale").is_none());
    }

    #[test]
    fn audience_is_ignored_when_not_configured() {
        let reader = JwtTokenReader::new(&settings());
        let token = sign(SECRET, json!({ "sub": "ana", "aud": "someone-else" }));
        assert!(reader.verify(&token).is_ok());
    }

    #[test]
    fn audience_is_checked_when_configured() {
        let reader = JwtTokenReader::new(&SecuritySettings {
            token_audience: Some("keel".to_string()),
            ..settings()
        });
        let good = sign(SECRET, json!({ "sub": "ana", "aud": "keel" }));
        let bad = sign(SECRET, json!({ "sub": "ana", "aud": "someone-else" }));
        assert!(reader.verify(&good).is_ok());
        assert!(reader.verify(&bad).is_err());
    }

    #[test]
    fn debug_does_not_expose_key() {
        let rendered = format!("{:?}", JwtTokenReader::new(&settings()));
        assert!(!rendered.contains(SECRET));
    }
}
