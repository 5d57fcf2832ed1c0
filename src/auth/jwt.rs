//! Stateless session tokens (HS256 JWT)
//! Issues and validates signed, time-bounded identity tokens

use crate::{
    config::SecurityConfig,
    error::{AppError, AuthFailure},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Signed token payload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub email: String,

    /// Display name of the account holder
    pub name: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Verified caller identity, reconstructed from a token on every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: String,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A freshly issued token together with the identity it encodes
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub identity: Identity,
}

/// Token codec holding the process-wide signing key.
///
/// The key is fixed for the lifetime of the codec; constructing a codec
/// with a different secret invalidates every token the old one issued.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let secret = config.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let ttl_secs = i64::try_from(config.token_ttl_secs)
            .map_err(|_| AppError::Config("token_ttl_secs out of range".to_string()))?;

        Ok(Self::new(secret.as_bytes(), Duration::seconds(ttl_secs)))
    }

    fn new(secret: &[u8], ttl: Duration) -> Self {
        // Expiry is checked by hand against an explicit clock, after the signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for the given account
    pub fn issue(&self, email: &str, display_name: &str) -> Result<IssuedToken, AppError> {
        self.issue_at(email, display_name, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        email: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let claims = Claims {
            email: email.to_string(),
            name: display_name.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                tracing::error!("Failed to encode token: {:?}", e);
                AppError::Internal(format!("Failed to encode token: {}", e))
            },
        )?;

        let identity = identity_from_claims(claims)?;

        Ok(IssuedToken { token, identity })
    }

    /// Validate a token and reconstruct the identity it carries
    pub fn validate(&self, token: &str) -> Result<Identity, AppError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against an explicit clock.
    ///
    /// Order: signature, then expiry, then payload decoding. Every failure
    /// surfaces as `Unauthorized`; the inner reason is for logs only.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature => AuthFailure::Tampered,
                    _ => AuthFailure::Malformed,
                };
                tracing::debug!(reason = %reason, "Token validation failed: {:?}", e);
                AppError::Unauthorized(reason)
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            tracing::debug!(exp = claims.exp, "Token validation failed: expired");
            return Err(AppError::Unauthorized(AuthFailure::Expired));
        }

        identity_from_claims(claims).map_err(|_| AppError::Unauthorized(AuthFailure::Malformed))
    }
}

fn identity_from_claims(claims: Claims) -> Result<Identity, AppError> {
    let issued_at = timestamp(claims.iat)?;
    let expires_at = timestamp(claims.exp)?;

    Ok(Identity {
        email: claims.email,
        display_name: claims.name,
        issued_at,
        expires_at,
    })
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AppError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("timestamp out of range: {}", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_32_characters_long!";

    fn service() -> JwtService {
        JwtService::new(SECRET, Duration::hours(1))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = service();

        let issued = service.issue("u@gmail.com", "User").unwrap();
        let identity = service.validate(&issued.token).unwrap();

        assert_eq!(identity, issued.identity);
        assert_eq!(identity.email, "u@gmail.com");
        assert_eq!(identity.display_name, "User");
        assert_eq!(identity.expires_at - identity.issued_at, Duration::hours(1));
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let issued_at = at(1_700_000_000);
        let issued = service.issue_at("u@gmail.com", "User", issued_at).unwrap();

        let just_before = issued_at + Duration::hours(1) - Duration::seconds(1);
        assert!(service.validate_at(&issued.token, just_before).is_ok());

        let just_after = issued_at + Duration::hours(1) + Duration::seconds(1);
        let err = service.validate_at(&issued.token, just_after).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(AuthFailure::Expired)));
    }

    #[test]
    fn test_wrong_secret_is_tampered() {
        let issued = service().issue("u@gmail.com", "User").unwrap();
        let other = JwtService::new(b"another_secret_key_32_characters_x", Duration::hours(1));

        let err = other.validate(&issued.token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(AuthFailure::Tampered)));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let service = service();
        let issued = service.issue_at("u@gmail.com", "User", at(1_000)).unwrap();
        let other = JwtService::new(b"another_secret_key_32_characters_x", Duration::hours(1));

        // Expired AND wrongly signed: the signature failure wins
        let err = other.validate_at(&issued.token, at(1_000_000)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(AuthFailure::Tampered)));
    }

    #[test]
    fn test_any_single_character_mutation_fails() {
        let service = service();
        let issued = service.issue("u@gmail.com", "User").unwrap();
        let token = issued.token;

        for (idx, ch) in token.char_indices() {
            if ch == '.' {
                continue;
            }
            let replacement = if ch == 'A' { 'B' } else { 'A' };
            let mut mutated = token.clone();
            mutated.replace_range(idx..idx + 1, &replacement.to_string());

            assert!(
                service.validate(&mutated).is_err(),
                "mutation at byte {} was accepted",
                idx
            );
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = service().validate("invalid_token").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(AuthFailure::Malformed)));
        assert!(service().validate("").is_err());
    }

    #[test]
    fn test_from_config_rejects_short_secret() {
        let config = SecurityConfig {
            jwt_secret: secrecy::Secret::new("short".to_string()),
            token_ttl_secs: 3600,
            password_min_length: 8,
            allowed_email_domains: vec!["gmail.com".to_string()],
            password_hash_memory_kib: 19456,
            password_hash_iterations: 2,
            password_hash_parallelism: 1,
        };

        assert!(JwtService::from_config(&config).is_err());
    }
}
