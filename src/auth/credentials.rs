//! Registration-time credential policy
//!
//! Email addresses are accepted only for an explicit allow-list of domains;
//! this is an admission filter, not RFC 5322 validation. Passwords only
//! need to reach a minimum length.

use crate::{config::SecurityConfig, error::AppError};
use once_cell::sync::Lazy;
use regex::Regex;

static LOCAL_PART_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+$").expect("valid local-part regex"));

const MAX_EMAIL_LENGTH: usize = 254;

/// Canonical form of an email address used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.to_ascii_lowercase()
}

/// Registration policy derived from configuration
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    allowed_domains: Vec<String>,
    min_password_length: usize,
}

impl CredentialValidator {
    pub fn new(allowed_domains: Vec<String>, min_password_length: usize) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.trim().trim_start_matches('@').to_ascii_lowercase())
                .collect(),
            min_password_length,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.allowed_email_domains.clone(),
            config.password_min_length,
        )
    }

    /// True when `email` is `<local>@<allowed domain>`
    pub fn validate_email_format(&self, email: &str) -> bool {
        if email.len() > MAX_EMAIL_LENGTH {
            return false;
        }

        let Some((local, domain)) = email.rsplit_once('@') else {
            return false;
        };

        LOCAL_PART_REGEX.is_match(local)
            && self
                .allowed_domains
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(domain))
    }

    /// True when the password has at least the configured number of characters
    pub fn validate_password_strength(&self, password: &str) -> bool {
        password.chars().count() >= self.min_password_length
    }

    /// Apply both checks, rejecting with an input error on the first failure
    pub fn check_registration(&self, email: &str, password: &str) -> Result<(), AppError> {
        if !self.validate_email_format(email) {
            return Err(AppError::bad_request("Invalid email address"));
        }

        if !self.validate_password_strength(password) {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> CredentialValidator {
        CredentialValidator::new(vec!["gmail.com".to_string()], 8)
    }

    #[test]
    fn test_accepts_allowed_domain() {
        let v = validator();
        assert!(v.validate_email_format("u@gmail.com"));
        assert!(v.validate_email_format("first.last+tag@gmail.com"));
        assert!(v.validate_email_format("u@GMAIL.com"));
    }

    #[test]
    fn test_rejects_other_domains_and_garbage() {
        let v = validator();
        assert!(!v.validate_email_format("u@example.com"));
        assert!(!v.validate_email_format("u@gmail.com.evil.org"));
        assert!(!v.validate_email_format("u@notgmail.com"));
        assert!(!v.validate_email_format("@gmail.com"));
        assert!(!v.validate_email_format("gmail.com"));
        assert!(!v.validate_email_format("a b@gmail.com"));
        assert!(!v.validate_email_format(""));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("U@GMail.com"), "u@gmail.com");
        assert_eq!(normalize_email("u@gmail.com"), "u@gmail.com");
    }

    #[test]
    fn test_domain_list_normalized() {
        let v = CredentialValidator::new(vec![" @Example.org ".to_string()], 8);
        assert!(v.validate_email_format("u@example.org"));
    }

    #[test]
    fn test_password_length_threshold() {
        let v = validator();
        assert!(!v.validate_password_strength(""));
        assert!(!v.validate_password_strength("1234567"));
        assert!(v.validate_password_strength("12345678"));
        assert!(v.validate_password_strength("longpassword"));
        // 8 characters, more than 8 bytes
        assert!(v.validate_password_strength("pässwörd"));
    }

    #[test]
    fn test_check_registration_rejects_weak_password() {
        let v = validator();
        assert!(v.check_registration("u@gmail.com", "longpassword").is_ok());

        let err = v.check_registration("u@gmail.com", "short").unwrap_err();
        assert_eq!(err.code(), 400);

        let err = v.check_registration("u@yahoo.com", "longpassword").unwrap_err();
        assert_eq!(err.code(), 400);
    }
}
