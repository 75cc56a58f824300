//! Bearer token authentication.
//!
//! A single [`AuthGate`] guards every dispatch. When no token is configured
//! the gate runs in trusted mode and accepts all callers.

use std::fmt;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use thiserror::Error;

use crate::core::config::AuthConfig;

/// Authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Unauthorized: missing bearer token")]
    MissingCredential,

    #[error("Unauthorized: invalid bearer token")]
    InvalidCredential,
}

/// Compares presented credentials against the configured token.
#[derive(Clone, Default)]
pub struct AuthGate {
    token: Option<String>,
}

impl AuthGate {
    /// Build the gate from configuration. Empty tokens disable enforcement.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        }
    }

    /// Whether a token is configured.
    pub fn is_enforcing(&self) -> bool {
        self.token.is_some()
    }

    /// Accept or reject a credential.
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        let presented = credential.ok_or(AuthError::MissingCredential)?;
        if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }
}

/// Custom Debug implementation to redact the token from logs.
impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
pub fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn gate(token: Option<&str>) -> AuthGate {
        AuthGate::new(&AuthConfig {
            token: token.map(String::from),
        })
    }

    #[test]
    fn test_trusted_mode_accepts_everything() {
        let gate = gate(None);
        assert!(!gate.is_enforcing());
        assert!(gate.authorize(None).is_ok());
        assert!(gate.authorize(Some("anything")).is_ok());
    }

    #[test]
    fn test_blank_token_disables_enforcement() {
        assert!(!gate(Some("  ")).is_enforcing());
    }

    #[test]
    fn test_enforcing_mode() {
        let gate = gate(Some("s3cret"));
        assert_eq!(gate.authorize(None), Err(AuthError::MissingCredential));
        assert_eq!(
            gate.authorize(Some("wrong")),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(
            gate.authorize(Some("s3cre")),
            Err(AuthError::InvalidCredential)
        );
        assert!(gate.authorize(Some("s3cret")).is_ok());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let debug_str = format!("{:?}", gate(Some("super_secret_token")));
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_token"));
    }

    #[test]
    fn test_bearer_credential_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_credential(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_credential(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_credential(&headers), Some("abc"));
    }
}
