//! Token issue and validation
//!
//! PASETO v4.local over a process-wide 32-byte symmetric key. Issue and
//! validate are purely cryptographic/temporal: no persistence is
//! consulted, and nothing beyond `{sub, iat, exp}` is encoded.

use base64::{engine::general_purpose, Engine as _};
use chrono::Duration;
use rusty_paseto::prelude::*;

use crate::error::{Error, Result};

use super::claims::AccessTokenClaims;

/// Process-wide token service
///
/// Constructed once at startup from configuration and never re-read.
pub struct TokenService {
    key: [u8; 32],
    session_ttl: Duration,
    access_ttl: Duration,
}

impl TokenService {
    pub fn new(key: [u8; 32], session_ttl: Duration, access_ttl: Duration) -> Self {
        Self {
            key,
            session_ttl,
            access_ttl,
        }
    }

    fn paseto_key(&self) -> PasetoSymmetricKey<V4, Local> {
        PasetoSymmetricKey::<V4, Local>::from(Key::from(self.key))
    }

    /// Issue a token for `subject`.
    ///
    /// Without an explicit lifetime the short access-token default is
    /// used; login flows pass the longer session lifetime explicitly.
    pub fn issue(&self, subject: &str, lifetime: Option<Duration>) -> Result<String> {
        let claims = AccessTokenClaims::new(
            subject.to_string(),
            lifetime.unwrap_or(self.access_ttl),
        );
        let iat = claims.iat.to_rfc3339();
        let exp = claims.exp.to_rfc3339();

        let token = PasetoBuilder::<V4, Local>::default()
            .set_claim(SubjectClaim::from(claims.sub.as_str()))
            .set_claim(IssuedAtClaim::try_from(iat.as_str()).map_err(|e| Error::Token {
                message: e.to_string(),
            })?)
            .set_claim(ExpirationClaim::try_from(exp.as_str()).map_err(|e| Error::Token {
                message: e.to_string(),
            })?)
            .build(&self.paseto_key())
            .map_err(|e| Error::Token {
                message: e.to_string(),
            })?;
        Ok(token)
    }

    /// Issue a token with the long session lifetime (login flow).
    pub fn issue_session(&self, subject: &str) -> Result<String> {
        self.issue(subject, Some(self.session_ttl))
    }

    /// Verify and decode a token.
    ///
    /// Malformed structure, a wrong key, tampering and an elapsed
    /// expiry all fail here; callers must not relay which one it was.
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims> {
        let key = self.paseto_key();
        let value = PasetoParser::<V4, Local>::default()
            .parse(token, &key)
            .map_err(|e| Error::InvalidToken {
                reason: e.to_string(),
            })?;

        let claims: AccessTokenClaims =
            serde_json::from_value(value).map_err(|e| Error::InvalidToken {
                reason: e.to_string(),
            })?;

        if claims.is_expired() {
            return Err(Error::TokenExpired);
        }
        Ok(claims)
    }
}

/// Extract the opaque token from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ")
}

/// Parse key material from its configured representation.
///
/// Accepts 64 hex chars, base64/base64url of 32 bytes, or 32 raw bytes.
pub fn parse_key_material(raw: &str) -> Option<[u8; 32]> {
    let trimmed = raw.trim();

    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = decode_hex(trimmed)?;
        return bytes.as_slice().try_into().ok();
    }

    if let Ok(bytes) = general_purpose::URL_SAFE_NO_PAD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    if let Ok(bytes) = general_purpose::STANDARD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    let raw_bytes = trimmed.as_bytes();
    if raw_bytes.len() == 32 {
        return raw_bytes.try_into().ok();
    }

    None
}

/// Fresh random key, for processes started without configured material.
pub fn random_key() -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    getrandom::getrandom(&mut key).map_err(|e| Error::Token {
        message: e.to_string(),
    })?;
    Ok(key)
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(input.len() / 2);
    let mut chars = input.chars();
    while let (Some(h), Some(l)) = (chars.next(), chars.next()) {
        let hi = h.to_digit(16)?;
        let lo = l.to_digit(16)?;
        bytes.push(((hi << 4) | lo) as u8);
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new([7u8; 32], Duration::minutes(300), Duration::minutes(15))
    }

    #[test]
    fn test_issue_validate_roundtrip() {
        let svc = service();
        let token = svc.issue_session("a@x.com").unwrap();
        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_default_lifetime_is_short_access_ttl() {
        let svc = service();
        let token = svc.issue("a@x.com", None).unwrap();
        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, Duration::minutes(15));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let svc = service();
        let other = TokenService::new([8u8; 32], Duration::minutes(300), Duration::minutes(15));
        let token = svc.issue_session("a@x.com").unwrap();
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let mut token = svc.issue_session("a@x.com").unwrap();
        token.pop();
        token.push('A');
        assert!(svc.validate(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let svc = service();
        assert!(svc.validate("not-a-token").is_err());
        assert!(svc.validate("").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let token = svc.issue("a@x.com", Some(Duration::minutes(-5))).unwrap();
        assert!(svc.validate(&token).is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_parse_key_material_forms() {
        let hex = "07".repeat(32);
        assert_eq!(parse_key_material(&hex), Some([7u8; 32]));

        let b64 = general_purpose::STANDARD.encode([7u8; 32]);
        assert_eq!(parse_key_material(&b64), Some([7u8; 32]));

        let raw: String = "x".repeat(32);
        assert_eq!(parse_key_material(&raw), Some([b'x'; 32]));

        assert_eq!(parse_key_material("too-short"), None);
    }
}
