use crate::types::{Account, AccountId, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only algorithm this service signs with or accepts.
pub const PINNED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Identity claims carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; the account id in textual form.
    pub sub: String,
    /// Account id.
    pub uid: AccountId,
    pub username: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Projects the claims into the account they assert.
    pub fn account(&self) -> Account {
        Account {
            id: self.uid,
            username: self.username.clone(),
        }
    }
}

/// Symmetric signing secret. Debug output is redacted.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(<{} bytes>)", self.0.len())
    }
}

/// Issues and verifies HS256 tokens.
///
/// The secret, default TTL and leeway are fixed at construction.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    leeway_secs: u64,
}

impl TokenCodec {
    /// Creates a codec with no clock-skew leeway.
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        Self::with_leeway(secret, ttl, 0)
    }

    /// Creates a codec that accepts tokens up to `leeway_secs` past expiry.
    ///
    /// A non-zero leeway is a deliberate relaxation of the expiry rule.
    pub fn with_leeway(secret: &SigningSecret, ttl: Duration, leeway_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&secret.0),
            decoding_key: DecodingKey::from_secret(&secret.0),
            ttl,
            leeway_secs,
        }
    }

    /// Issues a token valid for the configured TTL.
    pub fn issue(&self, account: &Account) -> Result<String, AuthError> {
        self.generate(&account.id, &account.username, self.ttl)
    }

    /// Issues a token valid for `ttl` from now.
    pub fn generate(
        &self,
        account_id: &AccountId,
        username: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            AuthError::SigningFailure(format!("Token lifetime {} is out of range", ttl))
        })?;
        let claims = Claims {
            sub: account_id.to_string(),
            uid: *account_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(PINNED_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailure(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Structure, algorithm tag, signature and expiry are all checked. Any
    /// failure is reported as `InvalidToken`; the specific cause is only
    /// logged.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let cause = match e.kind() {
                    ErrorKind::InvalidAlgorithm => "algorithm mismatch",
                    ErrorKind::InvalidSignature => "bad signature",
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidToken | ErrorKind::Base64(_) => "malformed",
                    ErrorKind::Json(_) => "undecodable claims",
                    ErrorKind::MissingRequiredClaim(_) => "missing claim",
                    _ => "rejected",
                };
                tracing::debug!(cause, error = %e, "token rejected");
                AuthError::InvalidToken
            })?;

        // Expiry is exclusive: a token is dead at the second it expires.
        let now = Utc::now().timestamp();
        let leeway = i64::try_from(self.leeway_secs).unwrap_or(i64::MAX);
        if now >= claims.exp.saturating_add(leeway) {
            tracing::debug!(cause = "expired", exp = claims.exp, now, "token rejected");
            return Err(AuthError::InvalidToken);
        }

        if claims.sub != claims.uid.to_string() {
            tracing::debug!(cause = "subject mismatch", "token rejected");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-chars";

    fn create_test_codec() -> TokenCodec {
        TokenCodec::new(&SigningSecret::new(SECRET), Duration::minutes(15))
    }

    fn test_account() -> Account {
        Account {
            id: AccountId::new(),
            username: "alice".to_string(),
        }
    }

    /// Replaces the character at `idx` with one guaranteed to change the
    /// decoded bits, even in the final base64url symbol.
    fn flip_char(token: &str, idx: usize) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        chars[idx] = if chars[idx] == 'A' { 'Q' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_token_round_trip() {
        let codec = create_test_codec();
        let account = test_account();

        let token = codec.issue(&account).expect("should generate token");
        let claims = codec.verify(&token).expect("should verify token");

        assert_eq!(claims.uid, account.id);
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.account(), account);
    }

    #[test]
    fn test_claims_timestamps() {
        let codec = create_test_codec();
        let token = codec.issue(&test_account()).unwrap();
        let claims = codec.verify(&token).unwrap();

        let now = Utc::now().timestamp();
        assert!(claims.iat <= now && claims.iat >= now - 5);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let codec = create_test_codec();
        let account = test_account();

        let token = codec
            .generate(&account.id, &account.username, Duration::zero())
            .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_elapsed_ttl_is_expired() {
        let codec = create_test_codec();
        let account = test_account();

        let token = codec
            .generate(&account.id, &account.username, Duration::seconds(-30))
            .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_out_of_range_ttl_is_signing_failure() {
        let codec = create_test_codec();
        let account = test_account();

        for ttl in [
            Duration::seconds(i64::MAX / 1000),
            Duration::seconds(-(i64::MAX / 1000)),
            Duration::minutes(200_000_000_000),
        ] {
            assert!(matches!(
                codec.generate(&account.id, &account.username, ttl),
                Err(AuthError::SigningFailure(_))
            ));
        }
    }

    #[test]
    fn test_leeway_accepts_recently_expired() {
        let secret = SigningSecret::new(SECRET);
        let codec = TokenCodec::with_leeway(&secret, Duration::minutes(15), 60);
        let account = test_account();

        let token = codec
            .generate(&account.id, &account.username, Duration::seconds(-5))
            .unwrap();

        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = create_test_codec();
        let token = codec.issue(&test_account()).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for idx in sig_start..token.len() {
            let tampered = flip_char(&token, idx);
            assert_ne!(tampered, token);
            assert_eq!(
                codec.verify(&tampered),
                Err(AuthError::InvalidToken),
                "flipping signature char {} should invalidate",
                idx - sig_start
            );
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = create_test_codec();
        let token = codec.issue(&test_account()).unwrap();
        let payload_start = token.find('.').unwrap() + 1;

        let tampered = flip_char(&token, payload_start + 3);
        assert_eq!(codec.verify(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_other_hmac_algorithms_rejected() {
        let codec = create_test_codec();
        let account = test_account();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account.id.to_string(),
            uid: account.id,
            username: account.username.clone(),
            iat: now,
            exp: now + 600,
        };

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            // Self-consistent token: correct secret, signature matches its header.
            let token = encode(
                &Header::new(alg),
                &claims,
                &EncodingKey::from_secret(SECRET.as_bytes()),
            )
            .unwrap();

            assert_eq!(
                codec.verify(&token),
                Err(AuthError::InvalidToken),
                "{:?} must not be accepted",
                alg
            );
        }
    }

    #[test]
    fn test_token_without_iat_rejected() {
        let codec = create_test_codec();
        let account = test_account();
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": account.id.to_string(),
            "uid": account.id,
            "username": account.username,
            "exp": now + 600,
        });

        let token = encode(
            &Header::new(PINNED_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let codec = create_test_codec();
        let token = codec.issue(&test_account()).unwrap();
        let payload = token.split('.').nth(1).unwrap();

        // {"alg":"none","typ":"JWT"}
        let none_header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        let forged = format!("{}.{}.", none_header, payload);

        assert_eq!(codec.verify(&forged), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec1 = TokenCodec::new(
            &SigningSecret::new("secret-one-that-is-32-chars-long"),
            Duration::minutes(15),
        );
        let codec2 = TokenCodec::new(
            &SigningSecret::new("secret-two-that-is-32-chars-long"),
            Duration::minutes(15),
        );

        let token = codec1.issue(&test_account()).unwrap();

        assert_eq!(codec2.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = create_test_codec();

        for token in ["", "invalid.token.here", "a.b", "...", "not a token at all"] {
            assert_eq!(codec.verify(token), Err(AuthError::InvalidToken));
        }
    }

    #[test]
    fn test_tokens_for_same_account_differ_over_time() {
        let codec = create_test_codec();
        let account = test_account();

        let first = codec.issue(&account).unwrap();
        let later = codec
            .generate(&account.id, &account.username, Duration::minutes(16))
            .unwrap();

        assert_ne!(first, later);
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = SigningSecret::new(SECRET);
        assert!(!format!("{:?}", secret).contains("test-secret"));
        assert_eq!(secret.len(), SECRET.len());
        assert!(!secret.is_empty());
        assert!(SigningSecret::new("").is_empty());
    }
}
