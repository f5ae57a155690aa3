/// JWT token issuance and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256) using a secret that is loaded
/// once at startup and held by a [`TokenService`]. They are stateless: there
/// is no refresh or revocation, and verification is signature + expiry only.
///
/// # Claims
///
/// - `sub`: user id (decimal string)
/// - `iss`: always `"tasknest"`
/// - `iat`, `nbf`: issue instant
/// - `exp`: issue instant plus the requested lifetime
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long", Duration::hours(24));
///
/// let issued = tokens.generate_token(7, Duration::hours(1))?;
/// let claims = tokens.validate_token(&issued.token)?;
/// assert_eq!(claims.user_id()?, 7);
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer embedded in and required of every token
pub const ISSUER: &str = "tasknest";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: String,

    /// Issuer - always "tasknest"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `user_id` expiring `expires_in` from now
    pub fn new(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Parses the subject back into a user id
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::ValidationError(format!("Invalid subject: {}", self.sub)))
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly signed token and when it stops being accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies tokens with a process-wide secret
///
/// Construct once from configuration and share behind an `Arc`; the keys
/// are immutable after construction.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC secret (should be at least 32 bytes)
    /// * `default_ttl` - lifetime used by [`TokenService::issue`]
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }

    /// Issues a token for `user_id` with the configured default lifetime
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, JwtError> {
        self.generate_token(user_id, self.default_ttl)
    }

    /// Issues a token for `user_id` valid for `duration` from now
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if signing fails
    pub fn generate_token(&self, user_id: i64, duration: Duration) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(user_id, duration);
        let token = self.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Signs arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and extracts its claims
    ///
    /// Verifies the signature, `exp` and `nbf` (no leeway) and the issuer.
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` once `exp` has passed
    /// - `JwtError::InvalidIssuer` for foreign tokens
    /// - `JwtError::ValidationError` for anything else
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24))
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, Duration::hours(1));

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_generate_and_validate_token() {
        let tokens = service();

        let issued = tokens.generate_token(7, Duration::minutes(5)).unwrap();
        let claims = tokens.validate_token(&issued.token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.expires_at(), issued.expires_at);
    }

    #[test]
    fn test_issue_uses_default_ttl() {
        let tokens = TokenService::new(SECRET, Duration::hours(2));
        let issued = tokens.issue(1).unwrap();

        let remaining = issued.expires_at - Utc::now();
        assert!(remaining.num_seconds() > 7100);
        assert!(remaining.num_seconds() <= 7200);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issued = service().issue(7).unwrap();
        let other = TokenService::new("another-secret-key-at-least-32-bytes", Duration::hours(1));

        assert!(matches!(
            other.validate_token(&issued.token),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_expired_token() {
        let tokens = service();

        // Negative duration = already expired
        let issued = tokens.generate_token(7, Duration::seconds(-3600)).unwrap();

        assert!(matches!(
            tokens.validate_token(&issued.token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_token_expires_after_its_lifetime() {
        let tokens = service();
        let issued = tokens.generate_token(7, Duration::seconds(1)).unwrap();
        assert!(tokens.validate_token(&issued.token).is_ok());

        std::thread::sleep(std::time::Duration::from_millis(2100));

        assert!(matches!(
            tokens.validate_token(&issued.token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let tokens = service();
        let mut claims = Claims::new(7, Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = tokens.encode(&claims).unwrap();

        assert!(matches!(
            tokens.validate_token(&token),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(service().validate_token("not.a.jwt").is_err());
        assert!(service().validate_token("").is_err());
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let mut claims = Claims::new(7, Duration::hours(1));
        claims.sub = "alice".to_string();
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains(SECRET));
    }
}
