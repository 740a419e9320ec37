//! Ports used by login and the bearer-token extractor.

use uuid::Uuid;

/// Identity carried inside an access token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and checks access tokens.
pub trait TokenService: Send + Sync {
    fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String, AuthError>;

    /// Decode `token`, rejecting bad signatures, foreign issuers and expired tokens.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of a freshly issued token, in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// One-way password hashing with per-hash salts.
pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` on a mismatch; `Err` only when `hash` cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Password hashing failed: {0}")]
    HashingError(String),
}
