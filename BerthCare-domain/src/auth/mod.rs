//! Device session tokens
//!
//! Short-lived access tokens and device-bound refresh tokens are HS256 JWTs.
//! Refresh tokens are also recorded (by id and SHA-256 hash) in the refresh
//! token store, which is what makes rotation and revocation possible.

pub mod refresh;
pub mod token;

use berthcare_data::RepositoryError;
use thiserror::Error;

pub use refresh::{IssuedRefreshToken, RefreshOutcome, RefreshRequest, RefreshService};
pub use token::{hash_token, AccessClaims, RefreshClaims, SignedToken, TokenSigner};

/// Token operation failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT_SECRET is not configured")]
    NotConfigured,

    /// Bad signature, issuer, audience or shape
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Token was issued to a different device")]
    DeviceMismatch,

    /// Signed correctly but unknown to the token store
    #[error("Token not found")]
    NotFound,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
