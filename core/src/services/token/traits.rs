//! Token provider trait

use crate::domain::entities::{Claims, IdentityClaims, TokenPair};
use crate::errors::DomainResult;

/// Mints, refreshes and verifies session tokens
pub trait TokenProvider: Send + Sync {
    /// Issue an access/refresh pair for `identity`
    fn generate_token_pair(&self, identity: &IdentityClaims) -> DomainResult<TokenPair>;

    /// Trade a refresh token for a new pair; `TokenError::Invalid` or
    /// `TokenError::Expired` on failure
    fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair>;

    /// Claims of a live access token
    fn verify_access_token(&self, access_token: &str) -> DomainResult<Claims>;
}
