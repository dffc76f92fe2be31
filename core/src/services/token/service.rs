//! Stateless token service

use std::sync::Arc;

use crate::domain::entities::{Claims, IdentityClaims, TokenKind, TokenPair};
use crate::errors::{DomainResult, TokenError};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;
use super::signer::ClaimsSigner;
use super::traits::TokenProvider;

/// Issues JWT pairs; no server-side session state is kept
pub struct TokenService<S: ClaimsSigner> {
    signer: S,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl<S: ClaimsSigner> TokenService<S> {
    pub fn new(signer: S, clock: Arc<dyn Clock>, config: TokenServiceConfig) -> Self {
        Self { signer, clock, config }
    }

    /// Verify signature, issuer, token kind and expiry, in that order
    fn decode(&self, token: &str, expected: TokenKind) -> DomainResult<Claims> {
        let claims = self.signer.verify(token)?;

        if claims.iss != self.config.issuer || claims.token_type != expected {
            tracing::warn!(
                expected = ?expected,
                actual = ?claims.token_type,
                "Token rejected: wrong issuer or token type"
            );
            return Err(TokenError::Invalid.into());
        }
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired.into());
        }
        Ok(claims)
    }
}

impl<S: ClaimsSigner> TokenProvider for TokenService<S> {
    fn generate_token_pair(&self, identity: &IdentityClaims) -> DomainResult<TokenPair> {
        let now = self.clock.now();
        let access_expires_at = now + self.config.access_token_ttl;
        let refresh_expires_at = now + self.config.refresh_token_ttl;

        let access = Claims::new(identity, TokenKind::Access, now, access_expires_at, &self.config.issuer);
        let refresh = Claims::new(identity, TokenKind::Refresh, now, refresh_expires_at, &self.config.issuer);

        let pair = TokenPair {
            access_token: self.signer.sign(&access)?,
            refresh_token: self.signer.sign(&refresh)?,
            access_expires_at,
            refresh_expires_at,
        };

        tracing::info!(
            user_id = identity.user_id,
            event = "tokens_issued",
            "Issued access and refresh tokens"
        );
        Ok(pair)
    }

    fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        self.generate_token_pair(&claims.identity())
    }

    fn verify_access_token(&self, access_token: &str) -> DomainResult<Claims> {
        self.decode(access_token, TokenKind::Access)
    }
}
