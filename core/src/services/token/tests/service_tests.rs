//! Unit tests for token service

use chrono::Duration;
use std::sync::Arc;

use crate::domain::entities::{IdentityClaims, TokenKind};
use crate::errors::{DomainError, TokenError};
use crate::services::clock::{Clock, ManualClock};
use crate::services::token::{
    ClaimsSigner, JwtSigner, TokenProvider, TokenService, TokenServiceConfig,
};
use otp_shared::config::{JwtAlgorithm, JwtConfig};

const SECRET: &[u8] = b"test-secret-key-with-enough-bytes-for-hs256";

fn identity() -> IdentityClaims {
    IdentityClaims {
        user_id: 7,
        mobile_number: "09111112222".to_string(),
        roles: vec!["default".to_string()],
    }
}

fn service() -> (TokenService<JwtSigner>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let service = TokenService::new(
        JwtSigner::hs256(SECRET),
        clock.clone(),
        TokenServiceConfig::default(),
    );
    (service, clock)
}

fn token_error(err: DomainError) -> TokenError {
    match err {
        DomainError::Token(token) => token,
        other => panic!("expected token error, got {:?}", other),
    }
}

#[test]
fn test_pair_round_trips_identity() {
    let (service, clock) = service();
    let pair = service.generate_token_pair(&identity()).unwrap();

    assert_eq!(pair.access_expires_at, clock.now() + Duration::minutes(15));
    assert_eq!(pair.refresh_expires_at, clock.now() + Duration::days(7));

    let claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.identity(), identity());
    assert_eq!(claims.token_type, TokenKind::Access);
    assert_eq!(claims.exp, pair.access_expires_at.timestamp());

    let refresh_claims = JwtSigner::hs256(SECRET).verify(&pair.refresh_token).unwrap();
    assert_eq!(refresh_claims.identity(), identity());
    assert_eq!(refresh_claims.token_type, TokenKind::Refresh);
}

#[test]
fn test_refresh_issues_new_pair_for_same_identity() {
    let (service, clock) = service();
    let pair = service.generate_token_pair(&identity()).unwrap();

    clock.advance(Duration::hours(1));
    let refreshed = service.refresh(&pair.refresh_token).unwrap();

    assert_ne!(refreshed.access_token, pair.access_token);
    assert_eq!(refreshed.access_expires_at, clock.now() + Duration::minutes(15));
    let claims = service.verify_access_token(&refreshed.access_token).unwrap();
    assert_eq!(claims.identity(), identity());
}

#[test]
fn test_refresh_with_expired_token_fails_expired() {
    let (service, clock) = service();
    let pair = service.generate_token_pair(&identity()).unwrap();

    clock.advance(Duration::days(7));
    let err = service.refresh(&pair.refresh_token).unwrap_err();
    assert_eq!(token_error(err), TokenError::Expired);
}

#[test]
fn test_refresh_with_tampered_token_fails_invalid() {
    let (service, _) = service();
    let pair = service.generate_token_pair(&identity()).unwrap();

    let mut parts: Vec<String> = pair.refresh_token.split('.').map(str::to_string).collect();
    let mut signature: Vec<char> = parts[2].chars().collect();
    signature[10] = if signature[10] == 'A' { 'B' } else { 'A' };
    parts[2] = signature.into_iter().collect();
    let tampered = parts.join(".");

    let err = service.refresh(&tampered).unwrap_err();
    assert_eq!(token_error(err), TokenError::Invalid);
}

#[test]
fn test_refresh_with_garbage_fails_invalid() {
    let (service, _) = service();
    let err = service.refresh("not-a-jwt").unwrap_err();
    assert_eq!(token_error(err), TokenError::Invalid);
}

#[test]
fn test_token_signed_with_other_secret_is_invalid() {
    let (service, clock) = service();
    let foreign = TokenService::new(
        JwtSigner::hs256(b"another-secret-entirely-different-value"),
        clock,
        TokenServiceConfig::default(),
    );
    let pair = foreign.generate_token_pair(&identity()).unwrap();

    let err = service.refresh(&pair.refresh_token).unwrap_err();
    assert_eq!(token_error(err), TokenError::Invalid);
}

#[test]
fn test_access_token_cannot_be_used_to_refresh() {
    let (service, _) = service();
    let pair = service.generate_token_pair(&identity()).unwrap();

    let err = service.refresh(&pair.access_token).unwrap_err();
    assert_eq!(token_error(err), TokenError::Invalid);
    let err = service.verify_access_token(&pair.refresh_token).unwrap_err();
    assert_eq!(token_error(err), TokenError::Invalid);
}

#[test]
fn test_access_token_expires_before_refresh_token() {
    let (service, clock) = service();
    let pair = service.generate_token_pair(&identity()).unwrap();

    clock.advance(Duration::minutes(15));
    let err = service.verify_access_token(&pair.access_token).unwrap_err();
    assert_eq!(token_error(err), TokenError::Expired);
    assert!(service.refresh(&pair.refresh_token).is_ok());
}

#[test]
fn test_config_lifetimes_are_applied() {
    let clock = Arc::new(ManualClock::starting_now());
    let jwt = JwtConfig::new("config-secret").with_lifetimes(5 * 60, 24 * 60 * 60);
    let service = TokenService::new(
        JwtSigner::from_config(&jwt).unwrap(),
        clock.clone(),
        TokenServiceConfig::from(&jwt),
    );

    let pair = service.generate_token_pair(&identity()).unwrap();
    assert_eq!(pair.access_expires_at, clock.now() + Duration::minutes(5));
    assert_eq!(pair.refresh_expires_at, clock.now() + Duration::days(1));
}

#[test]
fn test_rs256_requires_key_paths() {
    let jwt = JwtConfig {
        algorithm: JwtAlgorithm::RS256,
        ..JwtConfig::default()
    };
    assert!(JwtSigner::from_config(&jwt).is_err());
    assert!(JwtSigner::rs256_from_pem(b"not a key", b"not a key").is_err());
}
