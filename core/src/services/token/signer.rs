//! Signing capability for session tokens

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;
use std::fs;

use crate::domain::entities::Claims;
use crate::errors::{DomainResult, TokenError};
use otp_shared::config::{JwtAlgorithm, JwtConfig};

/// Signs claims and checks signatures. Expiry is judged by the caller.
pub trait ClaimsSigner: Send + Sync {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Decode a token whose signature and structure are valid
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// JWT signer backed by `jsonwebtoken`
pub struct JwtSigner {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl JwtSigner {
    fn with_keys(algorithm: Algorithm, encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry is checked against the injected clock by the token service
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// HMAC-SHA256 with a shared secret
    pub fn hs256(secret: &[u8]) -> Self {
        Self::with_keys(
            Algorithm::HS256,
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
        )
    }

    /// RSA-SHA256 from PEM-encoded keys
    pub fn rs256_from_pem(private_pem: &[u8], public_pem: &[u8]) -> DomainResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem).map_err(|e| TokenError::GenerationFailed {
            reason: format!("invalid RSA private key: {}", e),
        })?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem).map_err(|e| TokenError::GenerationFailed {
            reason: format!("invalid RSA public key: {}", e),
        })?;
        Ok(Self::with_keys(Algorithm::RS256, encoding_key, decoding_key))
    }

    /// Build the signer described by configuration, reading key files for RS256
    pub fn from_config(config: &JwtConfig) -> DomainResult<Self> {
        match config.algorithm {
            JwtAlgorithm::HS256 => Ok(Self::hs256(config.secret.as_bytes())),
            JwtAlgorithm::RS256 => {
                let read = |path: &Option<String>, which: &str| -> DomainResult<Vec<u8>> {
                    let path = path.as_deref().ok_or_else(|| TokenError::GenerationFailed {
                        reason: format!("RS256 requires jwt.{}_key_path", which),
                    })?;
                    fs::read(path).map_err(|e| {
                        TokenError::GenerationFailed {
                            reason: format!("cannot read {} key {}: {}", which, path, e),
                        }
                        .into()
                    })
                };
                let private_pem = read(&config.private_key_path, "private")?;
                let public_pem = read(&config.public_key_path, "public")?;
                Self::rs256_from_pem(&private_pem, &public_pem)
            }
        }
    }
}

impl ClaimsSigner for JwtSigner {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).map_err(|e| {
            TokenError::GenerationFailed {
                reason: e.to_string(),
            }
        })
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token failed signature or format checks");
                TokenError::Invalid
            })
    }
}
