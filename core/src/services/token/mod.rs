//! Session token issuance and refresh

pub mod config;
pub mod service;
pub mod signer;
pub mod traits;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
pub use signer::{ClaimsSigner, JwtSigner};
pub use traits::TokenProvider;
