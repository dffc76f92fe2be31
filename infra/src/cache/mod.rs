//! Cache module for Redis-based storage
//!
//! `RedisClient` owns the connection, retries and per-command timeouts;
//! `RedisCacheStore` implements the core `CacheStore` on top of it.

pub mod redis_client;
pub mod redis_store;

pub use redis_client::RedisClient;
pub use redis_store::RedisCacheStore;

// Re-export commonly used types
pub use otp_shared::config::CacheConfig;
