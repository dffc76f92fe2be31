//! Cache store abstraction and the in-process implementation

pub mod memory;
pub mod traits;


pub use memory::InMemoryCacheStore;
pub use traits::{CacheEntry, CacheStore, CasTtl};

/// Read/compare-and-set rounds before an OTP challenge key is reported as
/// contended. A challenge only moves through a few states, so every lost
/// round leaves one fewer write that can beat the next round.
pub const MAX_CAS_ATTEMPTS: usize = 32;
