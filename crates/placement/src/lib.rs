//! Placement: the consistent-hash ring and per-worker key index that
//! together decide where a key lives and what the controller believes
//! about where it has been written.

pub mod consistent_hash;
pub mod key_index;

pub use consistent_hash::{ConsistentHash, DEFAULT_VIRTUAL_NODES};
pub use key_index::KeyIndex;
