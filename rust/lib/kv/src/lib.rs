//! Local key-value storage for the socialbook client.
//!
//! Plays the role browser local storage plays for a web client: a small
//! string-keyed store that survives restarts (`RedbStore`) or lives for the
//! process only (`MemoryStore`).

pub mod error;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::KVStore;
