//! The backend's durable store: upsert / lookup / delete by string key.
//!
//! The specification leaves the storage engine itself an external
//! collaborator, specified only at this interface. [`SledStore`] is the one
//! concrete implementation, backed by an embedded on-disk tree rather than
//! a client/server database the backend would need to dial out to.

pub mod sled_store;

pub use sled_store::SledStore;

use std::fmt;

/// Failure reading or writing the durable store. Opaque beyond a display
/// message — callers map this to `500 Internal Server Error` on the wire.
#[derive(Debug)]
pub struct StoreBackendError(pub String);

impl fmt::Display for StoreBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreBackendError {}

/// Durable upsert/lookup/delete by opaque string key. Any store satisfying
/// this is sufficient; the backend's request handlers only ever go through
/// this trait.
pub trait KvStore: Send + Sync {
    /// Insert or replace the value for `key`.
    fn upsert(&self, key: &str, value: &str) -> Result<(), StoreBackendError>;

    /// Look up `key`; `Ok(None)` means the key is absent, not an error.
    fn lookup(&self, key: &str) -> Result<Option<String>, StoreBackendError>;

    /// Delete `key`; returns whether a row was actually removed.
    fn delete(&self, key: &str) -> Result<bool, StoreBackendError>;
}
