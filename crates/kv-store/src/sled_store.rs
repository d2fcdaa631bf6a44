//! Embedded on-disk `KvStore` backed by `sled`. Keys and values are stored
//! as UTF-8 bytes; `sled` handles its own durability and crash recovery, so
//! no WAL or fsync discipline is layered on top here.

use std::path::Path;

use crate::{KvStore, StoreBackendError};

pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreBackendError> {
        let db = sled::open(path).map_err(|e| StoreBackendError(format!("failed to open store: {e}")))?;
        Ok(SledStore { db })
    }
}

impl KvStore for SledStore {
    fn upsert(&self, key: &str, value: &str) -> Result<(), StoreBackendError> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| StoreBackendError(format!("upsert failed: {e}")))?;
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<Option<String>, StoreBackendError> {
        let found = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoreBackendError(format!("lookup failed: {e}")))?;
        Ok(found.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreBackendError> {
        let removed = self
            .db
            .remove(key.as_bytes())
            .map_err(|e| StoreBackendError(format!("delete failed: {e}")))?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SledStore {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("kv-store-test-{}-{n}", std::process::id()));
        SledStore::open(dir).expect("open sled store")
    }

    #[test]
    fn upsert_then_lookup_round_trips() {
        let store = temp_store();
        store.upsert("a", "1").unwrap();
        assert_eq!(store.lookup("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn upsert_replaces_existing_value() {
        let store = temp_store();
        store.upsert("a", "1").unwrap();
        store.upsert("a", "2").unwrap();
        assert_eq!(store.lookup("a").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn lookup_missing_key_is_none_not_error() {
        let store = temp_store();
        assert_eq!(store.lookup("missing").unwrap(), None);
    }

    #[test]
    fn delete_reports_whether_a_row_was_removed() {
        let store = temp_store();
        store.upsert("a", "1").unwrap();
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.lookup("a").unwrap(), None);
    }
}
