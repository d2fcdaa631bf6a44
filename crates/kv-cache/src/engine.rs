//! The cache engine: composes the entry table and access list under a
//! single mutex, implements SET/GET/DELETE with LRU replacement and
//! write-back, and coordinates flush on eviction and on shutdown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kv_wire::Status;

use crate::list::AccessList;
use crate::metrics::Metrics;
use crate::store_client::{PersistentStore, StoreError};

struct Inner {
    list: AccessList,
    table: HashMap<String, usize>,
}

/// Result of a SET. The reference's known quirk (see module docs on the
/// frontend handler) stands: a SET whose own insertion succeeded can still
/// carry a failed *eviction* write-back's status, for an unrelated key.
pub enum SetOutcome {
    Ok,
    EvictionWriteFailed(Status),
}

pub enum GetOutcome {
    Value(String),
    NotFound,
    Transport(Status),
}

pub enum DeleteOutcome {
    Ok,
    NotFound,
    Transport(Status),
}

/// Bounded, thread-safe write-back LRU cache with at most `capacity`
/// resident entries, backed by a [`PersistentStore`] for read-through and
/// write-back.
pub struct CacheEngine {
    inner: Mutex<Inner>,
    capacity: usize,
    store: Arc<dyn PersistentStore>,
    metrics: Metrics,
}

impl CacheEngine {
    pub fn new(capacity: usize, store: Arc<dyn PersistentStore>) -> Self {
        CacheEngine {
            inner: Mutex::new(Inner {
                list: AccessList::new(),
                table: HashMap::new(),
            }),
            capacity: capacity.max(1),
            store,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("engine mutex poisoned").list.len()
    }

    /// Evict the LRU tail if the cache is at capacity. Flushes the victim
    /// first if it is dirty. Returns the failure status of that flush, if
    /// any write-back was attempted and did not succeed.
    fn evict_if_full(&self, inner: &mut Inner) -> Option<Status> {
        if inner.list.len() < self.capacity {
            return None;
        }
        let victim = inner.list.back().expect("full cache must have a tail entry");
        let dirty = inner.list.is_dirty(victim);
        let mut failure = None;
        if dirty {
            let key = inner.list.key(victim).to_string();
            let value = inner.list.value(victim).to_string();
            if let Err(err) = self.store.put(&key, &value) {
                failure = Some(match err {
                    StoreError::NotFound => Status::InternalServerError,
                    StoreError::Transport(status) => status,
                });
            }
        }
        let (evicted_key, _, _) = inner.list.remove(victim);
        inner.table.remove(&evicted_key);
        failure
    }

    pub fn set(&self, key: &str, value: &str) -> SetOutcome {
        self.metrics.record_access();
        let mut inner = self.inner.lock().expect("engine mutex poisoned");

        if let Some(&idx) = inner.table.get(key) {
            self.metrics.record_hit();
            inner.list.set_value(idx, value.to_string());
            inner.list.set_dirty(idx, true);
            inner.list.move_to_front(idx);
            return SetOutcome::Ok;
        }

        let eviction_failure = self.evict_if_full(&mut inner);
        let idx = inner.list.push_front(key.to_string(), value.to_string(), true);
        inner.table.insert(key.to_string(), idx);

        match eviction_failure {
            Some(status) => SetOutcome::EvictionWriteFailed(status),
            None => SetOutcome::Ok,
        }
    }

    pub fn get(&self, key: &str) -> GetOutcome {
        self.metrics.record_access();

        {
            let mut inner = self.inner.lock().expect("engine mutex poisoned");
            if let Some(&idx) = inner.table.get(key) {
                self.metrics.record_hit();
                inner.list.move_to_front(idx);
                return GetOutcome::Value(inner.list.value(idx).to_string());
            }
        }
        // engine_lock released here: the backend round-trip below must not
        // hold it.

        match self.store.fetch(key) {
            Ok(value) => {
                let mut inner = self.inner.lock().expect("engine mutex poisoned");
                if let Some(&idx) = inner.table.get(key) {
                    // A concurrent populator won the race while we were
                    // talking to the backend; return its value as-is.
                    return GetOutcome::Value(inner.list.value(idx).to_string());
                }
                self.evict_if_full(&mut inner);
                let idx = inner.list.push_front(key.to_string(), value.clone(), false);
                inner.table.insert(key.to_string(), idx);
                GetOutcome::Value(value)
            }
            Err(StoreError::NotFound) => GetOutcome::NotFound,
            Err(StoreError::Transport(status)) => GetOutcome::Transport(status),
        }
    }

    pub fn delete(&self, key: &str) -> DeleteOutcome {
        self.metrics.record_access();

        {
            let mut inner = self.inner.lock().expect("engine mutex poisoned");
            if let Some(idx) = inner.table.remove(key) {
                self.metrics.record_hit();
                inner.list.remove(idx);
            }
        }

        match self.store.remove(key) {
            Ok(()) => DeleteOutcome::Ok,
            Err(StoreError::NotFound) => DeleteOutcome::NotFound,
            Err(StoreError::Transport(status)) => DeleteOutcome::Transport(status),
        }
    }

    /// Walk the access list front-to-back and write through every dirty
    /// entry, clearing its dirty flag on success. Called once, during
    /// shutdown, after all workers have joined — no concurrent callers
    /// remain, so holding `engine_lock` across each write-back is fine here.
    pub fn flush_all(&self) {
        let mut inner = self.inner.lock().expect("engine mutex poisoned");
        let indices = inner.list.front_to_back_indices();
        for idx in indices {
            if !inner.list.is_dirty(idx) {
                continue;
            }
            let key = inner.list.key(idx).to_string();
            let value = inner.list.value(idx).to_string();
            match self.store.put(&key, &value) {
                Ok(()) => inner.list.set_dirty(idx, false),
                Err(_) => eprintln!("[WARN] flush-all: failed to persist key {key}"),
            }
        }
    }
}
