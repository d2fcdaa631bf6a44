//! Registry of sockets currently bound to a worker, so that shutdown can
//! deliver a canned notice to every in-flight client before the process
//! tears down the rest of its state.
//!
//! This is a leaf lock: code holding `engine_lock` or `store_lock` must
//! never also try to take this one, and nothing here ever reaches back into
//! either of those.

use std::collections::HashMap;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use kv_wire::{Response, Status};

/// Thread-safe registry mapping a per-connection id to its socket handle.
pub struct LiveSockets {
    sockets: Mutex<HashMap<u64, TcpStream>>,
    next_id: AtomicU64,
}

impl LiveSockets {
    pub fn new() -> Self {
        LiveSockets {
            sockets: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a socket on connection entry. The handler must call
    /// [`LiveSockets::remove`] with the returned id on exit, success or not.
    pub fn insert(&self, stream: &TcpStream) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let clone = stream.try_clone().expect("socket clone for live registry");
        self.sockets
            .lock()
            .expect("live sockets mutex poisoned")
            .insert(id, clone);
        id
    }

    pub fn remove(&self, id: u64) {
        self.sockets.lock().expect("live sockets mutex poisoned").remove(&id);
    }

    /// Send a canned `503 Service Unavailable` / `Connection: close` to
    /// every currently-registered socket, then half-close and close it.
    /// Best-effort: write or shutdown failures are swallowed, since the
    /// peer may already have gone away. Per-worker handlers observe their
    /// next read failing and exit on their own.
    pub fn broadcast_shutdown_notice(&self) {
        let response = Response::new(Status::ServiceUnavailable, "Server is shutting down.", false);
        let bytes = response.to_bytes();

        let mut sockets = self.sockets.lock().expect("live sockets mutex poisoned");
        for (_, mut stream) in sockets.drain() {
            use std::io::Write;
            let _ = stream.write_all(&bytes);
            let _ = stream.flush();
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    pub fn len(&self) -> usize {
        self.sockets.lock().expect("live sockets mutex poisoned").len()
    }
}

impl Default for LiveSockets {
    fn default() -> Self {
        LiveSockets::new()
    }
}
