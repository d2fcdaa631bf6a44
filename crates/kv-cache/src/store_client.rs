//! Single shared connection to the backend's persistent store, guarded by
//! its own mutex. Speaks the backend-facing wire form: one request written,
//! one response read, per call. Never reconnects automatically — a failed
//! send or read surfaces as a transport error to the caller and, from
//! there, to the client's HTTP response.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Mutex;

use kv_wire::{response_body, url_encode, Status};

const READ_BUFFER_SIZE: usize = 10240;

/// Outcome of a store operation that did not simply succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend reported `404 Not Found`.
    NotFound,
    /// Anything else: a non-200/404 status, a send failure, a read failure,
    /// or an unparseable response. Carries the status to surface on the
    /// wire (best-effort; transport-level failures default to `503`).
    Transport(Status),
}

/// What the cache engine needs from a persistent store. Lets the engine's
/// tests substitute an in-memory stub for the real TCP-backed client.
pub trait PersistentStore: Send + Sync {
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn fetch(&self, key: &str) -> Result<String, StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Mutex-guarded keep-alive connection to the backend.
pub struct StoreClient {
    conn: Mutex<TcpStream>,
}

impl StoreClient {
    /// Open the connection. Fatal at startup if this fails — the caller is
    /// expected to treat an `Err` as a reason to abort rather than retry.
    pub fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(StoreClient {
            conn: Mutex::new(stream),
        })
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = format!("/db_set?key={}&value={}", url_encode(key), url_encode(value));
        let (status, _body) = self.round_trip(&path);
        if status == Status::Ok {
            Ok(())
        } else {
            Err(Self::classify(status))
        }
    }

    pub fn fetch(&self, key: &str) -> Result<String, StoreError> {
        let path = format!("/db_get?key={}", url_encode(key));
        let (status, body) = self.round_trip(&path);
        if status == Status::Ok {
            Ok(body)
        } else {
            Err(Self::classify(status))
        }
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = format!("/db_delete?key={}", url_encode(key));
        let (status, _body) = self.round_trip(&path);
        if status == Status::Ok {
            Ok(())
        } else {
            Err(Self::classify(status))
        }
    }

    fn classify(status: Status) -> StoreError {
        if status == Status::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Transport(status)
        }
    }

    /// Write one request, read one response, guarded by `conn`'s mutex so
    /// concurrent callers serialize rather than interleave on the socket.
    fn round_trip(&self, path_and_query: &str) -> (Status, String) {
        let mut stream = self.conn.lock().expect("store client mutex poisoned");

        let request = format!("GET {path_and_query} HTTP/1.1\r\nConnection: keep-alive\r\n\r\n");
        if stream.write_all(request.as_bytes()).is_err() {
            return (Status::ServiceUnavailable, String::from("Failed to send data to backend."));
        }

        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        let bytes_read = match stream.read(&mut buffer) {
            Ok(n) if n > 0 => n,
            _ => {
                return (
                    Status::ServiceUnavailable,
                    String::from("Read from backend failed or connection closed."),
                )
            }
        };

        let raw = String::from_utf8_lossy(&buffer[..bytes_read]).into_owned();
        match kv_wire::parse_status_line(&raw) {
            Some(status) => (status, response_body(&raw).to_string()),
            None => (Status::InternalServerError, String::from("Malformed backend response.")),
        }
    }
}

impl PersistentStore for StoreClient {
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        StoreClient::put(self, key, value)
    }

    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        StoreClient::fetch(self, key)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        StoreClient::remove(self, key)
    }
}
