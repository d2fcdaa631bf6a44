//! Per-connection handler: parses a single HTTP-shaped request line,
//! dispatches to the cache engine, and emits a response with the correct
//! `Connection` header. Registers itself in the live-sockets set for the
//! duration of the connection so shutdown can notify it.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use kv_cache::{CacheEngine, DeleteOutcome, GetOutcome, SetOutcome};
use kv_server::{ConnectionHandler, LiveSockets};
use kv_wire::{ParsedRequest, Response, Status};

const READ_BUFFER_SIZE: usize = 10240;

pub struct FrontendHandler {
    engine: Arc<CacheEngine>,
    live_sockets: Arc<LiveSockets>,
}

impl FrontendHandler {
    pub fn new(engine: Arc<CacheEngine>, live_sockets: Arc<LiveSockets>) -> Self {
        FrontendHandler { engine, live_sockets }
    }

    /// Dispatch one parsed request. Returns `(status, body, keep_alive)`.
    fn dispatch(&self, req: &ParsedRequest) -> (Status, String, bool) {
        match req.path.as_str() {
            "set" => {
                let (status, body) = self.handle_set(req);
                (status, body, true)
            }
            "get" => {
                let (status, body) = self.handle_get(req);
                (status, body, true)
            }
            "delete" => {
                let (status, body) = self.handle_delete(req);
                (status, body, true)
            }
            "disconnect" => (Status::Ok, "OK Disconnecting. ".to_string(), false),
            _ => (Status::BadRequest, "Usage: /set, /get, /delete, /disconnect\n".to_string(), true),
        }
    }

    fn handle_set(&self, req: &ParsedRequest) -> (Status, String) {
        let (Some(key), Some(value)) = (req.key_param(), req.value_param()) else {
            return (Status::BadRequest, "Error missing 'key' or 'value' parameter for /set.".to_string());
        };
        let body = format!("OK: Key {key} was set (in cache and marked dirty)");
        match self.engine.set(&key, &value) {
            SetOutcome::Ok => (Status::Ok, body),
            // Known quirk preserved from the reference: the SET's own
            // insertion succeeded, but the HTTP status still carries a
            // failed eviction write-back for the unrelated evicted key.
            SetOutcome::EvictionWriteFailed(status) => (status, body),
        }
    }

    fn handle_get(&self, req: &ParsedRequest) -> (Status, String) {
        let Some(key) = req.key_param() else {
            return (Status::BadRequest, "Error missing 'key' parameter for /get.".to_string());
        };
        match self.engine.get(&key) {
            GetOutcome::Value(value) => (Status::Ok, value),
            GetOutcome::NotFound => (Status::NotFound, format!("Error: Key : {key} Not Found.")),
            GetOutcome::Transport(status) => (status, format!("Error: Key : {key} Not Found.")),
        }
    }

    fn handle_delete(&self, req: &ParsedRequest) -> (Status, String) {
        let Some(key) = req.key_param() else {
            return (Status::BadRequest, "Error missing 'key' parameter for /delete.".to_string());
        };
        match self.engine.delete(&key) {
            DeleteOutcome::Ok => (Status::Ok, format!("Key: {key} deleted (from cache and DB)")),
            DeleteOutcome::NotFound => (
                Status::NotFound,
                "Error: Failed to delete key from Backend DB: Error: Key Not Found in Database.".to_string(),
            ),
            DeleteOutcome::Transport(status) => (
                status,
                format!("Error: Failed to delete key from Backend DB: backend returned {status}"),
            ),
        }
    }
}

impl ConnectionHandler for FrontendHandler {
    fn handle(&self, mut stream: TcpStream) {
        let socket_id = self.live_sockets.insert(&stream);
        let _guard = DeregisterOnDrop {
            registry: &self.live_sockets,
            id: socket_id,
        };

        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let bytes_read = match stream.read(&mut buffer) {
                Ok(n) if n > 0 => n,
                _ => break,
            };

            let raw = String::from_utf8_lossy(&buffer[..bytes_read]).into_owned();
            let (status, body, keep_alive) = match ParsedRequest::parse(&raw) {
                Ok(req) => self.dispatch(&req),
                Err(_) => (Status::BadRequest, "Error: Malformed Request".to_string(), true),
            };

            let response = Response::new(status, body, keep_alive);
            if stream.write_all(&response.to_bytes()).is_err() {
                break;
            }

            if !keep_alive {
                break;
            }
        }
    }
}

struct DeregisterOnDrop<'a> {
    registry: &'a LiveSockets,
    id: u64,
}

impl Drop for DeregisterOnDrop<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kv_cache::{PersistentStore, StoreError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        data: Mutex<HashMap<String, String>>,
    }

    impl PersistentStore for FakeStore {
        fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.data.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }
        fn fetch(&self, key: &str) -> Result<String, StoreError> {
            self.data.lock().unwrap().get(key).cloned().ok_or(StoreError::NotFound)
        }
        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.data.lock().unwrap().remove(key).map(|_| ()).ok_or(StoreError::NotFound)
        }
    }

    fn handler() -> FrontendHandler {
        let engine = Arc::new(CacheEngine::new(3, Arc::new(FakeStore::default())));
        FrontendHandler::new(engine, Arc::new(LiveSockets::new()))
    }

    #[test]
    fn set_then_get_round_trips_through_dispatch() {
        let h = handler();
        let set_req = ParsedRequest::parse("GET /set?key=a&value=1 HTTP/1.1\r\n\r\n").unwrap();
        let (status, body, keep_alive) = h.dispatch(&set_req);
        assert_eq!(status, Status::Ok);
        assert_eq!(body, "OK: Key a was set (in cache and marked dirty)");
        assert!(keep_alive);

        let get_req = ParsedRequest::parse("GET /get?key=a HTTP/1.1\r\n\r\n").unwrap();
        let (status, body, _) = h.dispatch(&get_req);
        assert_eq!(status, Status::Ok);
        assert_eq!(body, "1");
    }

    #[test]
    fn get_miss_reports_404() {
        let h = handler();
        let req = ParsedRequest::parse("GET /get?key=missing HTTP/1.1\r\n\r\n").unwrap();
        let (status, body, _) = h.dispatch(&req);
        assert_eq!(status, Status::NotFound);
        assert_eq!(body, "Error: Key : missing Not Found.");
    }

    #[test]
    fn delete_then_get_reports_404() {
        let h = handler();
        h.dispatch(&ParsedRequest::parse("GET /set?key=k&value=v HTTP/1.1\r\n\r\n").unwrap());
        let (status, body, _) = h.dispatch(&ParsedRequest::parse("GET /delete?key=k HTTP/1.1\r\n\r\n").unwrap());
        assert_eq!(status, Status::Ok);
        assert_eq!(body, "Key: k deleted (from cache and DB)");

        let (status, _, _) = h.dispatch(&ParsedRequest::parse("GET /get?key=k HTTP/1.1\r\n\r\n").unwrap());
        assert_eq!(status, Status::NotFound);
    }

    #[test]
    fn disconnect_sets_close_and_canned_body() {
        let h = handler();
        let (status, body, keep_alive) = h.dispatch(&ParsedRequest::parse("GET /disconnect HTTP/1.1\r\n\r\n").unwrap());
        assert_eq!(status, Status::Ok);
        assert_eq!(body, "OK Disconnecting. ");
        assert!(!keep_alive);
    }

    #[test]
    fn unknown_path_is_400_with_usage_text() {
        let h = handler();
        let (status, body, keep_alive) = h.dispatch(&ParsedRequest::parse("GET /unknown HTTP/1.1\r\n\r\n").unwrap());
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, "Usage: /set, /get, /delete, /disconnect\n");
        assert!(keep_alive);
    }

    #[test]
    fn set_missing_value_is_400() {
        let h = handler();
        let (status, _, _) = h.dispatch(&ParsedRequest::parse("GET /set?key=a HTTP/1.1\r\n\r\n").unwrap());
        assert_eq!(status, Status::BadRequest);
    }

    fn connected_pair() -> (TcpStream, TcpStream) {
        use std::net::TcpListener;
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    /// Two requests on one keep-alive connection, each its own read cycle:
    /// both are honored, in order.
    #[test]
    fn keep_alive_connection_serves_sequential_requests() {
        let h = Arc::new(handler());
        let (mut client, server) = connected_pair();
        let worker = {
            let h = Arc::clone(&h);
            std::thread::spawn(move || h.handle(server))
        };

        client.write_all(b"GET /set?key=a&value=1 HTTP/1.1\r\n\r\n").unwrap();
        let mut buf = [0u8; 4096];
        let n = client.read(&mut buf).unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).starts_with("HTTP/1.1 200 OK\r\n"));

        client.write_all(b"GET /get?key=a HTTP/1.1\r\n\r\n").unwrap();
        let n = client.read(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf[..n]).into_owned();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with('1'));

        drop(client);
        worker.join().unwrap();
    }

    /// S5: pipelining is not supported. Two requests written in a single
    /// burst may both land in the handler's one `read` call; only the first
    /// "GET /" found in that buffer is parsed and answered. The spec leaves
    /// the second's fate unspecified (next read cycle, or dropped on close)
    /// — only the first response's correctness is a binding assertion.
    #[test]
    fn two_requests_in_one_write_the_first_is_honored() {
        let h = Arc::new(handler());
        let (mut client, server) = connected_pair();
        let worker = {
            let h = Arc::clone(&h);
            std::thread::spawn(move || h.handle(server))
        };

        let burst = b"GET /set?key=a&value=1 HTTP/1.1\r\n\r\nGET /set?key=b&value=2 HTTP/1.1\r\n\r\n";
        client.write_all(burst).unwrap();

        let mut buf = [0u8; 4096];
        let n = client.read(&mut buf).unwrap();
        let first = String::from_utf8_lossy(&buf[..n]).into_owned();
        assert!(first.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(first.contains("Key a was set"));

        drop(client);
        worker.join().unwrap();
    }
}
