//! Per-connection handler for the backend: parses `db_set`/`db_get`/
//! `db_delete` requests off the shared wire form and dispatches to the
//! durable store.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use kv_server::ConnectionHandler;
use kv_store::KvStore;
use kv_wire::{ParsedRequest, Response, Status};

const READ_BUFFER_SIZE: usize = 10240;

pub struct BackendHandler {
    store: Arc<dyn KvStore>,
}

impl BackendHandler {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        BackendHandler { store }
    }

    fn dispatch(&self, req: &ParsedRequest) -> (Status, String) {
        match req.path.as_str() {
            "db_set" => {
                let (Some(key), Some(value)) = (req.key_param(), req.value_param()) else {
                    return (Status::BadRequest, "Error missing 'key' or 'value' parameter for /db_set.".to_string());
                };
                match self.store.upsert(&key, &value) {
                    Ok(()) => (Status::Ok, "OK".to_string()),
                    Err(e) => (Status::InternalServerError, format!("ERROR: Database write failed: {e}")),
                }
            }
            "db_get" => {
                let Some(key) = req.key_param() else {
                    return (Status::BadRequest, "Error missing 'key' parameter for /db_get.".to_string());
                };
                match self.store.lookup(&key) {
                    Ok(Some(value)) => (Status::Ok, value),
                    Ok(None) => (Status::NotFound, "Error: Key Not Found.".to_string()),
                    Err(e) => (Status::InternalServerError, format!("ERROR: Database read failed: {e}")),
                }
            }
            "db_delete" => {
                let Some(key) = req.key_param() else {
                    return (Status::BadRequest, "Error missing 'key' parameter for /db_delete.".to_string());
                };
                match self.store.delete(&key) {
                    Ok(true) => (Status::Ok, "OK".to_string()),
                    Ok(false) => (Status::NotFound, "Error: Key Not Found.".to_string()),
                    Err(e) => (Status::InternalServerError, format!("ERROR: Database delete failed: {e}")),
                }
            }
            _ => (Status::NotFound, "Internal API: /db_set, /db_get, /db_delete\n".to_string()),
        }
    }
}

impl ConnectionHandler for BackendHandler {
    fn handle(&self, mut stream: TcpStream) {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let bytes_read = match stream.read(&mut buffer) {
                Ok(n) if n > 0 => n,
                _ => break,
            };

            let raw = String::from_utf8_lossy(&buffer[..bytes_read]).into_owned();
            let keep_alive = !raw.contains("Connection: close");

            let (status, body) = match ParsedRequest::parse(&raw) {
                Ok(req) => self.dispatch(&req),
                Err(_) => (Status::BadRequest, "Error: Malformed Request".to_string()),
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
