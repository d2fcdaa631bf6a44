//! Response formatting and the inverse: extracting a status and body back
//! out of a raw response buffer, used by the persistent-store client when
//! reading the backend's reply off the shared socket.

use crate::status::Status;

/// An outgoing `HTTP/1.1 <status>` response with a `text/plain` body.
pub struct Response {
    pub status: Status,
    pub body: String,
    pub keep_alive: bool,
}

impl Response {
    pub fn new(status: Status, body: impl Into<String>, keep_alive: bool) -> Self {
        Response {
            status,
            body: body.into(),
            keep_alive,
        }
    }

    /// Render the full response text: status line, headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let connection = if self.keep_alive { "keep-alive" } else { "close" };
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: {}\r\n\r\n",
            self.status,
            self.body.len(),
            connection,
        );
        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(self.body.as_bytes());
        out
    }
}

/// Parse the status text following `HTTP/1.1 ` up to the first `\r\n`.
///
/// Returns `None` if the response is too malformed to locate a status line
/// at all — callers treat this the same as a transport error.
pub fn parse_status_line(raw: &str) -> Option<Status> {
    let marker = "HTTP/1.1 ";
    let start = raw.find(marker)? + marker.len();
    let end = raw[start..].find("\r\n")? + start;
    Status::parse(&raw[start..end])
}

/// Return everything after the first blank line (`\r\n\r\n`), i.e. the body.
///
/// If no blank line is found the response is malformed; a placeholder
/// message is returned rather than panicking, matching the reference
/// implementation's `getResponseBody` fallback text.
pub fn response_body(raw: &str) -> &str {
    match raw.find("\r\n\r\n") {
        Some(pos) => &raw[pos + 4..],
        None => "Error: Malformed Backend Response.",
    }
}
