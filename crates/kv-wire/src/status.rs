//! HTTP status lines used by both the client-facing and internal wire forms.
//!
//! Only the handful of statuses §6 of the specification names are modeled —
//! this is not a general HTTP status registry.

use std::fmt;

/// A status this protocol can emit or parse, paired with its reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    ServiceUnavailable,
    InternalServerError,
}

impl Status {
    /// The exact `"<code> <reason>"` text placed after `HTTP/1.1 ` on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "200 OK",
            Status::BadRequest => "400 Bad Request",
            Status::NotFound => "404 Not Found",
            Status::ServiceUnavailable => "503 Service Unavailable",
            Status::InternalServerError => "500 Internal Server Error",
        }
    }

    /// Parse a status line's leading code+reason text back into a [`Status`].
    ///
    /// Matches on the leading status code only, the same way the reference
    /// implementation's `rfind("200 OK", 0) == 0` prefix check does — any
    /// code not in this protocol's small vocabulary becomes `None`, which
    /// callers treat as a generic transport error.
    pub fn parse(line: &str) -> Option<Status> {
        let code = line.split_whitespace().next()?;
        match code {
            "200" => Some(Status::Ok),
            "400" => Some(Status::BadRequest),
            "404" => Some(Status::NotFound),
            "503" => Some(Status::ServiceUnavailable),
            "500" => Some(Status::InternalServerError),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
