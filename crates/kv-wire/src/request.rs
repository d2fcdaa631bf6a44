//! Request-line parsing for the single HTTP-shaped request this protocol
//! ever sees: `GET /<path>?<query> HTTP/1.1`, optionally followed by a
//! `Connection:` header. No body is ever consumed, and pipelining (more than
//! one request per read) is not supported — only the first request line
//! found in a read buffer is parsed.

use crate::urlcodec::url_decode;

/// Why a raw read buffer could not be parsed as a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestParseError {
    /// No `GET /` request line was found at all.
    Malformed,
}

/// A parsed `GET /<path>?<query>` request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// The path segment, e.g. `"set"`, `"get"`, `"db_delete"`, `"disconnect"`.
    pub path: String,
    /// The raw (still percent-encoded) query string, or empty if there was none.
    raw_query: String,
}

impl ParsedRequest {
    /// Locate `GET /` in `buf`, then the request-target up to the next space,
    /// splitting on the first `?` into path and query — the same two-step
    /// scan the reference implementation performs.
    pub fn parse(buf: &str) -> Result<ParsedRequest, RequestParseError> {
        let marker = "GET /";
        let start = buf.find(marker).ok_or(RequestParseError::Malformed)?;
        let after_marker = start + marker.len();
        let end = buf[after_marker..]
            .find(' ')
            .map(|offset| after_marker + offset)
            .ok_or(RequestParseError::Malformed)?;

        let path_and_query = &buf[after_marker..end];
        let (path, raw_query) = match path_and_query.find('?') {
            Some(q) => (&path_and_query[..q], &path_and_query[q + 1..]),
            None => (path_and_query, ""),
        };

        Ok(ParsedRequest {
            path: path.to_string(),
            raw_query: raw_query.to_string(),
        })
    }

    /// Extract and URL-decode the value of `key=` from the query string.
    ///
    /// Mirrors the reference's substring scan exactly: the value runs from
    /// just after `"<param>="` to the next `&` (or, for `value=`, to the end
    /// of the query — see [`ParsedRequest::value_param`]).
    pub fn param(&self, name: &str) -> Option<String> {
        let marker = format!("{name}=");
        let pos = self.raw_query.find(&marker)?;
        let value_start = pos + marker.len();
        let rest = &self.raw_query[value_start..];
        let value_end = rest.find('&').unwrap_or(rest.len());
        Some(url_decode(&rest[..value_end]))
    }

    /// Extract `value=...` running to the end of the query string, matching
    /// the reference implementation's `query.substr(valPos)` (it does not
    /// stop at a later `&`, since `value=` always trails `key=` on the wire
    /// and an encoded value never contains a raw `&`).
    pub fn value_param(&self) -> Option<String> {
        let marker = "value=";
        let pos = self.raw_query.find(marker)?;
        let value_start = pos + marker.len();
        Some(url_decode(&self.raw_query[value_start..]))
    }

    pub fn key_param(&self) -> Option<String> {
        self.param("key")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_request() {
        let req = ParsedRequest::parse("GET /set?key=a&value=1 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "set");
        assert_eq!(req.key_param().as_deref(), Some("a"));
        assert_eq!(req.value_param().as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_get_request_no_value() {
        let req = ParsedRequest::parse("GET /get?key=hello%20world HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "get");
        assert_eq!(req.key_param().as_deref(), Some("hello world"));
        assert_eq!(req.value_param(), None);
    }

    #[test]
    fn test_parse_path_without_query() {
        let req = ParsedRequest::parse("GET /disconnect HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "disconnect");
        assert_eq!(req.key_param(), None);
    }

    #[test]
    fn test_parse_missing_get_marker_is_malformed() {
        assert_eq!(
            ParsedRequest::parse("POST /set HTTP/1.1\r\n\r\n"),
            Err(RequestParseError::Malformed)
        );
    }

    #[test]
    fn test_parse_missing_trailing_space_is_malformed() {
        assert_eq!(ParsedRequest::parse("GET /set?key=a"), Err(RequestParseError::Malformed));
    }

    #[test]
    fn test_value_runs_to_end_of_query() {
        // A value containing an already-decoded-looking '&' only happens if
        // the producer mis-encoded; the reference still reads to end-of-query.
        let req = ParsedRequest::parse("GET /set?key=a&value=x%26y HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.value_param().as_deref(), Some("x&y"));
    }
}
