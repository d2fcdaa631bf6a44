//! Percent-encoding for query-string keys and values.
//!
//! Matches the reference implementation's `urlEncode`/`urlDecode` behavior
//! exactly, including its edge cases:
//! - `+` decodes to a space (form-encoding convention), but encoding never
//!   produces `+` for a space — it always produces `%20`.
//! - A trailing `%` with fewer than two hex digits remaining is left in the
//!   output verbatim rather than treated as an error.
//! - Non-hex digits after `%` are parsed by the same lenient radix-16 rule
//!   the reference uses (malformed escapes decode to byte `0`).

/// Percent-encode `s`, leaving `[A-Za-z0-9]`, `-`, `_`, `.`, `~` unescaped.
pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        let c = byte as char;
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
            out.push(c);
        } else {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        }
    }
    out
}

/// Percent-decode `s`, turning `+` into a space and `%XX` into its byte.
///
/// A `%` with fewer than two characters remaining is dropped (the reference
/// implementation's bounds check simply skips emitting anything for it,
/// since its index guard `i + 2 < length` is false and execution falls
/// through without the `else` arms of its if-chain).
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("00");
                let byte = u8::from_str_radix(hex, 16).unwrap_or(0);
                out.push(byte);
                i += 3;
            }
            b'%' => {
                // Not enough room for two hex digits — reference drops it silently.
                i += 1;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
