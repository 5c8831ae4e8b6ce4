//! Wire protocol: request classification and response constants
//!
//! The protocol is deliberately minimal. A request is ASCII text whose first
//! line is whitespace-delimited; only the second token (the request target,
//! called the "view") is interpreted. Responses are a fixed HTTP/1.0 status
//! line and content-type header, followed by an optional body.

/// Status line written for every acknowledged request
pub const STATUS_LINE: &[u8] = b"HTTP/1.0 200 OK\r\n";

/// Content-type header plus the blank line separating headers from body
pub const CONTENT_TYPE: &[u8] = b"Content-Type: text/html\r\n\r\n";

/// Delimiter between addresses in a `/get` response body
pub const ADDR_SEPARATOR: &str = ";";

/// Classified request
///
/// Classification never fails: unrecognized or unparsable input maps to
/// `Malformed` or `Unknown`, both of which the handler treats as non-errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Fewer than two whitespace-separated tokens
    Malformed,
    /// The configured "get" view: list currently-known addresses
    Get,
    /// The configured "log" view: record the peer address
    Log,
    /// Any other view; carries the token for logging
    Unknown(String),
}

impl Request {
    /// Classify raw request bytes against the configured view strings.
    ///
    /// Decoding is best-effort: invalid UTF-8 sequences are dropped rather
    /// than treated as fatal, so a stray bad byte next to an otherwise valid
    /// view token does not change how the token classifies.
    pub fn classify(data: &[u8], get_view: &str, log_view: &str) -> Request {
        let text = decode_dropping_invalid(data);
        let mut tokens = text.split_ascii_whitespace();

        let _method = match tokens.next() {
            Some(t) => t,
            None => return Request::Malformed,
        };

        let view = match tokens.next() {
            Some(t) => t,
            None => return Request::Malformed,
        };

        if view == get_view {
            Request::Get
        } else if view == log_view {
            Request::Log
        } else {
            Request::Unknown(view.to_string())
        }
    }
}

/// Decode UTF-8, dropping invalid sequences entirely.
///
/// Walks the input chunk by chunk: each maximal valid prefix is kept and the
/// offending bytes after it are skipped. An incomplete trailing sequence is
/// discarded the same way.
fn decode_dropping_invalid(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    let mut rest = data;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or(""));
                let skip = e.error_len().unwrap_or(after.len());
                rest = &after[skip..];
            }
        }
    }
}
