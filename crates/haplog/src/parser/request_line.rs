//! Request line classification for the quoted `"METHOD PATH VERSION"` field.

use std::sync::LazyLock;

use regex::Regex;

use super::model::DecodeError;

/// Logged in place of the request line when no request could be parsed.
pub const BADREQ_SENTINEL: &str = r#""<BADREQ>""#;

static REQUEST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\S+) (\S+) (\S+)""#).expect("request line pattern must compile"));

// No closing quote: the proxy cut the line at its log buffer size.
static TRUNCATED_REQUEST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\S+) (\S+)"#).expect("truncated request line pattern must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLineKind {
    Complete,
    /// The `<BADREQ>` sentinel
    BadRequest,
    /// Missing closing quote; the version is a placeholder
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
    pub version: String,
    pub kind: RequestLineKind,
}

impl RequestLine {
    fn new(method: &str, path: &str, version: &str, kind: RequestLineKind) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
            kind,
        }
    }
}

/// Classify the raw quoted request field.
///
/// The sentinel check comes first since the sentinel is itself quoted.
pub fn classify(raw: &str) -> Result<RequestLine, DecodeError> {
    if raw == BADREQ_SENTINEL {
        return Ok(RequestLine::new("ERR", "<BADREQ>", "HTTP/0.0", RequestLineKind::BadRequest));
    }

    if raw.len() > 1 && raw.ends_with('"') {
        let caps = REQUEST_LINE
            .captures(raw)
            .ok_or_else(|| DecodeError::RequestLine(raw.to_string()))?;
        return Ok(RequestLine::new(&caps[1], &caps[2], &caps[3], RequestLineKind::Complete));
    }

    let caps = TRUNCATED_REQUEST_LINE
        .captures(raw)
        .ok_or_else(|| DecodeError::RequestLine(raw.to_string()))?;
    // The version was lost with the closing quote; assume the common one.
    Ok(RequestLine::new(&caps[1], &caps[2], "HTTP/1.1", RequestLineKind::Truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_request_line() {
        let line = classify(r#""POST /query/q/Sql HTTP/1.1""#).unwrap();
        assert_eq!(line.method, "POST");
        assert_eq!(line.path, "/query/q/Sql");
        assert_eq!(line.version, "HTTP/1.1");
        assert_eq!(line.kind, RequestLineKind::Complete);
    }

    #[test]
    fn test_badreq_sentinel() {
        let line = classify(BADREQ_SENTINEL).unwrap();
        assert_eq!(line.method, "ERR");
        assert_eq!(line.path, "<BADREQ>");
        assert_eq!(line.version, "HTTP/0.0");
        assert_eq!(line.kind, RequestLineKind::BadRequest);
    }

    #[test]
    fn test_truncated_request_line() {
        let line = classify(r#""GET /gfx/11/11/11/test/111%C3%83%C6"#).unwrap();
        assert_eq!(line.method, "GET");
        assert_eq!(line.path, "/gfx/11/11/11/test/111%C3%83%C6");
        assert_eq!(line.version, "HTTP/1.1");
        assert_eq!(line.kind, RequestLineKind::Truncated);
    }

    #[test]
    fn test_truncated_inside_version() {
        let line = classify(r#""GET /index.html HTTP/1."#).unwrap();
        assert_eq!(line.path, "/index.html");
        assert_eq!(line.kind, RequestLineKind::Truncated);
    }

    #[test]
    fn test_closed_quote_with_missing_token() {
        let err = classify(r#""POST  HTTP/1.1""#).unwrap_err();
        assert_eq!(err, DecodeError::RequestLine(r#""POST  HTTP/1.1""#.to_string()));

        assert!(classify(r#""GET /""#).is_err());
        assert!(classify(r#""""#).is_err());
    }

    #[test]
    fn test_truncated_without_path() {
        assert!(matches!(classify(r#""GE"#), Err(DecodeError::RequestLine(_))));
        assert!(matches!(classify(r#"""#), Err(DecodeError::RequestLine(_))));
    }
}
