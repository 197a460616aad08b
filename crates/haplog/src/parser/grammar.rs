//! Grammar — the positional layout of an HTTP access log line.
//!
//! The layout is described as an ordered list of pieces, literal text or a
//! named capture, and compiled once into a single regex. Decoders look
//! captures up by [`Capture`] rather than by position.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::model::DecodeError;

/// Named slots of the access log grammar, in line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capture {
    /// Syslog header and anything else before the process tag
    Prefix,
    Process,
    Pid,
    ClientIp,
    ClientPort,
    AcceptDate,
    Frontend,
    SslMarker,
    Backend,
    Server,
    RequestHeaderTime,
    QueueTime,
    ConnectTime,
    ResponseHeaderTime,
    TotalTime,
    StatusCode,
    BytesRead,
    RequestCookie,
    ResponseCookie,
    TerminationState,
    CloseState,
    PersistenceState,
    CookieState,
    TotalConn,
    FrontendConn,
    BackendConn,
    ServerConn,
    Retries,
    ServerQueue,
    BackendQueue,
    CapturedHeaders,
    Request,
}

impl Capture {
    /// Group name in the compiled regex; matches the record field it feeds.
    pub const fn name(self) -> &'static str {
        match self {
            Capture::Prefix => "prefix",
            Capture::Process => "process_name",
            Capture::Pid => "pid",
            Capture::ClientIp => "client_ip",
            Capture::ClientPort => "client_port",
            Capture::AcceptDate => "ts",
            Capture::Frontend => "frontend_name",
            Capture::SslMarker => "client_ssl",
            Capture::Backend => "backend_name",
            Capture::Server => "server_name",
            Capture::RequestHeaderTime => "request_header_duration_ms",
            Capture::QueueTime => "queue_duration_ms",
            Capture::ConnectTime => "server_conn_duration_ms",
            Capture::ResponseHeaderTime => "response_header_duration_ms",
            Capture::TotalTime => "total_duration_ms",
            Capture::StatusCode => "status_code",
            Capture::BytesRead => "bytes_read",
            Capture::RequestCookie => "captured_request_cookie",
            Capture::ResponseCookie => "captured_response_cookie",
            Capture::TerminationState => "termination_reason",
            Capture::CloseState => "session_close_state",
            Capture::PersistenceState => "client_persistence_state",
            Capture::CookieState => "persistence_cookie",
            Capture::TotalConn => "total_conn",
            Capture::FrontendConn => "frontend_conn",
            Capture::BackendConn => "backend_conn",
            Capture::ServerConn => "server_conn",
            Capture::Retries => "retries",
            Capture::ServerQueue => "server_queue",
            Capture::BackendQueue => "backend_queue",
            Capture::CapturedHeaders => "captured_headers",
            Capture::Request => "request",
        }
    }
}

enum Piece {
    Text(&'static str),
    Field(Capture, &'static str),
}

use Piece::{Field, Text};

const NUM: &str = r"[\-\d]+";

const GRAMMAR: &[Piece] = &[
    Text("^"),
    Field(Capture::Prefix, r".*?"),
    Field(Capture::Process, r"[^\s\[\]<>]+"),
    Text(r"\["),
    Field(Capture::Pid, r"\d+"),
    Text(r"\]: "),
    Field(Capture::ClientIp, r".+?"),
    Text(":"),
    Field(Capture::ClientPort, r"\d+"),
    Text(r" \["),
    Field(Capture::AcceptDate, r".+?"),
    Text(r"\] "),
    Field(Capture::Frontend, r".+?"),
    Field(Capture::SslMarker, r"|~"),
    Text(" "),
    Field(Capture::Backend, r".+?"),
    Text("/"),
    Field(Capture::Server, r".+?"),
    Text(" "),
    Field(Capture::RequestHeaderTime, NUM),
    Text("/"),
    Field(Capture::QueueTime, NUM),
    Text("/"),
    Field(Capture::ConnectTime, NUM),
    Text("/"),
    Field(Capture::ResponseHeaderTime, NUM),
    Text("/"),
    Field(Capture::TotalTime, NUM),
    Text(" "),
    Field(Capture::StatusCode, NUM),
    Text(" "),
    Field(Capture::BytesRead, NUM),
    Text(" "),
    Field(Capture::RequestCookie, r"\S+"),
    Text(" "),
    Field(Capture::ResponseCookie, r"\S+"),
    Text(" "),
    Field(Capture::TerminationState, r"\S"),
    Field(Capture::CloseState, r"\S"),
    Field(Capture::PersistenceState, r"\S"),
    Field(Capture::CookieState, r"\S"),
    Text(" "),
    Field(Capture::TotalConn, NUM),
    Text("/"),
    Field(Capture::FrontendConn, NUM),
    Text("/"),
    Field(Capture::BackendConn, NUM),
    Text("/"),
    Field(Capture::ServerConn, NUM),
    Text("/"),
    Field(Capture::Retries, NUM),
    Text(" "),
    Field(Capture::ServerQueue, NUM),
    Text("/"),
    Field(Capture::BackendQueue, NUM),
    Field(Capture::CapturedHeaders, r"| \{.*\}"),
    Text(" "),
    // Lazy so trailing whitespace and newlines stay outside the capture.
    Field(Capture::Request, r#"".*?"#),
    Text(r"\s*$"),
];

fn pattern() -> String {
    GRAMMAR
        .iter()
        .map(|piece| match piece {
            Text(text) => (*text).to_string(),
            Field(capture, re) => format!("(?P<{}>{})", capture.name(), re),
        })
        .collect()
}

static LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&pattern()).expect("access log grammar must compile"));

/// Captures of one line that matched the grammar.
pub struct LineCaptures<'h> {
    inner: Captures<'h>,
}

impl<'h> LineCaptures<'h> {
    /// Text of a capture; empty when an optional slot was not present.
    pub fn get(&self, capture: Capture) -> &'h str {
        self.inner
            .name(capture.name())
            .map_or("", |m| m.as_str())
    }
}

/// Match a raw line against the grammar.
pub fn match_line(line: &str) -> Result<LineCaptures<'_>, DecodeError> {
    LINE_REGEX
        .captures(line)
        .map(|inner| LineCaptures { inner })
        .ok_or(DecodeError::MalformedLine)
}
