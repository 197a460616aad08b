use serde::{Deserialize, Serialize};

use crate::parser::fields::FieldDecoder;
use crate::parser::formats::syslog;
use crate::parser::grammar::{match_line, Capture};
use crate::parser::request_line::{classify, RequestLineKind};
use crate::parser::timestamp::LogTimezone;
use crate::parser::traits::{Decoded, DecodeError, LogParser, LogRecord};
use crate::parser::MAX_LINE_SIZE;

/// Settings bound into a decoder once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Zone the proxy writes accept dates in
    pub timezone: LogTimezone,
    /// Longest raw line accepted by [`LogParser::parse`]
    pub max_line_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            timezone: LogTimezone::Local,
            max_line_size: MAX_LINE_SIZE,
        }
    }
}

/// Decoder for HAProxy `option httplog` lines sent through syslog.
///
/// Holds no mutable state; share it behind an `Arc` to decode from many
/// workers at once.
#[derive(Debug, Clone, Default)]
pub struct HaproxyDecoder {
    config: DecoderConfig,
}

impl HaproxyDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn with_timezone(timezone: LogTimezone) -> Self {
        Self::new(DecoderConfig {
            timezone,
            ..DecoderConfig::default()
        })
    }

    /// Decode a line, failing on the first problem of any kind.
    pub fn decode(&self, line: &str) -> Result<LogRecord, DecodeError> {
        self.decode_partial(line)?.into_result()
    }

    /// Decode a line, keeping the best-effort record when only individual
    /// fields failed.
    ///
    /// Grammar mismatches and inconsistent request lines are returned as
    /// `Err` with no record. Field-level failures are reported through
    /// [`Decoded::error`] (the first one in field order) next to a record
    /// holding every field that could be decoded.
    pub fn decode_partial(&self, line: &str) -> Result<Decoded, DecodeError> {
        let caps = match_line(line)?;
        let mut fields = FieldDecoder::new(&caps);

        // Field order decides which error is reported.
        let pid = fields.int(Capture::Pid);
        let client_port = fields.int(Capture::ClientPort);
        let ts = fields.timestamp(&self.config.timezone);
        let request_header_duration_ms = fields.int(Capture::RequestHeaderTime);
        let queue_duration_ms = fields.int(Capture::QueueTime);
        let server_conn_duration_ms = fields.int(Capture::ConnectTime);
        let response_header_duration_ms = fields.int(Capture::ResponseHeaderTime);
        let total_duration_ms = fields.int(Capture::TotalTime);
        let status_code = fields.int(Capture::StatusCode);
        let bytes_read = fields.int(Capture::BytesRead);
        let total_conn = fields.int(Capture::TotalConn);
        let frontend_conn = fields.int(Capture::FrontendConn);
        let backend_conn = fields.int(Capture::BackendConn);
        let server_conn = fields.int(Capture::ServerConn);
        let retries = fields.int(Capture::Retries);
        let server_queue = fields.int(Capture::ServerQueue);
        let backend_queue = fields.int(Capture::BackendQueue);

        let request = classify(caps.get(Capture::Request))?;
        let (captured_request_headers, captured_response_headers) = fields.captured_headers();

        let record = LogRecord {
            ts,
            pid,
            process_name: fields.text(Capture::Process),
            client_ip: fields.text(Capture::ClientIp),
            client_port,
            client_ssl: fields.ssl(),
            frontend_name: fields.text(Capture::Frontend),
            backend_name: fields.text(Capture::Backend),
            server_name: fields.text(Capture::Server),
            status_code,
            bytes_read,
            captured_request_cookie: fields.cookie(Capture::RequestCookie),
            captured_response_cookie: fields.cookie(Capture::ResponseCookie),
            captured_request_headers,
            captured_response_headers,
            request_header_duration_ms,
            queue_duration_ms,
            server_conn_duration_ms,
            response_header_duration_ms,
            total_duration_ms,
            request_method: request.method,
            request_path: request.path,
            http_version: request.version,
            termination_reason: fields.state_code(Capture::TerminationState),
            session_close_state: fields.state_code(Capture::CloseState),
            client_persistence_state: fields.state_code(Capture::PersistenceState),
            persistence_cookie_state: fields.state_code(Capture::CookieState),
            total_conn,
            frontend_conn,
            backend_conn,
            server_conn,
            retries,
            server_queue,
            backend_queue,
            bad_req: request.kind == RequestLineKind::BadRequest,
            truncated: request.kind == RequestLineKind::Truncated,
            syslog: syslog::parse_header(caps.get(Capture::Prefix)),
        };

        Ok(Decoded {
            record,
            error: fields.finish(),
        })
    }
}

impl LogParser for HaproxyDecoder {
    fn parse(&self, raw: &[u8]) -> Result<Decoded, DecodeError> {
        if raw.len() > self.config.max_line_size {
            return Err(DecodeError::LineTooLarge(raw.len(), self.config.max_line_size));
        }
        let text = std::str::from_utf8(raw).map_err(|_| DecodeError::NonUtf8)?;
        self.decode_partial(text)
    }

    fn name(&self) -> &'static str {
        "haproxy_http"
    }
}
