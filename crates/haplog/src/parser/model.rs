use std::net::IpAddr;
use std::num::ParseIntError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::codes::{SessionCloseState, TerminationReason};
use super::formats::syslog::SyslogHeader;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The line does not match the access log grammar at all.
    #[error("Malformed line: input does not match the access log grammar")]
    MalformedLine,

    /// A numeric field is non-numeric or out of range for its width.
    #[error("Invalid {field}: {value:?} ({source})")]
    FieldParse {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A closed-quote request line that is not `METHOD PATH VERSION`.
    #[error("Not enough matches in request line [{0}]")]
    RequestLine(String),

    /// The accept date is not a fixed-width `DD/Mon/YYYY:HH:MM:SS.mmm`.
    #[error("Invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("Non-UTF8 content")]
    NonUtf8,

    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),
}

impl DecodeError {
    /// Field-level errors leave a best-effort record behind; every other
    /// variant rejects the line outright.
    pub fn is_field_error(&self) -> bool {
        matches!(self, DecodeError::FieldParse { .. } | DecodeError::Timestamp { .. })
    }
}

/// One decoded HTTP access log line.
///
/// Serialized field names are stable and consumed by downstream pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Microseconds since the Unix epoch.
    #[serde(rename = "ts_us")]
    pub ts: i64,
    /// Distinguishes connections hitting different proxy processes.
    pub pid: u32,
    pub process_name: String,
    pub client_ip: String,
    pub client_port: u16,
    pub client_ssl: bool,
    pub frontend_name: String,
    pub backend_name: String,
    pub server_name: String,
    pub status_code: i16,
    pub bytes_read: u64,
    pub captured_request_cookie: Option<String>,
    pub captured_response_cookie: Option<String>,
    pub captured_request_headers: Vec<String>,
    pub captured_response_headers: Vec<String>,

    // Timers. An aborted transaction logs -1 for every stage it never reached.
    /// Tq
    pub request_header_duration_ms: i64,
    /// Tw
    pub queue_duration_ms: i64,
    /// Tc
    pub server_conn_duration_ms: i64,
    /// Tr
    pub response_header_duration_ms: i64,
    /// Tt
    pub total_duration_ms: i64,

    #[serde(rename = "http_method")]
    pub request_method: String,
    #[serde(rename = "http_path")]
    pub request_path: String,
    pub http_version: String,

    pub termination_reason: char,
    pub session_close_state: char,
    pub client_persistence_state: char,
    #[serde(rename = "persistence_cookie")]
    pub persistence_cookie_state: char,

    // Connection counters (per process)
    pub total_conn: u32,
    pub frontend_conn: u32,
    pub backend_conn: u32,
    pub server_conn: u32,
    pub retries: u32,
    pub server_queue: u32,
    pub backend_queue: u32,

    #[serde(rename = "bad_request")]
    pub bad_req: bool,
    pub truncated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog: Option<SyslogHeader>,
}

impl LogRecord {
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.ts).unwrap_or_default()
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        TerminationReason::from_code(self.termination_reason)
    }

    pub fn session_close(&self) -> Option<SessionCloseState> {
        SessionCloseState::from_code(self.session_close_state)
    }

    /// Client address as an IP, when the logged text is one.
    pub fn client_addr(&self) -> Option<IpAddr> {
        self.client_ip.parse().ok()
    }

    /// True when at least one timer was not measured because the
    /// transaction ended before reaching that stage.
    pub fn is_aborted(&self) -> bool {
        [
            self.request_header_duration_ms,
            self.queue_duration_ms,
            self.server_conn_duration_ms,
            self.response_header_duration_ms,
            self.total_duration_ms,
        ]
        .iter()
        .any(|t| *t < 0)
    }
}

/// Result of a decode that got past the structural checks.
///
/// `error` holds the first field-level failure in field order; when it is
/// set the record is populated as far as possible but must be treated as
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub record: LogRecord,
    pub error: Option<DecodeError>,
}

impl Decoded {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<LogRecord, DecodeError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_accessor_round_trips_micros() {
        let record = LogRecord {
            ts: 1_437_659_351_933_000,
            ..Default::default()
        };
        let ts = record.timestamp();
        assert_eq!(ts.timestamp(), 1_437_659_351);
        assert_eq!(ts.timestamp_subsec_millis(), 933);
    }

    #[test]
    fn test_is_aborted() {
        let mut record = LogRecord {
            request_header_duration_ms: 12,
            total_duration_ms: 40,
            ..Default::default()
        };
        assert!(!record.is_aborted());
        record.server_conn_duration_ms = -1;
        assert!(record.is_aborted());
    }

    #[test]
    fn test_client_addr() {
        let mut record = LogRecord {
            client_ip: "83.3.255.169".to_string(),
            ..Default::default()
        };
        assert_eq!(record.client_addr(), Some("83.3.255.169".parse().unwrap()));
        record.client_ip = "unix".to_string();
        assert_eq!(record.client_addr(), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let record = LogRecord {
            request_method: "GET".to_string(),
            persistence_cookie_state: 'N',
            bad_req: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["http_method"], "GET");
        assert_eq!(json["persistence_cookie"], "N");
        assert_eq!(json["bad_request"], true);
        assert!(json.get("ts_us").is_some());
        assert!(json.get("syslog").is_none());
    }

    #[test]
    fn test_decoded_into_result() {
        let ok = Decoded { record: LogRecord::default(), error: None };
        assert!(ok.is_valid());
        assert!(ok.into_result().is_ok());

        let failed = Decoded {
            record: LogRecord::default(),
            error: Some(DecodeError::MalformedLine),
        };
        assert_eq!(failed.into_result(), Err(DecodeError::MalformedLine));
    }

    #[test]
    fn test_field_error_classification() {
        let err = "x".parse::<u16>().unwrap_err();
        let field = DecodeError::FieldParse { field: "client_port", value: "x".into(), source: err };
        assert!(field.is_field_error());
        assert!(!DecodeError::MalformedLine.is_field_error());
        assert!(!DecodeError::RequestLine("\"GET\"".into()).is_field_error());
    }
}
