use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

use super::model::{DecodeError, LogRecord};

/// Error categories for metrics recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricErrorType {
    /// Line did not match the grammar
    Malformed,
    /// Numeric field out of range or non-numeric
    Field,
    /// Closed-quote request line without three tokens
    RequestLine,
    /// Accept date in the wrong format
    Timestamp,
    /// Line exceeded the configured size limit
    TooLarge,
    /// Non-UTF8 content encountered
    NonUtf8,
}

impl From<&DecodeError> for MetricErrorType {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::MalformedLine => MetricErrorType::Malformed,
            DecodeError::FieldParse { .. } => MetricErrorType::Field,
            DecodeError::RequestLine(_) => MetricErrorType::RequestLine,
            DecodeError::Timestamp { .. } => MetricErrorType::Timestamp,
            DecodeError::LineTooLarge(..) => MetricErrorType::TooLarge,
            DecodeError::NonUtf8 => MetricErrorType::NonUtf8,
        }
    }
}

/// A wrapper that forces the wrapped data onto its own cache line(s).
///
/// Keeps counter groups updated from different workers from sharing a
/// 64-byte line.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Outcome counters for lines that decoded
#[derive(Debug, Default)]
pub struct OutcomeMetrics {
    pub decoded: AtomicU64,
    pub bad_requests: AtomicU64,
    pub truncated: AtomicU64,
    pub aborted: AtomicU64,
    pub ssl: AtomicU64,
}

/// Performance totals (aggregate timing and counts)
#[derive(Debug, Default)]
pub struct TotalMetrics {
    pub time_nanos: AtomicU64,
    pub lines: AtomicU64,
}

/// Error counters by type
#[derive(Debug, Default)]
pub struct ErrorMetrics {
    pub malformed: AtomicU64,
    pub field: AtomicU64,
    pub request_line: AtomicU64,
    pub timestamp: AtomicU64,
    pub too_large: AtomicU64,
    pub non_utf8: AtomicU64,
}

/// Metrics for decoding operations.
///
/// Groups are cache-aligned so concurrent decoders do not invalidate each
/// other's counters. All operations use `Ordering::Relaxed`; a snapshot is
/// not transactional across fields.
#[derive(Debug, Default)]
pub struct DecodeMetrics {
    pub outcomes: CacheAligned<OutcomeMetrics>,
    pub totals: CacheAligned<TotalMetrics>,
    pub errors: CacheAligned<ErrorMetrics>,
}

impl DecodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one decode attempt, successful or not.
    #[inline]
    pub fn record_attempt(&self, time_nanos: u64) {
        self.totals.0.lines.fetch_add(1, Ordering::Relaxed);
        self.totals.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    /// Record a fully decoded record
    #[inline]
    pub fn record_decoded(&self, record: &LogRecord) {
        let outcomes = &self.outcomes.0;
        outcomes.decoded.fetch_add(1, Ordering::Relaxed);
        if record.bad_req {
            outcomes.bad_requests.fetch_add(1, Ordering::Relaxed);
        }
        if record.truncated {
            outcomes.truncated.fetch_add(1, Ordering::Relaxed);
        }
        if record.is_aborted() {
            outcomes.aborted.fetch_add(1, Ordering::Relaxed);
        }
        if record.client_ssl {
            outcomes.ssl.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_error(&self, error_type: MetricErrorType) {
        let errors = &self.errors.0;
        match error_type {
            MetricErrorType::Malformed => errors.malformed.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::Field => errors.field.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::RequestLine => errors.request_line.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::Timestamp => errors.timestamp.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::TooLarge => errors.too_large.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::NonUtf8 => errors.non_utf8.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let lines = self.totals.0.lines.load(Ordering::Relaxed);
        let time_ns = self.totals.0.time_nanos.load(Ordering::Relaxed);
        let decoded = self.outcomes.0.decoded.load(Ordering::Relaxed);

        MetricsSnapshot {
            lines,
            decoded,
            bad_requests: self.outcomes.0.bad_requests.load(Ordering::Relaxed),
            truncated: self.outcomes.0.truncated.load(Ordering::Relaxed),
            aborted: self.outcomes.0.aborted.load(Ordering::Relaxed),
            ssl: self.outcomes.0.ssl.load(Ordering::Relaxed),

            avg_decode_time_us: if lines > 0 {
                (time_ns as f64 / lines as f64) / 1000.0
            } else {
                0.0
            },

            malformed: self.errors.0.malformed.load(Ordering::Relaxed),
            field_errors: self.errors.0.field.load(Ordering::Relaxed),
            request_line_errors: self.errors.0.request_line.load(Ordering::Relaxed),
            timestamp_errors: self.errors.0.timestamp.load(Ordering::Relaxed),
            lines_too_large: self.errors.0.too_large.load(Ordering::Relaxed),
            non_utf8_content: self.errors.0.non_utf8.load(Ordering::Relaxed),
            success_rate: if lines > 0 {
                decoded as f64 / lines as f64
            } else {
                1.0
            },
        }
    }
}

/// A read-only snapshot of decoding metrics, serializable for logs.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub lines: u64,
    pub decoded: u64,
    pub bad_requests: u64,
    pub truncated: u64,
    pub aborted: u64,
    pub ssl: u64,
    pub avg_decode_time_us: f64,

    // Errors
    pub malformed: u64,
    pub field_errors: u64,
    pub request_line_errors: u64,
    pub timestamp_errors: u64,
    pub lines_too_large: u64,
    pub non_utf8_content: u64,
    pub success_rate: f64,
}

impl MetricsSnapshot {
    pub fn rejected(&self) -> u64 {
        self.malformed
            + self.field_errors
            + self.request_line_errors
            + self.timestamp_errors
            + self.lines_too_large
            + self.non_utf8_content
    }
}
