/// Access log decoding module
/// 
/// This module turns one syslog-wrapped HAProxy HTTP log line into a typed
/// [`LogRecord`].
/// 
/// # Architecture
/// 
/// - `grammar.rs`: Named-capture grammar matched against the raw line
/// - `fields.rs`: Per-field converters with explicit integer widths
/// - `request_line.rs`: `<BADREQ>` / complete / truncated request lines
/// - `timestamp.rs`: Accept-date decoding in a configured timezone
/// - `formats/`: Record assembly (`haproxy`) and the syslog header
/// - `metrics.rs`: Decoding counters
/// 
/// # Guarantees
/// 
/// - No I/O, no logging, no shared mutable state
/// - Line size limit and UTF-8 check on the byte-level entry point
/// - Field-level failures keep the best-effort record

pub mod traits;
pub mod codes;
pub mod fields;
pub mod formats;
pub mod grammar;
pub mod metrics;
pub mod model;
pub mod request_line;
pub mod timestamp;

// Re-export commonly used types
pub use traits::LogParser;
pub use model::{Decoded, DecodeError, LogRecord};
pub use formats::haproxy::{DecoderConfig, HaproxyDecoder};
pub use timestamp::LogTimezone;

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
