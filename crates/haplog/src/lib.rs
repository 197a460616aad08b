// Module layout for haplog: HAProxy HTTP access log decoding.

// Core
pub mod parser;

// Process
pub mod conf;
pub mod runtime;

pub use parser::{DecodeError, Decoded, DecoderConfig, HaproxyDecoder, LogParser, LogRecord, LogTimezone};
