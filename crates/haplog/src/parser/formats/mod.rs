/// Log line formats

pub mod haproxy;
pub mod syslog;

pub use haproxy::{DecoderConfig, HaproxyDecoder};
pub use syslog::SyslogHeader;
