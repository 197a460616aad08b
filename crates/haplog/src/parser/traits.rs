pub use super::model::{Decoded, DecodeError, LogRecord};

pub trait LogParser: Send + Sync {
    /// decode one raw log line; field-level failures come back inside `Decoded`
    fn parse(&self, raw: &[u8]) -> Result<Decoded, DecodeError>;
    fn name(&self) -> &'static str;
}
