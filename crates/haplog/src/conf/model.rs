//! Model — HaplogConfig.

use serde::{Deserialize, Serialize};

use crate::parser::{DecoderConfig, LogTimezone, MAX_LINE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HaplogConfig {
    /// Timezone the proxy writes accept dates in (`local`, `utc`, `+02:00`)
    pub timezone: LogTimezone,
    /// Log files to read; stdin when empty
    pub inputs: Vec<String>,
    pub max_line_size: usize,
    /// Stop at the first rejected line instead of skipping it
    pub fail_fast: bool,
    /// Still emit the best-effort record when only some fields failed
    pub emit_partial: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for HaplogConfig {
    fn default() -> Self {
        Self {
            timezone: LogTimezone::Local,
            inputs: Vec::new(),
            max_line_size: MAX_LINE_SIZE,
            fail_fast: false,
            emit_partial: false,
            pretty: false,
        }
    }
}

impl HaplogConfig {
    /// Settings handed to the decoder at construction
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            timezone: self.timezone,
            max_line_size: self.max_line_size,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_line_size == 0 {
            return Err("max_line_size must be > 0".to_string());
        }
        if let Some(empty) = self.inputs.iter().position(|p| p.trim().is_empty()) {
            return Err(format!("inputs[{}] must not be empty", empty));
        }
        Ok(())
    }
}
