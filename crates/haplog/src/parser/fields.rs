//! Per-field converters applied to grammar captures.
//!
//! Every converter runs even after an earlier one failed so the record is
//! filled as far as possible; only the first failure is kept.

use std::num::ParseIntError;
use std::str::FromStr;

use super::grammar::{Capture, LineCaptures};
use super::model::DecodeError;
use super::timestamp::{decode_timestamp, LogTimezone};

/// Marker the proxy appends to the frontend name for TLS connections.
pub const SSL_MARKER: &str = "~";

pub struct FieldDecoder<'c, 'h> {
    caps: &'c LineCaptures<'h>,
    first_error: Option<DecodeError>,
}

impl<'c, 'h> FieldDecoder<'c, 'h> {
    pub fn new(caps: &'c LineCaptures<'h>) -> Self {
        Self { caps, first_error: None }
    }

    /// Base-10 integer bounded by the width of `T`. Out-of-range values are
    /// an error, never truncated.
    pub fn int<T>(&mut self, capture: Capture) -> T
    where
        T: FromStr<Err = ParseIntError> + Default,
    {
        let raw = self.caps.get(capture);
        match raw.parse::<T>() {
            Ok(value) => value,
            Err(source) => {
                self.fail(DecodeError::FieldParse {
                    field: capture.name(),
                    value: raw.to_string(),
                    source,
                });
                T::default()
            }
        }
    }

    pub fn timestamp(&mut self, tz: &LogTimezone) -> i64 {
        match decode_timestamp(self.caps.get(Capture::AcceptDate), tz) {
            Ok(ts) => ts,
            Err(err) => {
                self.fail(err);
                0
            }
        }
    }

    pub fn text(&self, capture: Capture) -> String {
        self.caps.get(capture).to_string()
    }

    pub fn ssl(&self) -> bool {
        self.caps.get(Capture::SslMarker) == SSL_MARKER
    }

    /// Single-character state code, copied verbatim.
    pub fn state_code(&self, capture: Capture) -> char {
        self.caps.get(capture).chars().next().unwrap_or('-')
    }

    /// `-` means nothing was captured.
    pub fn cookie(&self, capture: Capture) -> Option<String> {
        match self.caps.get(capture) {
            "-" | "" => None,
            value => Some(value.to_string()),
        }
    }

    /// Split the ` {req|...} {resp|...}` block into request and response
    /// header values. A lone block is taken as request headers.
    pub fn captured_headers(&self) -> (Vec<String>, Vec<String>) {
        let block = self.caps.get(Capture::CapturedHeaders).trim();
        let inner = match block.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            Some(inner) => inner,
            None => return (Vec::new(), Vec::new()),
        };

        let mut groups = inner.splitn(2, "} {").map(split_headers);
        let request = groups.next().unwrap_or_default();
        let response = groups.next().unwrap_or_default();
        (request, response)
    }

    /// First error in field order, if any converter failed.
    pub fn finish(self) -> Option<DecodeError> {
        self.first_error
    }

    fn fail(&mut self, err: DecodeError) {
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }
}

fn split_headers(group: &str) -> Vec<String> {
    group.split('|').map(str::to_string).collect()
}
