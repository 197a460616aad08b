use serde::{Deserialize, Serialize};

/// Syslog severity levels (RFC 5424 §6.2.1)
const SYSLOG_SEVERITIES: [&str; 8] = [
    "emergency", "alert", "critical", "error",
    "warning", "notice", "info", "debug",
];

/// Syslog facility names (RFC 5424 §6.2.1)
const SYSLOG_FACILITIES: [&str; 24] = [
    "kern", "user", "mail", "daemon", "auth", "syslog", "lpr", "news",
    "uucp", "cron", "authpriv", "ftp", "ntp", "audit", "alert2", "clock",
    "local0", "local1", "local2", "local3", "local4", "local5", "local6", "local7",
];

/// RFC 3164 header carried in front of the access log body.
///
/// The proxy sends `<PRI>Mmm dd hh:mm:ss [hostname ]tag[pid]: `; the
/// hostname is usually left out when logging over UDP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyslogHeader {
    pub priority: u8,
    pub facility: String,
    pub severity: String,
    /// Sender's `Mmm dd hh:mm:ss` stamp, kept as text (it has no year).
    pub timestamp: Option<String>,
    pub hostname: Option<String>,
}

/// Best-effort parse of the text preceding the process tag.
///
/// Returns `None` when the prefix does not start with a valid `<PRI>`.
pub fn parse_header(prefix: &str) -> Option<SyslogHeader> {
    let rest = prefix.strip_prefix('<')?;
    let pri_end = rest.find('>')?;
    let priority: u8 = rest[..pri_end].parse().ok()?;

    let facility = SYSLOG_FACILITIES.get(usize::from(priority >> 3))?;
    let severity = SYSLOG_SEVERITIES[usize::from(priority & 0x07)];

    let remainder = &rest[pri_end + 1..];
    let (timestamp, after_ts) = split_rfc3164_timestamp(remainder);

    let hostname = after_ts
        .split_whitespace()
        .next()
        .map(|s| s.to_string());

    Some(SyslogHeader {
        priority,
        facility: facility.to_string(),
        severity: severity.to_string(),
        timestamp,
        hostname,
    })
}

/// Split off a leading `Mmm dd hh:mm:ss` (always 15 chars, day space-padded).
fn split_rfc3164_timestamp(text: &str) -> (Option<String>, &str) {
    let bytes = text.as_bytes();
    let looks_like_ts = bytes.len() >= 15
        && bytes[..3].iter().all(u8::is_ascii_alphabetic)
        && bytes[3] == b' '
        && bytes[6] == b' '
        && bytes[9] == b':'
        && bytes[12] == b':'
        && text.is_char_boundary(15);

    if looks_like_ts {
        (Some(text[..15].to_string()), &text[15..])
    } else {
        (None, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_without_hostname() {
        let header = parse_header("<158>Jul 23 13:49:13 ").unwrap();
        // pri=158 => facility=19 (local3), severity=6 (info)
        assert_eq!(header.priority, 158);
        assert_eq!(header.facility, "local3");
        assert_eq!(header.severity, "info");
        assert_eq!(header.timestamp.as_deref(), Some("Jul 23 13:49:13"));
        assert_eq!(header.hostname, None);
    }

    #[test]
    fn test_parse_header_with_hostname() {
        let header = parse_header("<134>Jul  3 09:01:02 lb01 ").unwrap();
        assert_eq!(header.facility, "local0");
        assert_eq!(header.timestamp.as_deref(), Some("Jul  3 09:01:02"));
        assert_eq!(header.hostname.as_deref(), Some("lb01"));
    }

    #[test]
    fn test_parse_header_without_timestamp() {
        let header = parse_header("<13>host ").unwrap();
        assert_eq!(header.facility, "user");
        assert_eq!(header.severity, "notice");
        assert_eq!(header.timestamp, None);
        assert_eq!(header.hostname.as_deref(), Some("host"));
    }

    #[test]
    fn test_parse_header_invalid() {
        assert!(parse_header("").is_none());
        assert!(parse_header("Jul 23 13:49:13 ").is_none());
        assert!(parse_header("<abc>Jul 23 13:49:13 ").is_none());
        // facility 24 does not exist
        assert!(parse_header("<192>Jul 23 13:49:13 ").is_none());
    }
}
