//! Connection-state codes from the `tsc` column of the HTTP log format.
//!
//! The decoder copies these characters verbatim; these enums give callers a
//! typed view of the known values. Unknown characters map to `None`.

/// First character: the event that caused the session to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    ClientAbort,
    ServerAbort,
    /// Denied or reset by the proxy (filter, ACL, tarpit)
    ProxyDeny,
    /// Handled locally (stats page, redirect)
    Local,
    /// A resource ran out (memory, sockets, ports)
    Exhausted,
    InternalError,
    /// The server was going down
    ServerDown,
    /// Killed because an active server came back up
    UpForced,
    /// Killed by an administrator
    AdminKill,
    ClientTimeout,
    ServerTimeout,
    None,
}

impl TerminationReason {
    pub fn from_code(code: char) -> Option<Self> {
        let reason = match code {
            'C' => Self::ClientAbort,
            'S' => Self::ServerAbort,
            'P' => Self::ProxyDeny,
            'L' => Self::Local,
            'R' => Self::Exhausted,
            'I' => Self::InternalError,
            'D' => Self::ServerDown,
            'U' => Self::UpForced,
            'K' => Self::AdminKill,
            'c' => Self::ClientTimeout,
            's' => Self::ServerTimeout,
            '-' => Self::None,
            _ => return None,
        };
        Some(reason)
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::ClientAbort => 'C',
            Self::ServerAbort => 'S',
            Self::ProxyDeny => 'P',
            Self::Local => 'L',
            Self::Exhausted => 'R',
            Self::InternalError => 'I',
            Self::ServerDown => 'D',
            Self::UpForced => 'U',
            Self::AdminKill => 'K',
            Self::ClientTimeout => 'c',
            Self::ServerTimeout => 's',
            Self::None => '-',
        }
    }
}

/// Second character: the session phase at the time it was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCloseState {
    /// Waiting for a complete request from the client
    Request,
    /// Waiting in a queue for a connection slot
    Queue,
    /// Waiting for the connection to the server
    Connection,
    /// Waiting for complete response headers from the server
    Headers,
    /// Transferring data
    Data,
    /// Transferring the last data to the client
    Last,
    /// Tarpitted
    Tarpit,
    None,
}

impl SessionCloseState {
    pub fn from_code(code: char) -> Option<Self> {
        let state = match code {
            'R' => Self::Request,
            'Q' => Self::Queue,
            'C' => Self::Connection,
            'H' => Self::Headers,
            'D' => Self::Data,
            'L' => Self::Last,
            'T' => Self::Tarpit,
            '-' => Self::None,
            _ => return None,
        };
        Some(state)
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Request => 'R',
            Self::Queue => 'Q',
            Self::Connection => 'C',
            Self::Headers => 'H',
            Self::Data => 'D',
            Self::Last => 'L',
            Self::Tarpit => 'T',
            Self::None => '-',
        }
    }
}
