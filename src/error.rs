//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by the server.
///
/// Application-level failures (404, 405, 400) are [`Response`](crate::Response)
/// values, not `Error`s. This type only surfaces infrastructure failures:
/// an unusable listen address, or binding to it.
#[derive(Debug)]
pub enum Error {
    Addr { addr: String, source: AddrParseError },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr { addr, source } => write!(f, "invalid listen address `{addr}`: {source}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Addr { source, .. } => Some(source),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
