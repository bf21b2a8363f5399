//! Error types for the `sse` crate.
//!
//! Follows the layered pattern used across the workspace: a root `Error` struct
//! holding an `error_kind` and an optional `source`. The `web` layer translates
//! these into HTTP responses.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of errors that can occur while opening an SSE connection.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The configured maximum number of open streams has been reached.
    ConnectionLimitReached { limit: usize },
}

impl Error {
    pub fn connection_limit_reached(limit: usize) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::ConnectionLimitReached { limit },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::ConnectionLimitReached { limit } => {
                write!(f, "SSE connection limit of {limit} reached")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
