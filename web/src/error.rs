use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use sse::error::{Error as SseError, ErrorKind as SseErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Per-request failures of the web layer. None of these affect other connections.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The transport of this request cannot carry an incrementally flushed body
    StreamingUnsupported,
    /// Too many streams are already open
    ConnectionLimit,
}

impl Error {
    pub fn streaming_unsupported() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::StreamingUnsupported,
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

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match &self.source {
            Some(source) => write!(fmt, "{:?}: {source}", self.error_kind),
            None => write!(fmt, "{:?}", self.error_kind),
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.error_kind {
            ErrorKind::StreamingUnsupported => {
                warn!("Rejecting SSE request: streaming unsupported");
                (StatusCode::INTERNAL_SERVER_ERROR, "Streaming unsupported!").into_response()
            }
            ErrorKind::ConnectionLimit => {
                warn!("Rejecting SSE request: {self}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Too many open event streams, try again later",
                )
                    .into_response()
            }
        }
    }
}

// This is where we translate errors from the `sse` layer to the `web` layer.
impl From<SseError> for Error {
    fn from(err: SseError) -> Self {
        let error_kind = match err.error_kind {
            SseErrorKind::ConnectionLimitReached { .. } => ErrorKind::ConnectionLimit,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
