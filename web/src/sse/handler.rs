use crate::error::{Error, Result};
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderName, Version};
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use log::*;
use service::AppState;
use std::net::SocketAddr;

/// Headers sent once, ahead of the first event.
fn stream_headers() -> [(HeaderName, &'static str); 5] {
    [
        (header::CONTENT_TYPE, "text/event-stream"),
        (header::CACHE_CONTROL, "no-cache"),
        (header::CONNECTION, "keep-alive"),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}

/// An open-ended body can be flushed incrementally over chunked encoding
/// (HTTP/1.1), DATA frames (HTTP/2) or a close-delimited body (HTTP/1.0).
/// HTTP/0.9 has no headers at all, so there is no way to announce the stream;
/// hyper refuses such requests before routing, so this only guards in-process
/// callers.
fn supports_streaming(version: Version) -> bool {
    version >= Version::HTTP_10
}

/// SSE handler that streams the current time to the client until it disconnects.
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    version: Version,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<impl IntoResponse> {
    if !supports_streaming(version) {
        return Err(Error::streaming_unsupported());
    }

    let peer = peer.map(|ConnectInfo(addr)| addr);
    let connection = app_state.sse_manager.open_connection(peer)?;
    debug!(
        "Streaming ticks to SSE connection {} every {:?}",
        connection.id().as_str(),
        app_state.sse_manager.tick_interval()
    );

    let stream = app_state.sse_manager.tick_stream(connection);

    Ok((stream_headers(), Sse::new(stream)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_1_0_and_later_support_streaming() {
        assert!(supports_streaming(Version::HTTP_10));
        assert!(supports_streaming(Version::HTTP_11));
        assert!(supports_streaming(Version::HTTP_2));
    }

    #[test]
    fn http_0_9_does_not_support_streaming() {
        assert!(!supports_streaming(Version::HTTP_09));
    }

    #[test]
    fn stream_headers_are_the_event_stream_set() {
        let headers = stream_headers();
        let names: Vec<_> = headers.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(
            names,
            [
                "content-type",
                "cache-control",
                "connection",
                "access-control-allow-origin",
                "access-control-allow-headers",
            ]
        );
    }
}
