//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the `/sse` endpoint.
//! Connection tracking and the tick stream live in the `sse` crate.

pub mod handler;
