//! Server-Sent Events (SSE) infrastructure for the clock stream.
//!
//! This crate owns everything about an open event stream that is independent
//! of HTTP routing: tracking connections, rendering ticks and driving the
//! per-connection timer.
//!
//! # Architecture
//!
//! - **One stream per connection**: every `GET /sse` request gets its own tick
//!   stream. Streams share no state with each other.
//! - **Cancellable repeating task**: a stream is a tokio interval raced against
//!   a server-wide shutdown token. When the client disconnects hyper drops the
//!   stream, which stops the interval and releases the connection.
//! - **Optional connection cap**: the registry can hold at most
//!   `max_connections` open streams; unset means unbounded.
//! - **Ephemeral events**: ticks are rendered, written and forgotten. There is
//!   no replay and no `Last-Event-ID` handling.
//!
//! # Wire format
//!
//! Each tick is written as a data-only event:
//!
//! ```text
//! data: 2024-05-01 12:00:00.123456789 +02:00
//!
//! ```
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry, the Connection handle and ConnectionId
//! - `manager`: builds tick streams and coordinates shutdown
//! - `message`: the Tick payload and its SSE framing
//! - `error`: errors raised while opening a connection

pub mod connection;
pub mod error;
pub mod manager;
pub mod message;

pub use manager::Manager;
