use crate::connection::{describe_peer, Connection, ConnectionRegistry};
use crate::error::Error;
use crate::message::Tick;
use async_stream::stream;
use axum::response::sse::Event;
use futures::Stream;
use log::*;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    tick_interval: Duration,
    shutdown: CancellationToken,
}

impl Manager {
    pub fn new(tick_interval: Duration, max_connections: Option<usize>) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new(max_connections)),
            tick_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a new connection, subject to the connection limit
    pub fn open_connection(&self, peer: Option<SocketAddr>) -> Result<Connection, Error> {
        let connection = self.registry.register(peer)?;
        debug!(
            "Registered SSE connection {} from {}",
            connection.id().as_str(),
            describe_peer(peer)
        );
        Ok(connection)
    }

    /// Builds the event stream for one connection: a tick right away, then one
    /// per interval.
    ///
    /// The stream owns the connection handle. It ends when the server shuts
    /// down, or is dropped by hyper when the client goes away; either way the
    /// interval stops and the connection is released.
    pub fn tick_stream(
        &self,
        connection: Connection,
    ) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
        let period = self.tick_interval;
        let shutdown = self.shutdown.clone();

        stream! {
            let mut ticker = interval(period);
            // A stalled writer must not cause a burst of catch-up events
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let ticked = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => false,
                    _ = ticker.tick() => true,
                };

                if !ticked {
                    debug!("Closing SSE connection {} for shutdown", connection.id().as_str());
                    break;
                }

                yield Ok(Tick::now().into_event());
            }

            drop(connection);
        }
    }

    /// Ends every open tick stream; streams built afterwards end immediately
    pub fn shutdown(&self) {
        info!("Shutting down SSE streams ({} open)", self.registry.len());
        self.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token that is cancelled once `shutdown` has been called
    pub fn shutdown_signal(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn max_connections(&self) -> Option<usize> {
        self.registry.max_connections()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate_then_one_per_interval() {
        let manager = Manager::default();
        let connection = manager.open_connection(None).unwrap();
        let mut stream = Box::pin(manager.tick_stream(connection));

        let start = Instant::now();
        assert!(stream.next().await.is_some());
        assert!(start.elapsed() < Duration::from_millis(1));

        let mut previous = Instant::now();
        for _ in 0..3 {
            assert!(stream.next().await.is_some());
            let now = Instant::now();
            assert!(now - previous >= DEFAULT_TICK_INTERVAL);
            previous = now;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_releases_the_connection() {
        let manager = Manager::default();
        let connection = manager.open_connection(None).unwrap();
        let mut stream = Box::pin(manager.tick_stream(connection));

        stream.next().await;
        assert_eq!(manager.active_connections(), 1);

        drop(stream);
        assert_eq!(manager.active_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_open_streams() {
        let manager = Manager::default();
        let connection = manager.open_connection(None).unwrap();
        let mut stream = Box::pin(manager.tick_stream(connection));

        stream.next().await;
        manager.shutdown();

        assert!(manager.is_shutting_down());
        assert!(stream.next().await.is_none());
        assert_eq!(manager.active_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn streams_tick_independently() {
        let manager = Manager::new(Duration::from_secs(2), None);
        let mut first = Box::pin(manager.tick_stream(manager.open_connection(None).unwrap()));
        first.next().await;

        tokio::time::advance(Duration::from_secs(1)).await;
        let mut second = Box::pin(manager.tick_stream(manager.open_connection(None).unwrap()));
        second.next().await;
        assert_eq!(manager.active_connections(), 2);

        drop(first);
        assert_eq!(manager.active_connections(), 1);

        let before = Instant::now();
        assert!(second.next().await.is_some());
        assert!(Instant::now() - before >= Duration::from_secs(1));
    }

    #[test]
    fn open_connection_respects_limit() {
        let manager = Manager::new(DEFAULT_TICK_INTERVAL, Some(1));
        let _held = manager.open_connection(None).unwrap();

        assert!(manager.open_connection(None).is_err());
        assert_eq!(manager.max_connections(), Some(1));
    }
}
