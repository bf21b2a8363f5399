use crate::error::Error;
use dashmap::DashMap;
use log::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn describe_peer(peer: Option<SocketAddr>) -> String {
    peer.map_or_else(|| "unknown peer".to_string(), |addr| addr.to_string())
}

/// Bookkeeping for one open stream
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub peer: Option<SocketAddr>,
    pub opened_at: Instant,
}

/// Registry of currently open SSE streams with an optional cap on how many may
/// be open at once.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Present only when a maximum was configured
    limit: Option<(usize, Arc<Semaphore>)>,
}

impl ConnectionRegistry {
    pub fn new(max_connections: Option<usize>) -> Self {
        Self {
            connections: DashMap::new(),
            limit: max_connections.map(|max| (max, Arc::new(Semaphore::new(max)))),
        }
    }

    /// Register a new connection. The returned handle unregisters itself on drop.
    pub fn register(self: &Arc<Self>, peer: Option<SocketAddr>) -> Result<Connection, Error> {
        let permit = match &self.limit {
            Some((max, semaphore)) => Some(
                Arc::clone(semaphore)
                    .try_acquire_owned()
                    .map_err(|_| Error::connection_limit_reached(*max))?,
            ),
            None => None,
        };

        let id = ConnectionId::new();
        self.connections.insert(
            id.clone(),
            ConnectionInfo {
                peer,
                opened_at: Instant::now(),
            },
        );

        Ok(Connection {
            id,
            registry: Arc::clone(self),
            _permit: permit,
        })
    }

    fn unregister(&self, connection_id: &ConnectionId) {
        if let Some((_, info)) = self.connections.remove(connection_id) {
            debug!(
                "Released SSE connection {} from {} after {:?}",
                connection_id.as_str(),
                describe_peer(info.peer),
                info.opened_at.elapsed()
            );
        }
    }

    /// Number of streams currently open
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn max_connections(&self) -> Option<usize> {
        self.limit.as_ref().map(|(max, _)| *max)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Handle for one client's open response stream.
///
/// Owned by the stream serving that client; dropping it (client went away or
/// the server is shutting down) removes the registry entry and frees the slot
/// under the connection limit.
pub struct Connection {
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Connection {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.registry.unregister(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn register_tracks_connection_until_dropped() {
        let registry = Arc::new(ConnectionRegistry::default());
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();

        let connection = registry.register(Some(peer)).unwrap();
        assert_eq!(registry.len(), 1);
        let other = registry.register(None).unwrap();
        assert_ne!(connection.id(), other.id());
        assert_eq!(registry.len(), 2);

        drop(connection);
        assert_eq!(registry.len(), 1);
        drop(other);
        assert!(registry.is_empty());
    }

    #[test]
    fn peers_are_described_for_logs() {
        let peer: SocketAddr = "10.0.0.7:41000".parse().unwrap();
        assert_eq!(describe_peer(Some(peer)), "10.0.0.7:41000");
        assert_eq!(describe_peer(None), "unknown peer");
    }

    #[test]
    fn unlimited_registry_accepts_many_connections() {
        let registry = Arc::new(ConnectionRegistry::new(None));
        let connections: Vec<_> = (0..64).map(|_| registry.register(None).unwrap()).collect();

        assert_eq!(registry.len(), 64);
        assert_eq!(registry.max_connections(), None);
        drop(connections);
        assert!(registry.is_empty());
    }

    #[test]
    fn register_rejects_connections_over_the_limit() {
        let registry = Arc::new(ConnectionRegistry::new(Some(2)));
        let _first = registry.register(None).unwrap();
        let _second = registry.register(None).unwrap();

        let err = match registry.register(None) {
            Ok(_) => panic!("third connection should have been rejected"),
            Err(err) => err,
        };
        assert_eq!(err.error_kind, ErrorKind::ConnectionLimitReached { limit: 2 });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn dropping_a_connection_frees_a_slot() {
        let registry = Arc::new(ConnectionRegistry::new(Some(1)));
        let first = registry.register(None).unwrap();
        assert!(registry.register(None).is_err());

        drop(first);
        assert!(registry.register(None).is_ok());
    }
}
