use std::collections::HashMap;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel into a connection's writer task. Sending never blocks and never
/// touches the socket; it only fails once the writer task is gone.
pub type Tx = mpsc::UnboundedSender<Message>;

/// Tracks which transport connections belong to which user identity.
///
/// One identity may own several live connections at once (multiple tabs or
/// devices), so the relation is identity -> set of connection tokens. An
/// identity with no connections left is removed outright: presence is
/// derived by enumerating the keys, and an empty entry would read as a
/// phantom online user.
pub struct ConnectionRegistry {
    peers: DashMap<String, HashMap<Uuid, Tx>>,
    /// Reverse index so unregistering by token never scans the peer map.
    owners: DashMap<Uuid, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry {
            peers: DashMap::new(),
            owners: DashMap::new(),
        }
    }

    /// Adds a connection under an identity. Re-registering the same token
    /// replaces its sender.
    pub fn register(&self, identity: &str, token: Uuid, tx: Tx) {
        self.owners.insert(token, identity.to_string());
        self.peers
            .entry(identity.to_string())
            .or_default()
            .insert(token, tx);
    }

    /// Removes a connection from whichever identity owns it and returns that
    /// identity. Unknown tokens are a no-op (`None`) so duplicate disconnect
    /// events are harmless.
    pub fn unregister(&self, token: Uuid) -> Option<String> {
        let (_, identity) = self.owners.remove(&token)?;
        if let Some(mut connections) = self.peers.get_mut(&identity) {
            connections.remove(&token);
        }
        self.peers.remove_if(&identity, |_, connections| connections.is_empty());
        Some(identity)
    }

    /// Senders for every connection of an identity. Empty when the identity
    /// is offline or unknown.
    pub fn connections_for(&self, identity: &str) -> Vec<Tx> {
        self.peers
            .get(identity)
            .map(|entry| entry.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every identity with at least one live connection.
    pub fn online_identities(&self) -> Vec<String> {
        self.peers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Senders for every registered connection, across all identities.
    pub fn connections(&self) -> Vec<Tx> {
        self.peers
            .iter()
            .flat_map(|entry| entry.values().cloned().collect::<Vec<_>>())
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
