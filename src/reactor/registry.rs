//! # Peer Registry
//!
//! Bidirectional bookkeeping between accepted transport handles, logical
//! peers, and their connection handles.
//!
//! Both directions live behind a single lock so `insert_pair` and
//! `remove_pair` are atomic: an entry exists in one mapping if and only if
//! it exists in the other, and a concurrent in-flight callback either sees
//! both entries or neither. `remove_pair` returning `None` is the
//! idempotence gate the disconnect protocol relies on.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::message::{ConnId, Peer};
use crate::error::{ReactorError, Result};
use crate::reactor::connection::Connection;

#[derive(Default)]
struct Maps {
    peers: HashMap<ConnId, Peer>,
    connections: HashMap<Peer, Arc<Connection>>,
}

/// Dual-keyed, concurrency-safe registry: `ConnId -> Peer` and
/// `Peer -> Connection`.
#[derive(Default)]
pub struct PeerRegistry {
    inner: RwLock<Maps>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Maps> {
        // A poisoning panic can only come from a hook; the maps themselves
        // are left consistent, so recover rather than cascade.
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Maps> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert both directions atomically. Fails with `RegistryCorrupted` if
    /// either key is already present; each accepted handle is registered
    /// exactly once, so a collision means the bookkeeping itself is broken.
    pub fn insert_pair(&self, id: ConnId, peer: Peer, conn: Arc<Connection>) -> Result<()> {
        let mut maps = self.write();
        if maps.peers.contains_key(&id) {
            return Err(ReactorError::RegistryCorrupted(format!(
                "connection {id} already registered"
            )));
        }
        if maps.connections.contains_key(&peer) {
            return Err(ReactorError::RegistryCorrupted(format!(
                "peer {peer} already registered"
            )));
        }
        maps.peers.insert(id, peer);
        maps.connections.insert(peer, conn);
        Ok(())
    }

    /// Remove both directions atomically, keyed by transport handle.
    /// Returns `None` when the entry is already gone (already disconnected).
    pub fn remove_pair(&self, id: ConnId) -> Option<(Peer, Arc<Connection>)> {
        let mut maps = self.write();
        let peer = maps.peers.remove(&id)?;
        let conn = maps.connections.remove(&peer)?;
        Some((peer, conn))
    }

    /// Remove both directions atomically, keyed by peer.
    pub fn remove_pair_by_peer(&self, peer: Peer) -> Option<(Peer, Arc<Connection>)> {
        let mut maps = self.write();
        let conn = maps.connections.remove(&peer)?;
        maps.peers.remove(&conn.id());
        Some((peer, conn))
    }

    /// Resolve the peer an accepted transport handle belongs to.
    pub fn peer_of(&self, id: ConnId) -> Option<Peer> {
        self.read().peers.get(&id).copied()
    }

    /// Resolve a peer's live connection handle.
    pub fn connection(&self, peer: Peer) -> Option<Arc<Connection>> {
        self.read().connections.get(&peer).cloned()
    }

    pub fn contains(&self, peer: Peer) -> bool {
        self.read().connections.contains_key(&peer)
    }

    /// Number of registered peers. Both maps always agree on this.
    pub fn len(&self) -> usize {
        self.read().connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().connections.is_empty()
    }

    /// Remove and return every entry. Used by `dispose`.
    pub fn drain(&self) -> Vec<(Peer, Arc<Connection>)> {
        let mut maps = self.write();
        maps.peers.clear();
        maps.connections.drain().collect()
    }

    /// Both cardinalities, for invariant checks.
    #[cfg(test)]
    fn cardinalities(&self) -> (usize, usize) {
        let maps = self.read();
        (maps.peers.len(), maps.connections.len())
    }
}
