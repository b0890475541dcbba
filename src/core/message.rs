//! Peer identity and the message unit crossing the codec boundary.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

/// Logical identity of a remote endpoint, derived from its network address
/// at accept time. Immutable once created; the stable key the application
/// addresses messages to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Peer(SocketAddr);

impl Peer {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    /// The remote address this identity was derived from.
    pub fn addr(&self) -> SocketAddr {
        self.0
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SocketAddr> for Peer {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr)
    }
}

/// Registry key for an accepted transport handle. Each accepted socket gets
/// exactly one id for its lifetime; ids are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

impl ConnId {
    /// Allocate the next id from the process-wide counter.
    pub(crate) fn next() -> Self {
        Self(NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An immutable byte payload tagged with its originating or destination
/// peer. This is the unit that crosses the codec boundary in both
/// directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkData {
    peer: Peer,
    payload: Bytes,
}

impl NetworkData {
    pub fn new(peer: Peer, payload: impl Into<Bytes>) -> Self {
        Self {
            peer,
            payload: payload.into(),
        }
    }

    pub fn peer(&self) -> Peer {
        self.peer
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Consume the unit and take the payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conn_ids_are_unique() {
        let a = ConnId::next();
        let b = ConnId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn network_data_accessors() {
        let peer = Peer::new("10.0.0.1:4000".parse().unwrap());
        let data = NetworkData::new(peer, &b"PING"[..]);
        assert_eq!(data.peer(), peer);
        assert_eq!(data.len(), 4);
        assert!(!data.is_empty());
        assert_eq!(data.into_payload(), Bytes::from_static(b"PING"));
    }
}
