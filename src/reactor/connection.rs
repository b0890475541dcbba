//! Per-accepted-socket connection handle.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::message::{ConnId, Peer};
use crate::error::{ReactorError, Result};

/// Handle for one accepted connection. Exactly one live handle exists per
/// transport handle at any time.
///
/// The write side of the socket is owned by a dedicated writer task; frames
/// enqueued here are written in enqueue order, which is what serializes
/// overlapping sends to the same peer. Closing is cancellation-based and
/// idempotent: the first `close` stops both the reader and writer tasks,
/// which then run the disconnect protocol.
pub struct Connection {
    id: ConnId,
    peer: Peer,
    frames: mpsc::UnboundedSender<Bytes>,
    cancel: CancellationToken,
}

impl Connection {
    pub(crate) fn new(id: ConnId, peer: Peer, frames: mpsc::UnboundedSender<Bytes>) -> Self {
        Self {
            id,
            peer,
            frames,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    /// The logical peer on the other end of this connection.
    pub fn peer(&self) -> Peer {
        self.peer
    }

    /// Queue one already-encoded wire frame for the writer task; frames are
    /// written in queue order. Fails once the connection is closed or the
    /// writer has gone away.
    ///
    /// Peer-addressed sends that should pass through the codec's encode
    /// stage go through the reactor's send entry point instead.
    pub fn send_frame(&self, frame: Bytes) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ReactorError::ConnectionClosed);
        }
        self.frames
            .send(frame)
            .map_err(|_| ReactorError::ConnectionClosed)
    }

    /// Request teardown of this connection. Safe to call repeatedly; the
    /// reactor's cleanup protocol fires the disconnect hook at most once.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> (Connection, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peer = Peer::new("127.0.0.1:9000".parse().unwrap());
        (Connection::new(ConnId::next(), peer, tx), rx)
    }

    #[test]
    fn send_frame_preserves_order() {
        let (conn, mut rx) = connection();
        conn.send_frame(Bytes::from_static(b"a")).unwrap();
        conn.send_frame(Bytes::from_static(b"b")).unwrap();
        conn.send_frame(Bytes::from_static(b"c")).unwrap();

        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"a"));
        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"b"));
        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"c"));
    }

    #[test]
    fn send_frame_after_close_fails() {
        let (conn, _rx) = connection();
        assert!(!conn.is_closed());

        conn.close();
        conn.close(); // repeat close is harmless

        assert!(conn.is_closed());
        assert!(matches!(
            conn.send_frame(Bytes::from_static(b"late")),
            Err(ReactorError::ConnectionClosed)
        ));
    }
}
