//! # TCP Reactor
//!
//! The component owning the listening handle and driving accept, receive,
//! and send completions.
//!
//! ## Responsibilities
//! - Bind and listen on the configured address, accepting continuously
//!   while active
//! - Track each accepted socket as a logical [`Peer`] with exactly one
//!   [`Connection`] handle
//! - Pump inbound bytes through the codec's decode stage to the receive
//!   hook, preserving per-peer order
//! - Pump outbound messages through the encode stage onto the wire, in
//!   send order
//! - Tear connections down through a single idempotent cleanup path
//!
//! ## Concurrency
//! Completions for different peers run truly in parallel; completions for
//! the same peer are serialized up to payload capture by its own read loop,
//! which re-arms as soon as the payload has been copied out of the staging
//! buffer. Decode dispatch runs on a per-connection dispatch task fed by an
//! ordered queue, so a slow receive hook never stalls the socket. Every
//! loop captures its own transport half and context; nothing ambient is
//! shared between connections except the registry, which is
//! concurrency-safe.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use bytes::Bytes;
use socket2::SockRef;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ReactorConfig;
use crate::core::codec::Codec;
use crate::core::message::{ConnId, NetworkData, Peer};
use crate::error::{is_reset, ReactorError, Result};
use crate::reactor::connection::Connection;
use crate::reactor::events::Hooks;
use crate::reactor::registry::PeerRegistry;

/// Listen backlog when the configuration leaves it unset.
const DEFAULT_BACKLOG: u32 = 1024;

/// Per-connection receive staging buffer size when `receive_buffer_size` is
/// unset.
const DEFAULT_STAGING_BUFFER: usize = 64 * 1024;

/// SO_LINGER duration applied when the `linger` option is enabled.
const LINGER_ON_CLOSE: Duration = Duration::from_secs(10);

/// Reactor lifecycle states. Operations are defined only for their legal
/// source states; see [`TcpReactor::start`], [`TcpReactor::stop`], and
/// [`TcpReactor::dispose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not yet listening.
    Inactive,
    /// Listening and accepting.
    Active,
    /// No longer accepting; existing connections keep running.
    Stopped,
    /// Listening handle released; terminal.
    Disposed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Inactive => "inactive",
            LifecycleState::Active => "active",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Disposed => "disposed",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Inner {
    config: ReactorConfig,
    codec: Arc<dyn Codec>,
    hooks: Hooks,
    registry: PeerRegistry,
    state: Mutex<LifecycleState>,
    accept_cancel: CancellationToken,
    local_addr: RwLock<Option<SocketAddr>>,
}

/// Single-process TCP connection multiplexer.
///
/// Cheap to clone; all clones drive the same reactor.
#[derive(Clone)]
pub struct TcpReactor {
    inner: Arc<Inner>,
}

impl TcpReactor {
    pub fn new(config: ReactorConfig, codec: Arc<dyn Codec>, hooks: Hooks) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                codec,
                hooks,
                registry: PeerRegistry::new(),
                state: Mutex::new(LifecycleState::Inactive),
                accept_cancel: CancellationToken::new(),
                local_addr: RwLock::new(None),
            }),
        }
    }

    /// Begin listening and accepting. Legal only from `Inactive`.
    ///
    /// Binds the configured address, applies listener-level socket options,
    /// and spawns the accept loop. Returns once the listener is live; the
    /// bound address is then available from [`local_addr`](Self::local_addr).
    pub async fn start(&self) -> Result<()> {
        let inner = &self.inner;
        let addr: SocketAddr = inner.config.listener.address.parse().map_err(|e| {
            ReactorError::Config(format!(
                "invalid listen address '{}': {e}",
                inner.config.listener.address
            ))
        })?;

        let mut state = inner.lock_state();
        if *state != LifecycleState::Inactive {
            return Err(ReactorError::InvalidState {
                operation: "start",
                state: state.as_str(),
            });
        }

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        if let Some(reuse) = inner.config.listener.reuse_address {
            socket.set_reuseaddr(reuse)?;
        }
        if let Some(size) = inner.config.socket.receive_buffer_size {
            socket.set_recv_buffer_size(size)?;
        }
        if let Some(size) = inner.config.socket.send_buffer_size {
            socket.set_send_buffer_size(size)?;
        }
        socket.bind(addr)?;

        let backlog = inner.config.listener.backlog.unwrap_or(DEFAULT_BACKLOG);
        let listener = socket.listen(backlog)?;
        let local = listener.local_addr()?;

        *inner
            .local_addr
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(local);
        *state = LifecycleState::Active;
        drop(state);

        info!(addr = %local, backlog, "reactor listening");
        tokio::spawn(accept_loop(inner.clone(), listener));
        Ok(())
    }

    /// Stop accepting new connections. Legal only from `Active`; existing
    /// connections keep running until they disconnect or the reactor is
    /// disposed.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.inner.lock_state();
        if *state != LifecycleState::Active {
            return Err(ReactorError::InvalidState {
                operation: "stop",
                state: state.as_str(),
            });
        }
        *state = LifecycleState::Stopped;
        drop(state);

        self.inner.accept_cancel.cancel();
        info!("reactor stopped accepting");
        Ok(())
    }

    /// Stop accepting, close every live connection, and release the
    /// listening handle. Idempotent; legal from any state.
    pub fn dispose(&self) {
        {
            let mut state = self.inner.lock_state();
            if *state == LifecycleState::Disposed {
                return;
            }
            *state = LifecycleState::Disposed;
        }
        self.inner.accept_cancel.cancel();

        for (peer, conn) in self.inner.registry.drain() {
            conn.close();
            self.inner.codec.evict(peer);
            self.inner.hooks.notify_disconnected(peer, None);
        }
        info!("reactor disposed");
    }

    /// Queue an outbound message for `peer`.
    ///
    /// Fails synchronously with [`ReactorError::PeerNotFound`] when the peer
    /// has no registry entry (typically: it already disconnected) and with a
    /// codec error when encoding fails. Write failures surface
    /// asynchronously through the error or disconnect hooks.
    pub fn send(&self, peer: Peer, payload: &[u8]) -> Result<()> {
        let conn = self
            .inner
            .registry
            .connection(peer)
            .ok_or(ReactorError::PeerNotFound(peer))?;

        let frames = self.inner.codec.encode(payload)?;
        debug!(%peer, frames = frames.len(), "queueing outbound frames");
        for frame in frames {
            conn.send_frame(frame)?;
        }
        Ok(())
    }

    /// Explicitly close `peer`'s connection. No-op for an unknown peer; the
    /// disconnect hook fires without an error.
    pub fn disconnect(&self, peer: Peer) {
        self.inner.disconnect_by_peer(peer, None);
    }

    /// Install (or replace) the receive hook at runtime. Until a hook is
    /// present, decoded messages are discarded.
    pub fn set_receive_hook<F>(&self, hook: F)
    where
        F: Fn(NetworkData, &Arc<Connection>) + Send + Sync + 'static,
    {
        self.inner.hooks.set_receive(Some(Box::new(hook)));
    }

    /// Remove the receive hook; subsequent decoded messages are discarded.
    pub fn clear_receive_hook(&self) {
        self.inner.hooks.set_receive(None);
    }

    /// Resolve a peer's live connection handle, if it is still registered.
    pub fn connection(&self, peer: Peer) -> Option<Arc<Connection>> {
        self.inner.registry.connection(peer)
    }

    /// Number of currently connected peers.
    pub fn peer_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn state(&self) -> LifecycleState {
        *self.inner.lock_state()
    }

    /// The bound listening address, once `start` has succeeded. Useful when
    /// binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self
            .inner
            .local_addr
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, LifecycleState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn staging_buffer_size(&self) -> usize {
        self.config
            .socket
            .receive_buffer_size
            .map(|size| size as usize)
            .unwrap_or(DEFAULT_STAGING_BUFFER)
            .max(1)
    }

    fn mark_stopped(&self) {
        let mut state = self.lock_state();
        if *state == LifecycleState::Active {
            *state = LifecycleState::Stopped;
        }
    }

    fn apply_stream_options(&self, stream: &TcpStream) -> Result<()> {
        let opts = &self.config.socket;
        if let Some(nodelay) = opts.tcp_nodelay {
            stream.set_nodelay(nodelay)?;
        }
        if let Some(keep_alive) = opts.keep_alive {
            SockRef::from(stream).set_keepalive(keep_alive)?;
        }
        if let Some(linger) = opts.linger {
            // true: give the OS 10s to flush on close; false: abortive close.
            let timeout = if linger { LINGER_ON_CLOSE } else { Duration::ZERO };
            stream.set_linger(Some(timeout))?;
        }
        Ok(())
    }

    /// Decode dispatch: runs the codec only while a receive hook is
    /// installed; otherwise the payload is discarded.
    fn dispatch(&self, data: NetworkData, conn: &Arc<Connection>) {
        if !self.hooks.has_receive_hook() {
            debug!(peer = %data.peer(), bytes = data.len(), "no receive hook, payload discarded");
            return;
        }
        match self.codec.decode(data.peer(), data.payload()) {
            Ok(messages) => {
                for payload in messages {
                    self.hooks
                        .notify_receive(NetworkData::new(data.peer(), payload), conn);
                }
            }
            Err(e) => {
                warn!(peer = %data.peer(), error = %e, "decode failed");
                self.hooks.notify_error(Arc::new(e), conn);
            }
        }
    }

    /// Disconnect/cleanup protocol, keyed by transport handle. Idempotent:
    /// the registry removal is the gate, so racing triggers collapse to a
    /// single teardown and a single disconnect notification.
    fn disconnect(&self, id: ConnId, error: Option<Arc<ReactorError>>) {
        let Some((peer, conn)) = self.registry.remove_pair(id) else {
            return;
        };
        self.finish_disconnect(peer, conn, error);
    }

    fn disconnect_by_peer(&self, peer: Peer, error: Option<Arc<ReactorError>>) {
        let Some((peer, conn)) = self.registry.remove_pair_by_peer(peer) else {
            return;
        };
        self.finish_disconnect(peer, conn, error);
    }

    fn finish_disconnect(&self, peer: Peer, conn: Arc<Connection>, error: Option<Arc<ReactorError>>) {
        conn.close();
        self.codec.evict(peer);
        match &error {
            Some(e) => info!(%peer, conn = %conn.id(), error = %e, "peer disconnected"),
            None => info!(%peer, conn = %conn.id(), "peer disconnected"),
        }
        self.hooks.notify_disconnected(peer, error);
    }
}

async fn accept_loop(inner: Arc<Inner>, listener: TcpListener) {
    loop {
        tokio::select! {
            _ = inner.accept_cancel.cancelled() => {
                info!("accept loop shut down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    // Admission (including the connected hook) runs on its
                    // own task; the next accept is armed immediately.
                    let inner = inner.clone();
                    tokio::spawn(async move {
                        if let Err(e) = admit(&inner, stream, addr) {
                            error!(peer = %addr, error = %e, "failed to admit connection");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "fatal accept failure, reactor stopping");
                    inner.mark_stopped();
                    break;
                }
            }
        }
    }
    // Dropping the listener here releases the listening handle.
}

/// Register an accepted stream and spawn its loops. Registration order
/// follows the accept contract: registry insert, connected hook, then the
/// receive loop.
fn admit(inner: &Arc<Inner>, stream: TcpStream, addr: SocketAddr) -> Result<()> {
    inner.apply_stream_options(&stream)?;

    let peer = Peer::new(addr);
    let id = ConnId::next();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let conn = Arc::new(Connection::new(id, peer, frames_tx));

    inner.registry.insert_pair(id, peer, conn.clone())?;
    info!(%peer, conn = %id, "peer connected");
    inner.hooks.notify_connected(peer, &conn);

    let (read_half, write_half) = stream.into_split();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(
        inner.clone(),
        conn.clone(),
        write_half,
        frames_rx,
    ));
    tokio::spawn(dispatch_loop(inner.clone(), conn.clone(), inbound_rx));
    tokio::spawn(read_loop(inner.clone(), conn, read_half, inbound_tx));
    Ok(())
}

/// Drains one connection's ordered inbound queue through decode dispatch.
/// Keeping this apart from the read loop leaves the socket armed while
/// application hooks process earlier payloads; per-peer order is preserved
/// by the queue. Exits once the read loop drops its sender.
async fn dispatch_loop(
    inner: Arc<Inner>,
    conn: Arc<Connection>,
    mut inbound: mpsc::UnboundedReceiver<NetworkData>,
) {
    while let Some(data) = inbound.recv().await {
        inner.dispatch(data, &conn);
    }
}

async fn read_loop<R>(
    inner: Arc<Inner>,
    conn: Arc<Connection>,
    mut read_half: R,
    inbound: mpsc::UnboundedSender<NetworkData>,
) where
    R: AsyncRead + Unpin,
{
    let peer = conn.peer();
    let id = conn.id();
    let cancel = conn.cancel_token().clone();

    // Staging buffer private to this connection; bytes are copied into an
    // owned NetworkData before the next read is armed, so a concurrent read
    // on another connection can never clobber them.
    let mut buf = vec![0u8; inner.staging_buffer_size()];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                inner.disconnect(id, None);
                break;
            }
            read = read_half.read(&mut buf) => match read {
                Ok(0) => {
                    debug!(%peer, "remote closed connection");
                    inner.disconnect(id, Some(Arc::new(ReactorError::ConnectionReset)));
                    break;
                }
                Ok(n) => {
                    debug!(%peer, bytes = n, "payload received");
                    let data = NetworkData::new(peer, Bytes::copy_from_slice(&buf[..n]));
                    // The dispatch task outlives this sender, so the send
                    // cannot fail while the loop is running.
                    let _ = inbound.send(data);
                }
                Err(e) if is_reset(&e) => {
                    inner.disconnect(id, Some(Arc::new(ReactorError::Io(e))));
                    break;
                }
                Err(e) => {
                    warn!(%peer, error = %e, "read error, connection left open");
                    inner.hooks.notify_error(Arc::new(ReactorError::Io(e)), &conn);
                }
            }
        }
    }
}

async fn write_loop<W>(
    inner: Arc<Inner>,
    conn: Arc<Connection>,
    mut write_half: W,
    mut frames: mpsc::UnboundedReceiver<Bytes>,
) where
    W: AsyncWrite + Unpin,
{
    let peer = conn.peer();
    let id = conn.id();
    let cancel = conn.cancel_token().clone();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write_half.shutdown().await;
                break;
            }
            frame = frames.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = write_half.write_all(&frame).await {
                        if is_reset(&e) {
                            inner.disconnect(id, Some(Arc::new(ReactorError::Io(e))));
                            break;
                        }
                        warn!(%peer, error = %e, "write error, connection left open");
                        inner.hooks.notify_error(Arc::new(ReactorError::Io(e)), &conn);
                    } else {
                        debug!(%peer, bytes = frame.len(), "frame written");
                    }
                }
                // Sender side gone: the connection handle has been dropped
                // everywhere, nothing left to write.
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use crate::core::codec::IdentityCodec;
    use crate::reactor::events::{event_channel, ReactorEvent};

    /// Read completions fed to a `read_loop` under test, in order. Once the
    /// script is exhausted the reader stays pending until cancellation.
    enum ReadStep {
        Data(&'static [u8]),
        Fail(io::ErrorKind),
    }

    struct ScriptedReader {
        steps: VecDeque<ReadStep>,
        polls: Arc<AtomicUsize>,
    }

    impl AsyncRead for ScriptedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            match self.steps.pop_front() {
                Some(ReadStep::Data(bytes)) => {
                    buf.put_slice(bytes);
                    Poll::Ready(Ok(()))
                }
                Some(ReadStep::Fail(kind)) => Poll::Ready(Err(kind.into())),
                None => Poll::Pending,
            }
        }
    }

    /// Write half that fails the scripted number of writes, then records
    /// everything written.
    struct ScriptedWriter {
        failures: VecDeque<io::ErrorKind>,
        written: Arc<StdMutex<Vec<u8>>>,
    }

    impl AsyncWrite for ScriptedWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if let Some(kind) = self.failures.pop_front() {
                return Poll::Ready(Err(kind.into()));
            }
            self.written.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Register a connection backed by a scripted read half and start its
    /// dispatch and read loops, mirroring what `admit` does for a real
    /// stream.
    fn spawn_scripted_connection(
        inner: &Arc<Inner>,
        steps: Vec<ReadStep>,
    ) -> (Arc<Connection>, Arc<AtomicUsize>) {
        let peer = Peer::new("127.0.0.1:4100".parse().unwrap());
        let id = ConnId::next();
        let (frames_tx, _frames_rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Connection::new(id, peer, frames_tx));
        inner.registry.insert_pair(id, peer, conn.clone()).unwrap();

        let polls = Arc::new(AtomicUsize::new(0));
        let reader = ScriptedReader {
            steps: VecDeque::from(steps),
            polls: polls.clone(),
        };
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch_loop(inner.clone(), conn.clone(), inbound_rx));
        tokio::spawn(read_loop(inner.clone(), conn.clone(), reader, inbound_tx));
        (conn, polls)
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn receive_hook_processing_does_not_stall_reads() {
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = StdMutex::new(release_rx);
        let first = AtomicBool::new(true);
        let seen: Arc<StdMutex<Vec<Bytes>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();

        let hooks = Hooks::new().on_receive(move |data, _conn| {
            // Hold the first message until the test releases it.
            if first.swap(false, Ordering::SeqCst) {
                let _ = release_rx.lock().unwrap().recv();
            }
            sink.lock().unwrap().push(data.into_payload());
        });
        let reactor = TcpReactor::new(ReactorConfig::default(), Arc::new(IdentityCodec), hooks);
        let inner = reactor.inner.clone();

        let (conn, polls) = spawn_scripted_connection(
            &inner,
            vec![ReadStep::Data(b"first"), ReadStep::Data(b"second")],
        );

        // Both payloads are read and a third read is armed while the hook is
        // still holding the first message.
        wait_until(|| polls.load(Ordering::SeqCst) >= 3).await;
        assert!(seen.lock().unwrap().is_empty(), "hook should still be held");

        release_tx.send(()).unwrap();
        wait_until(|| seen.lock().unwrap().len() == 2).await;
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Bytes::from_static(b"first"), Bytes::from_static(b"second")]
        );

        conn.close();
    }

    #[tokio::test]
    async fn generic_read_error_leaves_connection_open() {
        let (hooks, mut events) = event_channel();
        let reactor = TcpReactor::new(ReactorConfig::default(), Arc::new(IdentityCodec), hooks);
        let inner = reactor.inner.clone();

        let (conn, _polls) = spawn_scripted_connection(
            &inner,
            vec![
                ReadStep::Fail(io::ErrorKind::Other),
                ReadStep::Data(b"after"),
            ],
        );
        let peer = conn.peer();

        match events.recv().await {
            Some(ReactorEvent::Error(e, _)) => assert!(matches!(*e, ReactorError::Io(_))),
            other => panic!("expected Error, got {other:?}"),
        }
        // The loop kept reading past the failure.
        match events.recv().await {
            Some(ReactorEvent::Message(data, _)) => {
                assert_eq!(data.payload().as_ref(), b"after");
            }
            other => panic!("expected Message, got {other:?}"),
        }
        assert_eq!(inner.registry.len(), 1, "connection must stay registered");

        conn.close();
        match events.recv().await {
            Some(ReactorEvent::Disconnected(p, None)) => assert_eq!(p, peer),
            other => panic!("expected Disconnected, got {other:?}"),
        }
        assert!(inner.registry.is_empty());
    }

    #[tokio::test]
    async fn generic_write_error_leaves_connection_open() {
        let (hooks, mut events) = event_channel();
        let reactor = TcpReactor::new(ReactorConfig::default(), Arc::new(IdentityCodec), hooks);
        let inner = reactor.inner.clone();

        let peer = Peer::new("127.0.0.1:4101".parse().unwrap());
        let id = ConnId::next();
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Connection::new(id, peer, frames_tx));
        inner.registry.insert_pair(id, peer, conn.clone()).unwrap();

        let written = Arc::new(StdMutex::new(Vec::new()));
        let writer = ScriptedWriter {
            failures: VecDeque::from([io::ErrorKind::Other]),
            written: written.clone(),
        };
        tokio::spawn(write_loop(inner.clone(), conn.clone(), writer, frames_rx));

        conn.send_frame(Bytes::from_static(b"lost")).unwrap();
        conn.send_frame(Bytes::from_static(b"kept")).unwrap();

        match events.recv().await {
            Some(ReactorEvent::Error(e, _)) => assert!(matches!(*e, ReactorError::Io(_))),
            other => panic!("expected Error, got {other:?}"),
        }
        // The frame after the failed one still reaches the wire.
        wait_until(|| written.lock().unwrap().as_slice() == b"kept").await;
        assert_eq!(inner.registry.len(), 1, "connection must stay registered");

        conn.close();
    }
}
