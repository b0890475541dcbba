//! # Notification Hooks
//!
//! The application-facing edge of the reactor: connect/receive/disconnect/
//! error notifications, plus the event-loop routing variant.
//!
//! Two ways to consume events, chosen by composition rather than
//! subclassing:
//! - **Direct dispatch**: install closures on [`Hooks`]; they run inline on
//!   the completion that produced them.
//! - **Event loop**: [`event_channel`] wires every hook into an unbounded
//!   channel and hands back an [`EventStream`] of [`ReactorEvent`]s for a
//!   consumer task to drain.
//!
//! The receive hook is optional and runtime-settable; while it is absent,
//! decoded messages are discarded (the consumer may not be listening yet).

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::core::message::{NetworkData, Peer};
use crate::error::ReactorError;
use crate::reactor::connection::Connection;

pub type ConnectedHook = Box<dyn Fn(Peer, &Arc<Connection>) + Send + Sync>;
pub type ReceiveHook = Box<dyn Fn(NetworkData, &Arc<Connection>) + Send + Sync>;
pub type DisconnectedHook = Box<dyn Fn(Peer, Option<Arc<ReactorError>>) + Send + Sync>;
pub type ErrorHook = Box<dyn Fn(Arc<ReactorError>, &Arc<Connection>) + Send + Sync>;

/// Notification hooks provided by the application. All hooks are optional;
/// the receive hook alone can also be (re)installed after the reactor has
/// started.
#[derive(Default)]
pub struct Hooks {
    connected: Option<ConnectedHook>,
    receive: RwLock<Option<ReceiveHook>>,
    disconnected: Option<DisconnectedHook>,
    error: Option<ErrorHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per accepted connection, before its receive loop starts.
    pub fn on_connected<F>(mut self, hook: F) -> Self
    where
        F: Fn(Peer, &Arc<Connection>) + Send + Sync + 'static,
    {
        self.connected = Some(Box::new(hook));
        self
    }

    /// Called once per decoded logical message, in per-peer receive order.
    pub fn on_receive<F>(self, hook: F) -> Self
    where
        F: Fn(NetworkData, &Arc<Connection>) + Send + Sync + 'static,
    {
        self.set_receive(Some(Box::new(hook)));
        self
    }

    /// Called exactly once when a peer's connection is torn down. The error
    /// is absent for an explicit local close.
    pub fn on_disconnected<F>(mut self, hook: F) -> Self
    where
        F: Fn(Peer, Option<Arc<ReactorError>>) + Send + Sync + 'static,
    {
        self.disconnected = Some(Box::new(hook));
        self
    }

    /// Called for non-reset I/O and codec failures; the connection stays
    /// open.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<ReactorError>, &Arc<Connection>) + Send + Sync + 'static,
    {
        self.error = Some(Box::new(hook));
        self
    }

    pub(crate) fn set_receive(&self, hook: Option<ReceiveHook>) {
        let mut slot = self
            .receive
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = hook;
    }

    pub(crate) fn has_receive_hook(&self) -> bool {
        self.receive
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    pub(crate) fn notify_connected(&self, peer: Peer, conn: &Arc<Connection>) {
        if let Some(hook) = &self.connected {
            hook(peer, conn);
        }
    }

    /// Forward one decoded message; returns false when no hook is installed
    /// (the message has been discarded).
    pub(crate) fn notify_receive(&self, data: NetworkData, conn: &Arc<Connection>) -> bool {
        let slot = self
            .receive
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_ref() {
            Some(hook) => {
                hook(data, conn);
                true
            }
            None => false,
        }
    }

    pub(crate) fn notify_disconnected(&self, peer: Peer, error: Option<Arc<ReactorError>>) {
        if let Some(hook) = &self.disconnected {
            hook(peer, error);
        }
    }

    pub(crate) fn notify_error(&self, error: Arc<ReactorError>, conn: &Arc<Connection>) {
        if let Some(hook) = &self.error {
            hook(error, conn);
        }
    }
}

/// Everything the reactor can tell an event-loop consumer.
#[derive(Debug)]
pub enum ReactorEvent {
    Connected(Peer, Arc<Connection>),
    Message(NetworkData, Arc<Connection>),
    Disconnected(Peer, Option<Arc<ReactorError>>),
    Error(Arc<ReactorError>, Arc<Connection>),
}

/// Receiving end of the event-loop variant.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<ReactorEvent>,
}

impl EventStream {
    /// Next event, or `None` once the reactor side has been dropped.
    pub async fn recv(&mut self) -> Option<ReactorEvent> {
        self.rx.recv().await
    }

    /// Adapt into a `futures`-compatible `Stream`.
    pub fn into_stream(self) -> UnboundedReceiverStream<ReactorEvent> {
        UnboundedReceiverStream::new(self.rx)
    }
}

/// Build a [`Hooks`] set that routes every notification into a channel,
/// delegating consumption to a shared event loop instead of running
/// application code inline on completions.
pub fn event_channel() -> (Hooks, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();

    let connected_tx = tx.clone();
    let receive_tx = tx.clone();
    let disconnected_tx = tx.clone();
    let error_tx = tx;

    let hooks = Hooks::new()
        .on_connected(move |peer, conn| {
            let _ = connected_tx.send(ReactorEvent::Connected(peer, conn.clone()));
        })
        .on_receive(move |data, conn| {
            let _ = receive_tx.send(ReactorEvent::Message(data, conn.clone()));
        })
        .on_disconnected(move |peer, error| {
            let _ = disconnected_tx.send(ReactorEvent::Disconnected(peer, error));
        })
        .on_error(move |error, conn| {
            let _ = error_tx.send(ReactorEvent::Error(error, conn.clone()));
        });

    (hooks, EventStream { rx })
}
