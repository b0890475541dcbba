//! # tcp-reactor
//!
//! Asynchronous TCP connection reactor with pluggable codecs and
//! peer-addressed messaging.
//!
//! The reactor accepts inbound connections, tracks each as a logical
//! [`Peer`], pumps inbound bytes through a decoder into application-visible
//! messages, and pumps outbound messages through an encoder back onto the
//! wire. Applications see only a lightweight per-connection [`Connection`]
//! handle, never raw sockets.
//!
//! ## Architecture
//! - **Accept loop**: listens, registers new connections, starts their
//!   receive loops; acceptance never stops while the reactor is active
//! - **Receive loops**: one per connection, re-arming the read as soon as a
//!   payload is captured; decoded messages are dispatched in per-peer order
//!   from an ordered queue while different peers run in parallel
//! - **Send path**: peer-addressed, encode-then-write with natural queueing
//! - **Disconnect protocol**: one idempotent teardown path for read errors,
//!   reset-class write errors, and explicit closes
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tcp_reactor::{event_channel, IdentityCodec, ReactorConfig, ReactorEvent, TcpReactor};
//!
//! #[tokio::main]
//! async fn main() -> tcp_reactor::Result<()> {
//!     let config = ReactorConfig::default_with_overrides(|c| {
//!         c.listener.address = "127.0.0.1:9000".into();
//!     });
//!     let (hooks, mut events) = event_channel();
//!     let reactor = TcpReactor::new(config, Arc::new(IdentityCodec), hooks);
//!     reactor.start().await?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let ReactorEvent::Message(data, _conn) = event {
//!             // Echo every message back to its sender.
//!             let _ = reactor.send(data.peer(), data.payload());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod reactor;
pub mod utils;

pub use crate::config::{ListenerConfig, LoggingConfig, ReactorConfig, SocketConfig};
pub use crate::core::codec::{Codec, FrameCodec, IdentityCodec, MAX_FRAME_SIZE};
pub use crate::core::message::{ConnId, NetworkData, Peer};
pub use crate::error::{ReactorError, Result};
pub use crate::reactor::connection::Connection;
pub use crate::reactor::events::{event_channel, EventStream, Hooks, ReactorEvent};
pub use crate::reactor::tcp::{LifecycleState, TcpReactor};
