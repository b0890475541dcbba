//! # Reactor Components
//!
//! The connection-multiplexing machinery: registry, connection handles,
//! notification hooks, and the TCP reactor itself.
//!
//! ## Components
//! - **Registry**: bidirectional peer/connection bookkeeping with atomic
//!   pair insert/remove
//! - **Connection**: per-accepted-socket handle exposing send and close
//! - **Events**: application hooks and the event-loop routing variant
//! - **Tcp**: accept/receive/send loops and the disconnect protocol

pub mod connection;
pub mod events;
pub mod registry;
pub mod tcp;
