//! # Error Types
//!
//! Error handling for the reactor core.
//!
//! This module defines all error variants that can occur while the reactor is
//! running, from low-level I/O failures to lifecycle misuse.
//!
//! ## Error Categories
//! - **Transport-reset**: the remote closed or reset the connection; routed
//!   through the disconnect protocol and reported via the disconnect hook.
//! - **Generic I/O errors**: any other read/write failure; reported via the
//!   error hook with the connection left open.
//! - **Registry errors**: lookup misses (`PeerNotFound`) are treated as
//!   "already disconnected"; duplicate keys (`RegistryCorrupted`) must not
//!   happen by construction.
//! - **Lifecycle errors**: operations invoked from an illegal state.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

use crate::core::message::Peer;

/// Primary error type for all reactor operations.
#[derive(Error, Debug)]
pub enum ReactorError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport-reset class: the remote endpoint closed or reset the
    /// connection during a read or write.
    #[error("connection reset by peer")]
    ConnectionReset,

    /// The connection handle was already closed when a send was attempted.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send addressed to a peer with no registry entry, typically because it
    /// already disconnected.
    #[error("unknown peer: {0}")]
    PeerNotFound(Peer),

    /// A registry key that must be unique by construction was already
    /// present.
    #[error("peer registry corrupted: {0}")]
    RegistryCorrupted(String),

    #[error("codec error: {0}")]
    Codec(String),

    /// Lifecycle operation invoked from a state it is not defined for.
    #[error("cannot {operation} while reactor is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using ReactorError
pub type Result<T> = std::result::Result<T, ReactorError>;

/// Whether an I/O error belongs to the transport-reset class.
///
/// Reset-class errors are the only ones that tear a connection down; every
/// other I/O failure is surfaced through the error hook with the connection
/// left open.
pub fn is_reset(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
