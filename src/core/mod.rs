//! # Core Data Model
//!
//! The data units and codec seam the reactor is built around.
//!
//! ## Components
//! - **Message**: `Peer` identity, `ConnId` transport key, and the
//!   `NetworkData` payload unit crossing the codec boundary
//! - **Codec**: pluggable encode/decode stages invoked on the send and
//!   receive paths
//!
//! ## Wire Format
//! The reactor itself imposes no wire format; framing belongs to the codec.
//! The bundled [`codec::FrameCodec`] uses:
//! ```text
//! [Length(4, BE)] [Payload(N)]
//! ```
//!
//! ## Safety
//! - `FrameCodec` validates the declared length against a maximum before
//!   allocating (prevents memory exhaustion from a hostile length header)

pub mod codec;
pub mod message;
