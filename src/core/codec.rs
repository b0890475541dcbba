//! # Codec Pipeline
//!
//! The pluggable encode/decode seam between raw transport bytes and logical
//! messages.
//!
//! The reactor guarantees it calls [`Codec::decode`] exactly once per
//! successful read and [`Codec::encode`] exactly once per send request,
//! preserving order in both directions. The pipeline itself holds no
//! peer-specific state; framing state, if a codec needs any, lives inside
//! the codec implementation (see [`FrameCodec`]).

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::message::Peer;
use crate::error::{ReactorError, Result};

/// Max allowed frame payload (16 MB). Guards allocation against hostile
/// length headers.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Encode/decode stage pair translating between logical messages and wire
/// bytes.
///
/// A single read may contain multiple frames or a partial frame, so `decode`
/// yields zero or more logical messages per call. One logical message may
/// fan out into an ordered sequence of wire frames, so `encode` yields one
/// or more frames.
pub trait Codec: Send + Sync + 'static {
    /// Translate one chunk of received bytes into the logical messages it
    /// completes, in order. `peer` keys any framing state the codec keeps.
    fn decode(&self, peer: Peer, bytes: &[u8]) -> Result<Vec<Bytes>>;

    /// Translate one logical message into the ordered wire frames that carry
    /// it.
    fn encode(&self, payload: &[u8]) -> Result<Vec<Bytes>>;

    /// Drop any per-peer framing state. Called by the disconnect protocol;
    /// stateless codecs can ignore it.
    fn evict(&self, _peer: Peer) {}
}

/// Pass-through codec: every read is one logical message, every message is
/// one wire frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn decode(&self, _peer: Peer, bytes: &[u8]) -> Result<Vec<Bytes>> {
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Bytes::copy_from_slice(bytes)])
    }

    fn encode(&self, payload: &[u8]) -> Result<Vec<Bytes>> {
        Ok(vec![Bytes::copy_from_slice(payload)])
    }
}

/// Length-prefixed framing codec: `[Length(4, BE)] [Payload(N)]`.
///
/// Keeps a per-peer staging buffer so frames split across reads are
/// reassembled and multiple frames in one read are all delivered, in order.
pub struct FrameCodec {
    max_frame_size: usize,
    partial: Mutex<HashMap<Peer, BytesMut>>,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_max_frame_size(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            partial: Mutex::new(HashMap::new()),
        }
    }

    fn drain_frames(&self, buf: &mut BytesMut) -> Result<Vec<Bytes>> {
        let mut frames = Vec::new();
        loop {
            if buf.len() < 4 {
                return Ok(frames);
            }
            let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
            if len > self.max_frame_size {
                return Err(ReactorError::Codec(format!(
                    "frame of {len} bytes exceeds maximum of {}",
                    self.max_frame_size
                )));
            }
            if buf.len() < 4 + len {
                return Ok(frames);
            }
            buf.advance(4);
            frames.push(buf.split_to(len).freeze());
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for FrameCodec {
    fn decode(&self, peer: Peer, bytes: &[u8]) -> Result<Vec<Bytes>> {
        let mut partial = self
            .partial
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let buf = partial.entry(peer).or_default();
        buf.extend_from_slice(bytes);
        let drained = self.drain_frames(buf);
        if buf.is_empty() {
            partial.remove(&peer);
        }
        drained
    }

    fn encode(&self, payload: &[u8]) -> Result<Vec<Bytes>> {
        if payload.len() > self.max_frame_size {
            return Err(ReactorError::Codec(format!(
                "payload of {} bytes exceeds maximum frame size of {}",
                payload.len(),
                self.max_frame_size
            )));
        }
        let mut frame = BytesMut::with_capacity(4 + payload.len());
        frame.put_u32(payload.len() as u32);
        frame.put_slice(payload);
        Ok(vec![frame.freeze()])
    }

    fn evict(&self, peer: Peer) {
        let mut partial = self
            .partial
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        partial.remove(&peer);
    }
}
