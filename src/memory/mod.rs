//! # Buffer Memory Management
//!
//! Pooled byte slabs backing the codec state machines.
//!
//! - [`buffer_pool`]: sharded pool with RAII return-on-drop
//! - [`CodecBuffer`]: the slab a codec actually holds, pooled or caller-owned

use std::ops::{Deref, DerefMut};

pub mod buffer_pool;

pub use buffer_pool::{ByteBufferPool, PooledBuffer};

/// The staging slab owned by one codec for its lifetime.
///
/// Pooled slabs return to their pool when the codec drops; a caller-supplied
/// slab is simply freed (never pooled).
#[derive(Debug)]
pub enum CodecBuffer {
    Pooled(PooledBuffer),
    Caller(Box<[u8]>),
}

impl Deref for CodecBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            CodecBuffer::Pooled(slab) => slab,
            CodecBuffer::Caller(slab) => slab,
        }
    }
}

impl DerefMut for CodecBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            CodecBuffer::Pooled(slab) => slab,
            CodecBuffer::Caller(slab) => slab,
        }
    }
}
