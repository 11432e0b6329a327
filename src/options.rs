//! # Codec Options
//!
//! Per-codec configuration: where the staging buffer comes from and how big
//! it is. A codec holds no other ambient state.
//!
//! ## Usage
//!
//! ```ignore
//! use rowbin::{CodecOptions, RowBinaryReader};
//!
//! // Default: a 1 MiB slab from the process-wide pool.
//! let reader = RowBinaryReader::new(stream)?;
//!
//! // Custom slab size from a private pool.
//! let pool = ByteBufferPool::new(64 * 1024, 8)?;
//! let options = CodecOptions::default().buffer_size(64 * 1024).pool(pool);
//! let reader = RowBinaryReader::with_options(stream, options)?;
//! ```
//!
//! The buffer must be at least as large as the largest single row on the
//! stream: typed primitives stage whole values through it, and a value wider
//! than the slab is rejected rather than deadlocking the refill loop.

use eyre::{ensure, Result};

use crate::config::DEFAULT_BUFFER_SIZE;
use crate::memory::{ByteBufferPool, CodecBuffer};

/// Buffer configuration for one reader or writer.
#[derive(Debug)]
pub struct CodecOptions {
    buffer_size: usize,
    pool: Option<ByteBufferPool>,
    buffer: Option<Box<[u8]>>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            pool: None,
            buffer: None,
        }
    }
}

impl CodecOptions {
    /// Size of the pooled slab to draw. Must be strictly positive. Ignored
    /// when an explicit buffer is supplied.
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    /// Pool to draw the slab from and return it to. Defaults to the shared
    /// process-wide pool.
    pub fn pool(mut self, pool: ByteBufferPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Use this buffer instead of a pooled slab. Takes precedence over
    /// `buffer_size`/`pool`; the buffer is owned by the codec for its
    /// lifetime and is never pooled.
    pub fn buffer(mut self, buffer: Box<[u8]>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Resolves the configuration into the slab the codec will hold.
    pub(crate) fn acquire(self) -> Result<CodecBuffer> {
        if let Some(buffer) = self.buffer {
            ensure!(!buffer.is_empty(), "caller-supplied buffer must not be empty");
            return Ok(CodecBuffer::Caller(buffer));
        }
        ensure!(self.buffer_size > 0, "pooled buffer size must be positive");
        let pool = match &self.pool {
            Some(pool) => pool,
            None => ByteBufferPool::shared(),
        };
        Ok(CodecBuffer::Pooled(pool.acquire(self.buffer_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_draws_from_the_shared_pool() {
        let slab = CodecOptions::default().acquire().unwrap();
        assert_eq!(slab.len(), DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        assert!(CodecOptions::default().buffer_size(0).acquire().is_err());
    }

    #[test]
    fn caller_buffer_takes_precedence() {
        let options = CodecOptions::default()
            .buffer_size(4)
            .buffer(vec![0u8; 128].into_boxed_slice());
        let slab = options.acquire().unwrap();
        assert_eq!(slab.len(), 128);
    }

    #[test]
    fn empty_caller_buffer_is_rejected() {
        let options = CodecOptions::default().buffer(Vec::new().into_boxed_slice());
        assert!(options.acquire().is_err());
    }

    #[test]
    fn private_pool_round_trips_the_slab() {
        let pool = ByteBufferPool::new(256, 1).unwrap();
        let options = CodecOptions::default().buffer_size(256).pool(pool.clone());
        let slab = options.acquire().unwrap();
        assert_eq!(pool.available(), 0);
        drop(slab);
        assert_eq!(pool.available(), 1);
    }
}
