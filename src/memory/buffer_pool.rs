//! # Byte Buffer Pool
//!
//! Reusable pool of codec-sized byte slabs. Every reader and writer stages
//! its stream through one slab; pooling them keeps steady-state row
//! processing free of large allocations.
//!
//! ## Usage
//!
//! ```ignore
//! let pool = ByteBufferPool::new(1 << 20, 4)?; // Pre-allocate 4 slabs
//!
//! let mut slab = pool.acquire(1 << 20);
//! slab[0] = 0xFF;
//!
//! // Slab automatically returns to the pool when dropped
//! drop(slab);
//! ```
//!
//! ## Design
//!
//! The pool uses lock sharding (16 shards) to reduce contention when many
//! codecs on separate streams share the process-wide pool.
//!
//! `PooledBuffer` uses `ManuallyDrop` instead of `Option` to make invalid
//! states unrepresentable at the type level. Ownership guarantees the slab
//! returns to its shard exactly once, on drop, on every exit path.
//!
//! An acquire whose size differs from the pool's slab size is served by a
//! fresh allocation and freed rather than pooled on drop, so odd-sized
//! codecs cannot poison the shards.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use eyre::{ensure, Result};
use parking_lot::Mutex;

use crate::config::DEFAULT_BUFFER_SIZE;

/// Number of shards for the buffer pool to reduce lock contention.
const BUFFER_POOL_SHARD_COUNT: usize = 16;

static SHARED_POOL: OnceLock<ByteBufferPool> = OnceLock::new();

/// A pool of reusable byte slabs of one fixed size.
///
/// Slabs are returned to the pool when dropped. Cloning the handle shares
/// the underlying shards.
pub struct ByteBufferPool {
    inner: Arc<ByteBufferPoolInner>,
}

struct ByteBufferPoolInner {
    slab_size: usize,
    shards: [Mutex<Vec<Box<[u8]>>>; BUFFER_POOL_SHARD_COUNT],
    /// Round-robin counter for distributing acquire requests across shards
    next_shard: AtomicUsize,
}

impl ByteBufferPoolInner {
    fn with_slab_size(slab_size: usize) -> Self {
        Self {
            slab_size,
            shards: std::array::from_fn(|_| Mutex::new(Vec::new())),
            next_shard: AtomicUsize::new(0),
        }
    }
}

impl ByteBufferPool {
    /// Create a new pool of `slab_size`-byte buffers with `initial_capacity`
    /// slabs pre-allocated, distributed evenly across shards.
    pub fn new(slab_size: usize, initial_capacity: usize) -> Result<Self> {
        ensure!(slab_size > 0, "pooled buffer size must be positive");

        let inner = ByteBufferPoolInner::with_slab_size(slab_size);
        let per_shard = initial_capacity / BUFFER_POOL_SHARD_COUNT;
        let remainder = initial_capacity % BUFFER_POOL_SHARD_COUNT;

        for (i, shard) in inner.shards.iter().enumerate() {
            let count = per_shard + usize::from(i < remainder);
            let mut guard = shard.lock();
            for _ in 0..count {
                guard.push(vec![0u8; slab_size].into_boxed_slice());
            }
        }

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// The process-wide pool of default-sized slabs. Codecs built without an
    /// explicit pool draw from here.
    pub fn shared() -> &'static ByteBufferPool {
        SHARED_POOL.get_or_init(|| ByteBufferPool {
            inner: Arc::new(ByteBufferPoolInner::with_slab_size(DEFAULT_BUFFER_SIZE)),
        })
    }

    pub fn slab_size(&self) -> usize {
        self.inner.slab_size
    }

    /// Acquire a buffer of exactly `size` bytes.
    ///
    /// Requests matching the pool's slab size are served from the shards
    /// (round-robin) and return there on drop; other sizes are one-off
    /// allocations.
    pub fn acquire(&self, size: usize) -> PooledBuffer {
        let buffer = if size == self.inner.slab_size {
            let shard_idx =
                self.inner.next_shard.fetch_add(1, Ordering::Relaxed) % BUFFER_POOL_SHARD_COUNT;
            self.inner.shards[shard_idx].lock().pop()
        } else {
            None
        };

        let buffer = buffer.unwrap_or_else(|| vec![0u8; size].into_boxed_slice());

        PooledBuffer {
            buffer: ManuallyDrop::new(buffer),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Returns the current number of idle slabs across all shards.
    pub fn available(&self) -> usize {
        self.inner.shards.iter().map(|s| s.lock().len()).sum()
    }
}

impl Clone for ByteBufferPool {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for ByteBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBufferPool")
            .field("slab_size", &self.inner.slab_size)
            .field("available", &self.available())
            .finish()
    }
}

/// A byte slab that returns to its pool when dropped.
///
/// Provides `Deref` and `DerefMut` to the underlying `[u8]`.
pub struct PooledBuffer {
    /// The slab itself. Always valid until Drop.
    /// ManuallyDrop is used so we can take ownership in Drop without moving out of self.
    buffer: ManuallyDrop<Box<[u8]>>,
    pool: Arc<ByteBufferPoolInner>,
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buffer.len())
            .finish()
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        // SAFETY: drop runs once; the slab is valid until this point and is
        // moved out exactly once.
        let buffer = unsafe { ManuallyDrop::take(&mut self.buffer) };
        if buffer.len() == self.pool.slab_size {
            let shard_idx =
                self.pool.next_shard.fetch_add(1, Ordering::Relaxed) % BUFFER_POOL_SHARD_COUNT;
            self.pool.shards[shard_idx].lock().push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_return() {
        let pool = ByteBufferPool::new(64, 2).unwrap();
        assert_eq!(pool.available(), 2);

        let a = pool.acquire(64);
        assert_eq!(pool.available(), 1);

        let b = pool.acquire(64);
        assert_eq!(pool.available(), 0);

        // Pool empty, this allocates.
        let c = pool.acquire(64);
        assert_eq!(pool.available(), 0);

        drop(a);
        drop(b);
        drop(c);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn odd_sized_acquire_is_not_pooled() {
        let pool = ByteBufferPool::new(64, 1).unwrap();

        let odd = pool.acquire(128);
        assert_eq!(odd.len(), 128);
        assert_eq!(pool.available(), 1);

        drop(odd);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn zero_slab_size_is_rejected() {
        assert!(ByteBufferPool::new(0, 1).is_err());
    }

    #[test]
    fn clone_shares_shards() {
        let pool1 = ByteBufferPool::new(64, 2).unwrap();
        let pool2 = pool1.clone();

        let _slab = pool1.acquire(64);
        assert_eq!(pool2.available(), 1);
    }

    #[test]
    fn shared_pool_uses_default_slab_size() {
        let pool = ByteBufferPool::shared();
        assert_eq!(pool.slab_size(), DEFAULT_BUFFER_SIZE);
    }
}
