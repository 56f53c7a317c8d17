//! Free-list pool of streaming XXH64 hashers shared by concurrent merge calls.

use std::sync::{Mutex, MutexGuard, PoisonError};

use xxhash_rust::xxh64::Xxh64;

/// Thread-safe pool of reusable hashers.
///
/// Only the free list is synchronized. A hasher is owned exclusively by one
/// [`PooledHasher`] between acquire and release. The pool has no capacity
/// limit and allocates a fresh hasher whenever the free list is empty.
pub struct HasherPool {
    free: Mutex<Vec<Xxh64>>,
    seed: u64,
}

impl HasherPool {
    pub fn new(seed: u64) -> Self {
        Self::with_prewarmed(0, seed)
    }

    /// Creates a pool holding `count` idle hashers.
    pub fn with_prewarmed(count: usize, seed: u64) -> Self {
        let free = (0..count).map(|_| Xxh64::new(seed)).collect();
        Self {
            free: Mutex::new(free),
            seed,
        }
    }

    /// Borrows a hasher, allocating one if none is idle.
    pub fn acquire(&self) -> PooledHasher<'_> {
        let hasher = self.free_list().pop().unwrap_or_else(|| Xxh64::new(self.seed));
        PooledHasher {
            pool: self,
            hasher: Some(hasher),
        }
    }

    /// Number of idle hashers on the free list.
    pub fn idle(&self) -> usize {
        self.free_list().len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn release(&self, hasher: Xxh64) {
        self.free_list().push(hasher);
    }

    // A panic while the lock is held cannot leave the Vec half-updated.
    fn free_list(&self) -> MutexGuard<'_, Vec<Xxh64>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HasherPool {
    fn default() -> Self {
        Self::new(0)
    }
}

/// A hasher on loan from a [`HasherPool`]. Returned to the pool on drop.
///
/// The pool does not clear returned hashers; callers [`reset`](Self::reset)
/// after reading the digest so the next borrower starts clean.
pub struct PooledHasher<'a> {
    pool: &'a HasherPool,
    // Always `Some` until drop hands it back to the pool.
    hasher: Option<Xxh64>,
}

impl PooledHasher<'_> {
    pub fn update(&mut self, bytes: &[u8]) {
        if let Some(hasher) = self.hasher.as_mut() {
            hasher.update(bytes);
        }
    }

    pub fn digest(&self) -> u64 {
        self.hasher.as_ref().map_or(0, Xxh64::digest)
    }

    /// Clears accumulated state, keeping the pool's seed.
    pub fn reset(&mut self) {
        if let Some(hasher) = self.hasher.as_mut() {
            hasher.reset(self.pool.seed);
        }
    }

    /// Returns the hasher to the pool.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PooledHasher<'_> {
    fn drop(&mut self) {
        if let Some(hasher) = self.hasher.take() {
            self.pool.release(hasher);
        }
    }
}
