//! Object pooling for frequently recycled entities.

/// Capability required from pooled values.
///
/// `reset` must restore every invariant a freshly constructed value holds.
pub trait Poolable {
    /// Restores the value to its initial state before reuse.
    fn reset(&mut self);
}

/// Owning pool of released values.
///
/// Released values move into the pool, so a prior owner can never observe
/// the value again.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    capacity: usize,
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates an empty pool that keeps at most `capacity` released values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::new(),
            capacity,
        }
    }

    /// Takes a pooled value, or builds one with `create` when the pool is empty.
    pub fn acquire<F>(&mut self, create: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.free.pop().unwrap_or_else(create)
    }

    /// Resets `value` and stores it for reuse; values beyond capacity are dropped.
    pub fn release(&mut self, mut value: T) {
        if self.free.len() >= self.capacity {
            return;
        }
        value.reset();
        self.free.push(value);
    }

    /// Number of values waiting for reuse.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}
