use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, TransportError};

/// Default number of byte codes buffered before the oldest are overwritten.
pub const DEFAULT_INPUT_CAPACITY: usize = 8 * 1024;

/// Smallest usable capacity: one full marker must fit.
pub const MIN_INPUT_CAPACITY: usize = 10;

/// Bounded, overwrite-on-full FIFO of raw byte codes.
///
/// Cloning the handle shares the storage, so one clone can live in a reader
/// thread while another is owned by the frame synchronizer. Bytes evicted by
/// an overflowing producer are counted in [`InputQueue::evicted`] so the
/// consumer can tell that positions it remembered are no longer valid.
#[derive(Clone)]
pub struct InputQueue {
    shared: Arc<Mutex<Inner>>,
}

struct Inner {
    bytes: VecDeque<u8>,
    capacity: usize,
    evicted: u64,
}

impl Inner {
    fn push(&mut self, code: u8) {
        if self.bytes.len() == self.capacity {
            self.bytes.pop_front();
            self.evicted += 1;
        }
        self.bytes.push_back(code);
    }
}

impl InputQueue {
    /// Create a queue with [`DEFAULT_INPUT_CAPACITY`].
    pub fn new() -> Self {
        Self::build(DEFAULT_INPUT_CAPACITY)
    }

    /// Create a queue holding at most `capacity` byte codes.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < MIN_INPUT_CAPACITY {
            return Err(TransportError::CapacityTooSmall {
                requested: capacity,
                min: MIN_INPUT_CAPACITY,
            });
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Inner {
                bytes: VecDeque::with_capacity(capacity),
                capacity,
                evicted: 0,
            })),
        }
    }

    /// Append one byte code, evicting the oldest if the queue is full.
    pub fn push(&self, code: u8) {
        self.lock_inner().push(code);
    }

    /// Append a run of byte codes under a single lock.
    pub fn extend(&self, codes: &[u8]) {
        let mut inner = self.lock_inner();
        for &code in codes {
            inner.push(code);
        }
    }

    /// Lock the queue for consumption.
    ///
    /// The guard is held for the duration of one synchronizer pass; the
    /// producer blocks on [`push`](Self::push) meanwhile.
    pub fn lock(&self) -> InputGuard<'_> {
        InputGuard {
            inner: self.lock_inner(),
        }
    }

    /// Number of byte codes currently buffered.
    pub fn len(&self) -> usize {
        self.lock_inner().bytes.len()
    }

    /// Returns true when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered byte codes.
    pub fn capacity(&self) -> usize {
        self.lock_inner().capacity
    }

    /// Total byte codes overwritten because the queue was full.
    pub fn evicted(&self) -> u64 {
        self.lock_inner().evicted
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        // A panicking producer leaves the deque structurally intact.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InputQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("InputQueue")
            .field("len", &inner.bytes.len())
            .field("capacity", &inner.capacity)
            .field("evicted", &inner.evicted)
            .finish()
    }
}

/// Exclusive consumer view of an [`InputQueue`].
pub struct InputGuard<'a> {
    inner: MutexGuard<'a, Inner>,
}

impl InputGuard<'_> {
    /// Byte code at `index` from the front, if present.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.inner.bytes.get(index).copied()
    }

    /// Number of byte codes currently buffered.
    pub fn len(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Returns true when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }

    /// Remove and return the front byte code.
    pub fn pop_front(&mut self) -> Option<u8> {
        self.inner.bytes.pop_front()
    }

    /// Remove up to `count` byte codes from the front, returning how many were removed.
    pub fn drain_front(&mut self, count: usize) -> usize {
        let count = count.min(self.inner.bytes.len());
        self.inner.bytes.drain(..count);
        count
    }

    /// Copy `len` byte codes starting at `start` without consuming them.
    pub fn copy_range(&self, start: usize, len: usize) -> Option<Vec<u8>> {
        let end = start.checked_add(len)?;
        if end > self.inner.bytes.len() {
            return None;
        }
        Some(self.inner.bytes.range(start..end).copied().collect())
    }

    /// Total byte codes overwritten because the queue was full.
    pub fn evicted(&self) -> u64 {
        self.inner.evicted
    }
}
