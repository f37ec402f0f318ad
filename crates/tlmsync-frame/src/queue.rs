use std::collections::VecDeque;

use crate::payload::RawPayload;

/// Default number of payloads held before the oldest is dropped.
pub const DEFAULT_DECODE_QUEUE_CAPACITY: usize = 512;

/// Bounded FIFO of validated payloads between the synchronizer and the decoder.
///
/// When full, pushing drops the oldest unconsumed payload.
#[derive(Debug)]
pub struct DecodeQueue {
    payloads: VecDeque<RawPayload>,
    capacity: usize,
    dropped: u64,
}

impl DecodeQueue {
    /// Create a queue with [`DEFAULT_DECODE_QUEUE_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DECODE_QUEUE_CAPACITY)
    }

    /// Create a queue holding at most `capacity` payloads (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            payloads: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append a payload, returning the evicted oldest one if the queue was full.
    pub fn push(&mut self, payload: RawPayload) -> Option<RawPayload> {
        let evicted = if self.payloads.len() == self.capacity {
            self.dropped += 1;
            self.payloads.pop_front()
        } else {
            None
        };
        self.payloads.push_back(payload);
        evicted
    }

    /// Remove the oldest payload.
    pub fn pop(&mut self) -> Option<RawPayload> {
        self.payloads.pop_front()
    }

    /// Oldest payload without removing it.
    pub fn peek(&self) -> Option<&RawPayload> {
        self.payloads.front()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total payloads dropped on overflow.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for DecodeQueue {
    fn default() -> Self {
        Self::new()
    }
}
