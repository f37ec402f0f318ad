use crate::error::{FrameError, Result};
use crate::marker::MARKER_LEN;
use crate::queue::DEFAULT_DECODE_QUEUE_CAPACITY;

/// Default distance past the first marker after which the search for a
/// second marker is abandoned.
pub const DEFAULT_MAX_CHECK_SIZE: usize = 1000;

/// Frame synchronizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Bytes scanned past a first marker before giving up and resynchronizing.
    /// Bounds the largest frame body that can be accepted.
    pub max_check_size: usize,
    /// Payloads buffered between synchronizer and decoder.
    pub decode_queue_capacity: usize,
}

impl SyncConfig {
    /// Check that the values can drive a synchronizer.
    pub fn validate(&self) -> Result<()> {
        if self.max_check_size < MARKER_LEN {
            return Err(FrameError::InvalidConfig(format!(
                "max_check_size must be at least {MARKER_LEN}, got {}",
                self.max_check_size
            )));
        }
        if self.decode_queue_capacity == 0 {
            return Err(FrameError::InvalidConfig(
                "decode_queue_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), then check that a whole search window
    /// (both markers plus `max_check_size` bytes) fits in an input queue of
    /// `input_capacity` bytes. A larger window would be lost to overruns
    /// before it could stall.
    pub fn validate_for_capacity(&self, input_capacity: usize) -> Result<()> {
        self.validate()?;
        let window = self.max_check_size.saturating_add(2 * MARKER_LEN);
        if window > input_capacity {
            return Err(FrameError::InvalidConfig(format!(
                "max_check_size {} needs an input queue of at least {window} bytes, capacity is {input_capacity}",
                self.max_check_size
            )));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_check_size: DEFAULT_MAX_CHECK_SIZE,
            decode_queue_capacity: DEFAULT_DECODE_QUEUE_CAPACITY,
        }
    }
}
