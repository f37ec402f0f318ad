use std::ops::AddAssign;

use tlmsync_transport::{InputGuard, InputQueue};
use tracing::{debug, trace, warn};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::marker::{scan_step, MarkerState, MARKER_LEN};
use crate::payload::RawPayload;
use crate::queue::DecodeQueue;

/// Marker search state carried between invocations of [`FrameSynchronizer::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No marker pending. Non-marker bytes at the front are dropped one by one.
    Searching,
    /// A marker was confirmed; `marker_end` is the queue position just after it.
    FirstFound { marker_end: usize },
}

/// Counters describing what a synchronizer pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Payloads pushed onto the decode queue.
    pub frames: u64,
    /// Frames discarded because the body was empty or not a whole number of records.
    pub misaligned: u64,
    /// Second-marker searches abandoned at `max_check_size`.
    pub stalls: u64,
    /// Bytes dropped from the front while searching for a marker.
    pub dropped_bytes: u64,
    /// Passes that found the producer had overwritten unread input.
    pub overruns: u64,
    /// Payloads evicted from a full decode queue.
    pub evicted_payloads: u64,
}

impl AddAssign for SyncStats {
    fn add_assign(&mut self, rhs: Self) {
        self.frames += rhs.frames;
        self.misaligned += rhs.misaligned;
        self.stalls += rhs.stalls;
        self.dropped_bytes += rhs.dropped_bytes;
        self.overruns += rhs.overruns;
        self.evicted_payloads += rhs.evicted_payloads;
    }
}

/// Extracts marker-delimited frame bodies from a shared [`InputQueue`].
///
/// Call [`run`](Self::run) on every tick; each call consumes as much input as
/// is currently buffered and stops when fewer than ten bytes remain to check.
pub struct FrameSynchronizer {
    input: InputQueue,
    decode_queue: DecodeQueue,
    config: SyncConfig,
    state: SyncState,
    scan_index: usize,
    last_evicted: u64,
    totals: SyncStats,
}

impl FrameSynchronizer {
    /// Create a synchronizer with default configuration.
    pub fn new(input: InputQueue) -> Self {
        Self::build(input, SyncConfig::default())
    }

    /// Create a synchronizer with explicit configuration.
    ///
    /// Fails if the settings are invalid or the search window does not fit
    /// in `input`'s capacity.
    pub fn with_config(input: InputQueue, config: SyncConfig) -> Result<Self> {
        config.validate_for_capacity(input.capacity())?;
        Ok(Self::build(input, config))
    }

    fn build(input: InputQueue, config: SyncConfig) -> Self {
        let last_evicted = input.evicted();
        Self {
            input,
            decode_queue: DecodeQueue::with_capacity(config.decode_queue_capacity),
            config,
            state: SyncState::Searching,
            scan_index: 0,
            last_evicted,
            totals: SyncStats::default(),
        }
    }

    /// Scan the buffered input, enqueueing every complete frame found.
    ///
    /// Never fails: damaged frames are counted in the returned stats and dropped.
    pub fn run(&mut self) -> SyncStats {
        let mut pass = SyncStats::default();
        let input = self.input.clone();
        let mut guard = input.lock();

        if guard.evicted() != self.last_evicted {
            self.last_evicted = guard.evicted();
            pass.overruns += 1;
            if let SyncState::FirstFound { .. } = self.state {
                warn!("input queue overrun, pending frame discarded");
            }
            self.reset();
        }

        loop {
            match scan_step(&guard, self.scan_index) {
                MarkerState::EndOfBuffer => break,
                MarkerState::IsMarker => match self.state {
                    SyncState::Searching => {
                        let marker_end = self.scan_index + MARKER_LEN;
                        trace!(marker_end, "first marker");
                        self.state = SyncState::FirstFound { marker_end };
                        self.scan_index = marker_end;
                    }
                    SyncState::FirstFound { marker_end } => {
                        self.close_frame(&mut guard, marker_end, &mut pass);
                    }
                },
                MarkerState::NotMarker => match self.state {
                    SyncState::Searching => {
                        guard.pop_front();
                        pass.dropped_bytes += 1;
                        self.scan_index = 0;
                    }
                    SyncState::FirstFound { marker_end } => {
                        self.scan_index += 1;
                        if self.scan_index - marker_end >= self.config.max_check_size {
                            warn!(
                                max_check_size = self.config.max_check_size,
                                "no second marker within max check size, resynchronizing"
                            );
                            pass.stalls += 1;
                            // The stale marker still heads the queue; retire its
                            // first byte so the search cannot lock onto it again.
                            let stale = marker_end - MARKER_LEN + 1;
                            pass.dropped_bytes += guard.drain_front(stale) as u64;
                            self.reset();
                        }
                    }
                },
            }
        }

        if pass.dropped_bytes > 0 {
            trace!(dropped = pass.dropped_bytes, "dropped unframed bytes");
        }
        self.totals += pass;
        pass
    }

    /// Handle a second marker starting at the scan cursor.
    fn close_frame(&mut self, guard: &mut InputGuard<'_>, marker_end: usize, pass: &mut SyncStats) {
        let second_start = self.scan_index;
        let second_end = second_start + MARKER_LEN;
        let payload_len = second_end - marker_end - MARKER_LEN;

        let codes = guard
            .copy_range(marker_end, payload_len)
            .unwrap_or_default();
        match RawPayload::from_codes(&codes) {
            Ok(payload) => {
                debug!(
                    len = payload_len,
                    records = payload.record_count(),
                    "frame extracted"
                );
                pass.frames += 1;
                if self.decode_queue.push(payload).is_some() {
                    debug!("decode queue full, oldest payload dropped");
                    pass.evicted_payloads += 1;
                }
            }
            Err(_) => {
                debug!(len = payload_len, "frame not a multiple of 10, discarding");
                pass.misaligned += 1;
            }
        }

        // Keep the second marker; it opens the next frame.
        guard.drain_front(second_start);
        self.state = SyncState::FirstFound {
            marker_end: MARKER_LEN,
        };
        self.scan_index = MARKER_LEN;
    }

    fn reset(&mut self) {
        self.state = SyncState::Searching;
        self.scan_index = 0;
    }

    /// Remove the oldest extracted payload.
    pub fn pop_payload(&mut self) -> Option<RawPayload> {
        self.decode_queue.pop()
    }

    pub fn decode_queue(&self) -> &DecodeQueue {
        &self.decode_queue
    }

    pub fn decode_queue_mut(&mut self) -> &mut DecodeQueue {
        &mut self.decode_queue
    }

    /// Producer-side handle to the input queue.
    pub fn input(&self) -> &InputQueue {
        &self.input
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn scan_index(&self) -> usize {
        self.scan_index
    }

    /// Counters accumulated over every pass.
    pub fn stats(&self) -> SyncStats {
        self.totals
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

impl std::fmt::Debug for FrameSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSynchronizer")
            .field("state", &self.state)
            .field("scan_index", &self.scan_index)
            .field("decode_queue", &self.decode_queue.len())
            .finish()
    }
}
