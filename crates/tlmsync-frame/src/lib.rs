//! Marker-delimited frame synchronization for serial telemetry.
//!
//! This is the core of tlmsync. The wire format is:
//! - A fixed 10-byte marker `FF FF FF FF FE FE FF FF FF FF` between frames
//! - A frame body made of fixed 10-byte records
//!
//! [`FrameSynchronizer`] scans the shared input queue for consecutive
//! markers, validates the region between them, and hands well-formed bodies
//! to a bounded [`DecodeQueue`] as [`RawPayload`]s. Corruption is never an
//! error here; damaged frames are dropped and the scanner resynchronizes.

pub mod codec;
pub mod config;
pub mod error;
pub mod marker;
pub mod payload;
pub mod queue;
pub mod sync;

pub use codec::{encode_frame, encode_stream, RecordSpec};
pub use config::{SyncConfig, DEFAULT_MAX_CHECK_SIZE};
pub use error::{FrameError, Result};
pub use marker::{is_marker, scan_step, MarkerState, MARKER, MARKER_LEN};
pub use payload::{to_code, to_stored, RawPayload, Record, RECORD_LEN, VALUE_OFFSET};
pub use queue::{DecodeQueue, DEFAULT_DECODE_QUEUE_CAPACITY};
pub use sync::{FrameSynchronizer, SyncState, SyncStats};
