//! Streaming frame synchronizer and record decoder for serial telemetry.
//!
//! tlmsync turns an unbounded byte stream into named telemetry readings:
//! reader → input queue → frame synchronizer → decode queue → record
//! decoder → your [`TelemetrySink`](decode::TelemetrySink).
//!
//! # Crate Structure
//!
//! - [`transport`]: Shared input queue and stream pump
//! - [`frame`]: Marker search, payload extraction, decode queue
//! - [`decode`]: Decode table, readings, record decoder
//! - [`Pipeline`]: One synchronizer and decoder driven by a single `tick`

pub mod pipeline;

pub use pipeline::{Pipeline, TickReport};

/// Re-export transport types.
pub mod transport {
    pub use tlmsync_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use tlmsync_frame::*;
}

/// Re-export decode types.
pub mod decode {
    pub use tlmsync_decode::*;
}
