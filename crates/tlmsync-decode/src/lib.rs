//! Table-driven decoding of telemetry records.
//!
//! Each 10-byte record names a source identifier and a function code. A
//! [`DecodeTable`] maps the recognized `(identifier, function)` pairs to a
//! field layout and a reading name; everything else is ignored. Decoded
//! values are handed to a [`TelemetrySink`], the only contact point with
//! whatever stores or displays them.

pub mod decoder;
pub mod error;
pub mod reading;
pub mod table;

pub use decoder::{DecodeReport, RecordDecoder};
pub use error::{DecodeError, Result};
pub use reading::{LatestReadings, Reading, ReadingValue, SinkFn, TelemetrySink};
pub use table::{DecodeDescriptor, DecodeTable, FieldLayout, ValueFormat, MAX_TABLE_FILE_SIZE};
