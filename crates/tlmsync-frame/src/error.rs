/// Errors raised when building payloads, encoding frames, or validating config.
///
/// The synchronizer itself never returns these for corrupt input; see
/// [`SyncStats`](crate::SyncStats) for how corruption is reported.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload is empty or not a whole number of records.
    #[error("payload length {len} is not a positive multiple of 10")]
    MisalignedPayload { len: usize },

    /// Encoded record bytes would be read back as a marker.
    #[error("marker sequence inside frame body at offset {offset}")]
    MarkerInPayload { offset: usize },

    /// A configuration value is out of range.
    #[error("invalid sync config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
