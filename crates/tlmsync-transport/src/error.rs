/// Errors that can occur while moving bytes into the input queue.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying reader.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reader reached end of stream.
    #[error("input stream closed")]
    Closed,

    /// The requested queue capacity cannot hold a single marker.
    #[error("input queue capacity too small ({requested} bytes, min {min})")]
    CapacityTooSmall { requested: usize, min: usize },
}

pub type Result<T> = std::result::Result<T, TransportError>;
