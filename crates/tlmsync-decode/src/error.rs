/// Errors that can occur while building a decode table.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The table definition is not valid JSON for the expected shape.
    #[error("invalid decode table: {0}")]
    Json(#[from] serde_json::Error),

    /// The table file could not be read.
    #[error("failed to load decode table: {0}")]
    LoadFailed(String),

    /// Two entries map the same `(identifier, function)` pair.
    #[error("duplicate decode entry for identifier {identifier}, function {function}")]
    DuplicateEntry { identifier: u16, function: u8 },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
