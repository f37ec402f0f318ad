use tlmsync_transport::InputGuard;

/// Width of the frame marker in bytes.
pub const MARKER_LEN: usize = 10;

/// Frame delimiter. Senders guarantee it never appears inside a frame body.
pub const MARKER: [u8; MARKER_LEN] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Outcome of checking one queue position for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    /// The ten bytes at the position are not a marker.
    NotMarker,
    /// The ten bytes at the position are a marker.
    IsMarker,
    /// Fewer than ten bytes are buffered from the position; wait for more.
    EndOfBuffer,
}

/// Check whether a marker starts at `index` in the locked input queue.
pub fn scan_step(queue: &InputGuard<'_>, index: usize) -> MarkerState {
    match index.checked_add(MARKER_LEN) {
        Some(end) if end <= queue.len() => {}
        _ => return MarkerState::EndOfBuffer,
    }

    let matches = MARKER
        .iter()
        .enumerate()
        .all(|(offset, &expected)| queue.get(index + offset) == Some(expected));

    if matches {
        MarkerState::IsMarker
    } else {
        MarkerState::NotMarker
    }
}

/// Returns true if `bytes` starts with the marker.
pub fn is_marker(bytes: &[u8]) -> bool {
    bytes.len() >= MARKER_LEN && bytes[..MARKER_LEN] == MARKER
}
