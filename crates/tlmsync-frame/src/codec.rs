use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::marker::{is_marker, MARKER, MARKER_LEN};
use crate::payload::RECORD_LEN;

/// One record as a sender would put it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpec {
    pub id_hi: u8,
    pub id_lo: u8,
    pub function: u8,
    pub value: [u8; 4],
    pub trailer: [u8; 3],
}

impl RecordSpec {
    /// A record carrying a big-endian IEEE-754 single.
    pub fn float(id_hi: u8, id_lo: u8, function: u8, value: f32) -> Self {
        Self::raw(id_hi, id_lo, function, value.to_be_bytes())
    }

    /// A record with an arbitrary 4-byte value field and zeroed trailer.
    pub fn raw(id_hi: u8, id_lo: u8, function: u8, value: [u8; 4]) -> Self {
        Self {
            id_hi,
            id_lo,
            function,
            value,
            trailer: [0; 3],
        }
    }

    /// The record's ten wire bytes.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let [v0, v1, v2, v3] = self.value;
        let [t0, t1, t2] = self.trailer;
        [
            self.id_hi,
            self.id_lo,
            self.function,
            v0,
            v1,
            v2,
            v3,
            t0,
            t1,
            t2,
        ]
    }
}

/// Encode one frame: leading marker, records, trailing marker.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬─────┬──────────────┬──────────────┐
/// │ Marker (10B) │ Record (10B) │ ... │ Record (10B) │ Marker (10B) │
/// └──────────────┴──────────────┴─────┴──────────────┴──────────────┘
/// ```
pub fn encode_frame(records: &[RecordSpec], dst: &mut BytesMut) -> Result<()> {
    encode_stream(&[records], dst)
}

/// Encode consecutive frames sharing their delimiting markers (`M f1 M f2 M`).
///
/// Fails without writing anything if a frame is empty or its bytes would
/// produce a marker match before the real closing marker.
pub fn encode_stream(frames: &[&[RecordSpec]], dst: &mut BytesMut) -> Result<()> {
    let body_len: usize = frames.iter().map(|f| f.len() * RECORD_LEN).sum();
    let mut out = BytesMut::with_capacity(MARKER_LEN * (frames.len() + 1) + body_len);
    out.put_slice(&MARKER);

    for records in frames {
        if records.is_empty() {
            return Err(FrameError::MisalignedPayload { len: 0 });
        }
        let start = out.len();
        for record in records.iter() {
            out.put_slice(&record.to_bytes());
        }
        out.put_slice(&MARKER);
        check_body(&out, start)?;
    }

    dst.extend_from_slice(&out);
    Ok(())
}

/// The receiver scans from the end of the opening marker; any marker match
/// before the closing one would split the frame.
fn check_body(out: &[u8], body_start: usize) -> Result<()> {
    let closing = out.len() - MARKER_LEN;
    for index in body_start..closing {
        if is_marker(&out[index..]) {
            return Err(FrameError::MarkerInPayload {
                offset: index - body_start,
            });
        }
    }
    Ok(())
}
