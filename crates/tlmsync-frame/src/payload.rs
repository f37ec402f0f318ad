use crate::error::{FrameError, Result};

/// Width of one record inside a frame body.
pub const RECORD_LEN: usize = 10;

/// Offset of the 4-byte value field within a record.
pub const VALUE_OFFSET: usize = 3;

/// Narrow an unsigned byte code into the signed storage representation.
///
/// Applied exactly once per byte when a frame body leaves the input queue.
pub const fn to_stored(code: u8) -> i8 {
    (code as i16 - 128) as i8
}

/// Recover the unsigned byte code from its signed storage representation.
///
/// Applied exactly once per byte whenever a record field is read.
pub const fn to_code(stored: i8) -> u8 {
    (stored as i16 + 128) as u8
}

/// A validated frame body awaiting decode.
///
/// Always a positive whole number of records, held in signed storage form.
#[derive(Clone, PartialEq, Eq)]
pub struct RawPayload {
    stored: Box<[i8]>,
}

impl RawPayload {
    /// Build a payload from unsigned byte codes, applying the storage transform.
    pub fn from_codes(codes: &[u8]) -> Result<Self> {
        if codes.is_empty() || codes.len() % RECORD_LEN != 0 {
            return Err(FrameError::MisalignedPayload { len: codes.len() });
        }
        Ok(Self {
            stored: codes.iter().map(|&code| to_stored(code)).collect(),
        })
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.stored.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    /// The signed storage bytes.
    pub fn as_stored(&self) -> &[i8] {
        &self.stored
    }

    /// Number of records in the body.
    pub fn record_count(&self) -> usize {
        self.stored.len() / RECORD_LEN
    }

    /// Iterate over the records in wire order.
    pub fn records(&self) -> impl ExactSizeIterator<Item = Record<'_>> + '_ {
        self.stored.chunks_exact(RECORD_LEN).map(|stored| Record { stored })
    }

    /// Reconstruct the original unsigned byte codes.
    pub fn to_codes(&self) -> Vec<u8> {
        self.stored.iter().map(|&b| to_code(b)).collect()
    }
}

impl std::fmt::Debug for RawPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawPayload")
            .field("len", &self.stored.len())
            .field("records", &self.record_count())
            .finish()
    }
}

/// One 10-byte record view.
///
/// Layout: `[id_hi, id_lo, function, v0, v1, v2, v3, _, _, _]`.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    stored: &'a [i8],
}

impl Record<'_> {
    /// Byte code at `index` within the record.
    pub fn code(&self, index: usize) -> Option<u8> {
        self.stored.get(index).map(|&b| to_code(b))
    }

    /// Source identifier: `(code(0) << 4) | code(1)`.
    ///
    /// The low byte is OR-ed in at full width, so values above 15 overlap the
    /// shifted high byte. Senders rely on this exact combination.
    pub fn identifier(&self) -> u16 {
        (u16::from(to_code(self.stored[0])) << 4) | u16::from(to_code(self.stored[1]))
    }

    /// Function code selecting the quantity within the identifier's domain.
    pub fn function(&self) -> u8 {
        to_code(self.stored[2])
    }

    /// Four reconstructed bytes starting at `offset`, if they fit.
    pub fn word(&self, offset: usize) -> Option<[u8; 4]> {
        let end = offset.checked_add(4)?;
        let bytes = self.stored.get(offset..end)?;
        Some([
            to_code(bytes[0]),
            to_code(bytes[1]),
            to_code(bytes[2]),
            to_code(bytes[3]),
        ])
    }

    /// Big-endian IEEE-754 single at `offset`.
    pub fn f32_be(&self, offset: usize) -> Option<f32> {
        self.word(offset).map(f32::from_be_bytes)
    }

    /// Big-endian unsigned 32-bit integer at `offset`.
    pub fn u32_be(&self, offset: usize) -> Option<u32> {
        self.word(offset).map(u32::from_be_bytes)
    }

    /// Big-endian signed 32-bit integer at `offset`.
    pub fn i32_be(&self, offset: usize) -> Option<i32> {
        self.word(offset).map(i32::from_be_bytes)
    }

    /// All ten reconstructed byte codes.
    pub fn codes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        for (dst, &src) in out.iter_mut().zip(self.stored) {
            *dst = to_code(src);
        }
        out
    }
}
