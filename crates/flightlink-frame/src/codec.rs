use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum;
use crate::error::{FrameError, Result};
use crate::kind;

/// Marker byte; a frame starts with two of them.
pub const MARKER: u8 = 0xFF;

/// Frame header: marker (2) + kind (1) + size (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Checksum trailer: 2 bytes, big-endian.
pub const TRAILER_SIZE: usize = 2;

/// Bytes of framing around every payload.
pub const OVERHEAD: usize = HEADER_SIZE + TRAILER_SIZE;

/// Default maximum payload size.
pub const DEFAULT_MAX_PAYLOAD: usize = 64;

/// Largest payload the length byte may announce (a non-negative signed byte).
pub const MAX_WIRE_PAYLOAD: usize = 127;

/// Highest kind accepted by default.
pub const DEFAULT_MAX_KIND: u8 = kind::KIND_LIMIT;

/// One framed message.
///
/// The checksum is computed on construction. Replacing the payload through
/// [`Frame::set_payload`] leaves the stored checksum stale until
/// [`Frame::calc_checksum`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: u8,
    payload: Bytes,
    checksum: u16,
}

impl Frame {
    /// Create a frame and compute its checksum.
    pub fn new(kind: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        check_payload_len(payload.len())?;
        let mut frame = Self {
            kind,
            payload,
            checksum: 0,
        };
        frame.calc_checksum();
        Ok(frame)
    }

    /// Create a frame with an empty payload (bare requests).
    pub fn empty(kind: u8) -> Self {
        Self {
            kind,
            payload: Bytes::new(),
            checksum: checksum::compute(kind, 0, &[], 0),
        }
    }

    /// Build a frame from bytes whose checksum has already been validated.
    ///
    /// The checksum is stored as given; the payload length is still bounded.
    pub fn from_wire(kind: u8, payload: Bytes, checksum: u16) -> Result<Self> {
        check_payload_len(payload.len())?;
        Ok(Self {
            kind,
            payload,
            checksum,
        })
    }

    /// Message kind code.
    pub fn kind(&self) -> u8 {
        self.kind
    }

    /// Payload length as carried in the length byte.
    pub fn size(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Stored checksum.
    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    /// Replace the payload. The stored checksum is not updated.
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        let payload = payload.into();
        check_payload_len(payload.len())?;
        self.payload = payload;
        Ok(())
    }

    /// Recompute and store the checksum over kind, size and payload.
    pub fn calc_checksum(&mut self) -> u16 {
        self.checksum = self.expected_checksum();
        self.checksum
    }

    /// Whether the stored checksum matches the current contents.
    pub fn is_checksum_valid(&self) -> bool {
        self.checksum == self.expected_checksum()
    }

    /// The total wire size of this frame (overhead + payload).
    pub fn wire_size(&self) -> usize {
        OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self, &mut dst);
        dst.freeze()
    }

    fn expected_checksum(&self) -> u16 {
        checksum::compute(self.kind, self.size(), &self.payload, 0)
    }
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_WIRE_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: MAX_WIRE_PAYLOAD,
        });
    }
    Ok(())
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬────────┬────────┬─────────────┬───────────────┐
/// │ Marker (2B)  │ Kind   │ Size   │ Payload     │ Checksum      │
/// │ 0xFF 0xFF    │ (1B)   │ (1B)   │ (Size B)    │ (2B BE)       │
/// └──────────────┴────────┴────────┴─────────────┴───────────────┘
/// ```
///
/// The stored checksum is written as-is.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(frame.wire_size());
    dst.put_u8(MARKER);
    dst.put_u8(MARKER);
    dst.put_u8(frame.kind);
    dst.put_u8(frame.size());
    if !frame.payload.is_empty() {
        dst.put_slice(&frame.payload);
    }
    dst.put_u16(frame.checksum);
}

/// Decode one frame from the head of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. Framing errors leave
/// the buffer untouched so the caller can decide how to resynchronize.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Frame>> {
    if src.is_empty() {
        return Ok(None);
    }
    if src[0] != MARKER {
        return Err(FrameError::InvalidMarker);
    }
    if src.len() < 2 {
        return Ok(None);
    }
    if src[1] != MARKER {
        return Err(FrameError::InvalidMarker);
    }
    if src.len() < 3 {
        return Ok(None);
    }

    let kind = src[2];
    if !config.accepts_kind(kind) {
        return Err(FrameError::InvalidKind(kind));
    }
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let size = src[3];
    let payload_len = usize::from(size);
    if payload_len > config.payload_limit() {
        return Err(FrameError::InvalidLength {
            size: payload_len,
            max: config.payload_limit(),
        });
    }

    let total = OVERHEAD + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let expected = checksum::compute(kind, size, &src[..], HEADER_SIZE);
    let trailer = HEADER_SIZE + payload_len;
    let received = u16::from_be_bytes([src[trailer], src[trailer + 1]]);
    if expected != received {
        return Err(FrameError::ChecksumMismatch {
            kind,
            expected,
            received,
        });
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    src.advance(TRAILER_SIZE);

    Ok(Some(Frame::from_wire(kind, payload, received)?))
}

/// Offline validation of a buffer holding one frame at its start.
///
/// True iff the buffer starts with the marker, the trailer implied by the
/// length byte lies inside the buffer, and the trailer matches the checksum
/// computed over header and payload.
pub fn checks_out(buffer: &[u8]) -> bool {
    if buffer.len() < OVERHEAD || buffer[0] != MARKER || buffer[1] != MARKER {
        return false;
    }
    let kind = buffer[2];
    let size = buffer[3];
    let trailer = HEADER_SIZE + usize::from(size);
    if trailer + TRAILER_SIZE > buffer.len() {
        return false;
    }
    let received = u16::from_be_bytes([buffer[trailer], buffer[trailer + 1]]);
    received == checksum::compute(kind, size, buffer, HEADER_SIZE)
}

/// Configuration for frame decoding and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 64. Capped at 127.
    pub max_payload_size: usize,
    /// Highest accepted kind code. Default: 0x16.
    pub max_kind: u8,
}

impl FrameConfig {
    /// Effective payload ceiling.
    pub fn payload_limit(&self) -> usize {
        self.max_payload_size.min(MAX_WIRE_PAYLOAD)
    }

    /// Whether `kind` is inside the accepted range.
    pub fn accepts_kind(&self, kind: u8) -> bool {
        kind::in_range(kind, self.max_kind)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            max_kind: DEFAULT_MAX_KIND,
        }
    }
}
