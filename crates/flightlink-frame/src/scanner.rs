use bytes::{Buf, BytesMut};
use tracing::{debug, warn};

use crate::codec::{decode_frame, Frame, FrameConfig, MARKER};
use crate::error::FrameError;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Counters for what a scanner has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Frames that passed validation.
    pub frames: u64,
    /// Bytes dropped while hunting for a marker or after a rejected header.
    pub discarded_bytes: u64,
    /// Marker byte not followed by a second marker byte.
    pub invalid_markers: u64,
    /// Kind byte outside the accepted range.
    pub invalid_kinds: u64,
    /// Length byte above the payload ceiling.
    pub invalid_lengths: u64,
    /// Complete frames whose trailer did not match.
    pub checksum_mismatches: u64,
}

/// Resynchronizing frame scanner over an owned buffer.
///
/// Bytes go in through [`Scanner::push`]; validated frames come out of
/// [`Scanner::next_frame`]. Garbage is never fatal: any rejected frame
/// attempt drops its first marker byte and scanning resumes right behind it,
/// so a good frame hiding behind a bogus header is still found.
#[derive(Debug)]
pub struct Scanner {
    buf: BytesMut,
    config: FrameConfig,
    stats: ScanStats,
}

impl Scanner {
    /// Create a scanner with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a scanner with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            stats: ScanStats::default(),
        }
    }

    /// Append received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next validated frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Frame> {
        scan(&mut self.buf, &self.config, &mut self.stats)
    }

    /// Drain what is left at end of stream.
    ///
    /// Keeps yielding frames that are still complete inside the buffer; once
    /// none remain the buffer is emptied and `None` is returned.
    pub fn finish(&mut self) -> Option<Frame> {
        scan_eof(&mut self.buf, &self.config, &mut self.stats)
    }

    /// Bytes buffered but not yet consumed.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Counters since creation.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Drop buffered bytes, e.g. after the underlying link was replaced.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan `buf` for the next valid frame, resynchronizing past bad input.
pub(crate) fn scan(buf: &mut BytesMut, config: &FrameConfig, stats: &mut ScanStats) -> Option<Frame> {
    loop {
        skip_to_marker(buf, stats);
        match decode_frame(buf, config) {
            Ok(Some(frame)) => {
                stats.frames += 1;
                return Some(frame);
            }
            Ok(None) => return None,
            Err(err) => reject(buf, &err, stats),
        }
    }
}

/// Like [`scan`], but treats a trailing partial frame as garbage.
pub(crate) fn scan_eof(
    buf: &mut BytesMut,
    config: &FrameConfig,
    stats: &mut ScanStats,
) -> Option<Frame> {
    loop {
        if let Some(frame) = scan(buf, config, stats) {
            return Some(frame);
        }
        if buf.is_empty() {
            return None;
        }
        debug!(pending = buf.len(), "truncated frame at end of stream");
        buf.advance(1);
        stats.discarded_bytes += 1;
    }
}

fn skip_to_marker(buf: &mut BytesMut, stats: &mut ScanStats) {
    let skip = buf
        .iter()
        .position(|&byte| byte == MARKER)
        .unwrap_or(buf.len());
    if skip > 0 {
        debug!(skipped = skip, "discarding bytes before frame marker");
        buf.advance(skip);
        stats.discarded_bytes += skip as u64;
    }
}

fn reject(buf: &mut BytesMut, err: &FrameError, stats: &mut ScanStats) {
    match err {
        FrameError::InvalidMarker => stats.invalid_markers += 1,
        FrameError::InvalidKind(kind) => {
            debug!(kind, "rejecting frame with out-of-range kind");
            stats.invalid_kinds += 1;
        }
        FrameError::InvalidLength { size, max } => {
            debug!(size, max, "rejecting frame with invalid length");
            stats.invalid_lengths += 1;
        }
        FrameError::ChecksumMismatch {
            kind,
            expected,
            received,
        } => {
            warn!(kind, expected, received, "checksum mismatch; resynchronizing");
            stats.checksum_mismatches += 1;
        }
        other => debug!(error = %other, "rejecting frame"),
    }
    buf.advance(1);
    stats.discarded_bytes += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{COMMAND_DATA, MODE_STATE, SENSOR_DATA, SHUT_DOWN};

    fn wire(kind: u8, payload: &[u8]) -> Vec<u8> {
        Frame::new(kind, payload.to_vec()).unwrap().to_bytes().to_vec()
    }

    #[test]
    fn yields_frames_in_order() {
        let mut scanner = Scanner::new();
        scanner.push(&wire(COMMAND_DATA, &[1, 2, 3, 4]));
        scanner.push(&wire(SENSOR_DATA, &[5; 10]));

        let first = scanner.next_frame().unwrap();
        let second = scanner.next_frame().unwrap();
        assert_eq!(first.kind(), COMMAND_DATA);
        assert_eq!(second.kind(), SENSOR_DATA);
        assert!(scanner.next_frame().is_none());
        assert_eq!(scanner.stats().frames, 2);
        assert_eq!(scanner.pending(), 0);
    }

    #[test]
    fn waits_for_split_frames() {
        let bytes = wire(COMMAND_DATA, &[9; 8]);
        let mut scanner = Scanner::new();
        for byte in &bytes[..bytes.len() - 1] {
            scanner.push(&[*byte]);
            assert!(scanner.next_frame().is_none());
        }
        scanner.push(&bytes[bytes.len() - 1..]);
        assert_eq!(scanner.next_frame().unwrap().payload().as_ref(), &[9; 8]);
    }

    #[test]
    fn skips_leading_garbage() {
        let mut scanner = Scanner::new();
        scanner.push(&[0x00, 0x13, 0x37, 0xFE]);
        scanner.push(&wire(MODE_STATE, &[2, 1]));

        let frame = scanner.next_frame().unwrap();
        assert_eq!(frame.kind(), MODE_STATE);
        assert_eq!(scanner.stats().discarded_bytes, 4);
    }

    #[test]
    fn resyncs_between_frames() {
        let mut scanner = Scanner::new();
        scanner.push(&wire(COMMAND_DATA, &[0, 100, 255, 206, 0, 0, 0, 200]));
        scanner.push(&[0x12, 0xFF, 0x01, 0x99, 0xFF, 0x00, 0x7E, 0x42, 0xFF]);
        scanner.push(&wire(SENSOR_DATA, &[1; 42]));

        let first = scanner.next_frame().unwrap();
        let second = scanner.next_frame().unwrap();
        assert_eq!(first.kind(), COMMAND_DATA);
        assert_eq!(second.kind(), SENSOR_DATA);
        assert!(scanner.next_frame().is_none());
        assert_eq!(scanner.stats().frames, 2);
    }

    /// Deterministic xorshift source for junk streams.
    struct Junk(u64);

    impl Junk {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn below(&mut self, n: usize) -> usize {
            (self.next() % n as u64) as usize
        }

        /// Half the bytes are the marker so fake headers are common.
        fn bytes(&mut self, len: usize) -> Vec<u8> {
            (0..len)
                .map(|_| {
                    let r = self.next();
                    if r & 1 == 0 {
                        MARKER
                    } else {
                        (r >> 8) as u8
                    }
                })
                .collect()
        }
    }

    #[test]
    fn resyncs_across_generated_junk() {
        let frames = [
            wire(COMMAND_DATA, &[0, 100, 255, 206, 0, 0, 0, 200]),
            wire(MODE_STATE, &[2, 1]),
            wire(SENSOR_DATA, &[1; 42]),
            wire(SHUT_DOWN, &[]),
        ];
        let mut junk = Junk(0x9E37_79B9_7F4A_7C15);

        for case in 0..200 {
            let mut stream = Vec::new();
            let mut expected = Vec::new();
            for _ in 0..3 {
                let len = junk.below(32);
                stream.extend(junk.bytes(len));
                let frame = &frames[junk.below(frames.len())];
                stream.extend_from_slice(frame);
                expected.push(frame.clone());
            }
            let len = junk.below(32);
            stream.extend(junk.bytes(len));

            let mut scanner = Scanner::new();
            let mut found = Vec::new();
            let mut rest = stream.as_slice();
            while !rest.is_empty() {
                let (chunk, tail) = rest.split_at((junk.below(16) + 1).min(rest.len()));
                rest = tail;
                scanner.push(chunk);
                while let Some(frame) = scanner.next_frame() {
                    found.push(frame.to_bytes().to_vec());
                }
            }
            while let Some(frame) = scanner.finish() {
                found.push(frame.to_bytes().to_vec());
            }

            // Every real frame comes out, in order; junk may add extras.
            let mut found = found.iter();
            for frame in &expected {
                assert!(found.any(|f| f == frame), "case {case}: frame lost in {stream:02X?}");
            }
            assert_eq!(scanner.pending(), 0);
        }
    }

    #[test]
    fn bogus_header_does_not_swallow_following_frame() {
        // A marker + valid kind + long length directly in front of a real frame.
        let mut scanner = Scanner::new();
        scanner.push(&[0xFF, 0xFF, SENSOR_DATA, 40]);
        scanner.push(&wire(COMMAND_DATA, &[7; 8]));
        scanner.push(&[0u8; 40]);

        let frame = scanner.next_frame().unwrap();
        assert_eq!(frame.kind(), COMMAND_DATA);
        assert_eq!(scanner.stats().checksum_mismatches, 1);
    }

    #[test]
    fn checksum_mismatch_is_counted_and_skipped() {
        let mut corrupted = wire(COMMAND_DATA, &[1, 2, 3, 4]);
        corrupted[5] ^= 0x10;

        let mut scanner = Scanner::new();
        scanner.push(&corrupted);
        scanner.push(&wire(MODE_STATE, &[0, 3]));

        let frame = scanner.next_frame().unwrap();
        assert_eq!(frame.kind(), MODE_STATE);
        assert_eq!(scanner.stats().checksum_mismatches, 1);
        assert_eq!(scanner.stats().frames, 1);
    }

    #[test]
    fn invalid_kind_and_length_are_counted() {
        let mut scanner = Scanner::new();
        scanner.push(&[0xFF, 0xFF, 0x55, 0x00]);
        scanner.push(&[0xFF, 0xFF, 0x01, 0x70]);
        scanner.push(&wire(SENSOR_DATA, &[]));

        let frame = scanner.next_frame().unwrap();
        assert_eq!(frame.kind(), SENSOR_DATA);
        let stats = scanner.stats();
        assert_eq!(stats.invalid_kinds, 1);
        assert_eq!(stats.invalid_lengths, 1);
    }

    #[test]
    fn marker_run_before_frame_is_tolerated() {
        let mut scanner = Scanner::new();
        scanner.push(&[0xFF, 0xFF, 0xFF, 0xFF]);
        scanner.push(&wire(COMMAND_DATA, &[0; 8]));

        assert_eq!(scanner.next_frame().unwrap().kind(), COMMAND_DATA);
    }

    #[test]
    fn finish_recovers_frames_behind_truncated_header() {
        let mut scanner = Scanner::new();
        scanner.push(&[0xFF, 0xFF, SENSOR_DATA, 60]);
        scanner.push(&wire(MODE_STATE, &[1, 1]));

        assert!(scanner.next_frame().is_none());
        let frame = scanner.finish().unwrap();
        assert_eq!(frame.kind(), MODE_STATE);
        assert!(scanner.finish().is_none());
        assert_eq!(scanner.pending(), 0);
    }

    #[test]
    fn finish_discards_partial_tail() {
        let bytes = wire(COMMAND_DATA, &[3; 8]);
        let mut scanner = Scanner::new();
        scanner.push(&bytes[..7]);

        assert!(scanner.finish().is_none());
        assert_eq!(scanner.pending(), 0);
        assert_eq!(scanner.stats().discarded_bytes, 7);
    }
}
