use std::io::{ErrorKind, Read};

use crate::codec::{Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::scanner::{ScanStats, Scanner};

const READ_CHUNK_SIZE: usize = 512;

/// Reads validated frames from any `Read` stream.
///
/// Handles partial reads and resynchronization internally; callers always
/// get complete frames whose checksum has been verified.
pub struct FrameReader<T> {
    inner: T,
    scanner: Scanner,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            scanner: Scanner::with_config(config),
        }
    }

    /// Read the next valid frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` once EOF is reached and no
    /// complete frame is left in the buffer.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.scanner.next_frame() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return self.scanner.finish().ok_or(FrameError::ConnectionClosed);
            }

            self.scanner.push(&chunk[..read]);
        }
    }

    /// Scanner counters (frames, discarded bytes, rejections).
    pub fn stats(&self) -> ScanStats {
        self.scanner.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.scanner.config()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::kind::{COMMAND_DATA, GROUND_REPORT, SENSOR_DATA, TRACE_DATA};
    use crate::writer::FrameWriter;

    fn wire(kind: u8, payload: &[u8]) -> Vec<u8> {
        Frame::new(kind, payload.to_vec()).unwrap().to_bytes().to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(COMMAND_DATA, b"hello!!!")));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.kind(), COMMAND_DATA);
        assert_eq!(frame.payload().as_ref(), b"hello!!!");
    }

    #[test]
    fn read_multiple_frames() {
        let mut bytes = wire(1, b"one");
        bytes.extend(wire(2, b"two"));
        bytes.extend(wire(3, b"three"));

        let mut reader = FrameReader::new(Cursor::new(bytes));

        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();
        let f3 = reader.read_frame().unwrap();

        assert_eq!((f1.kind(), f1.payload().as_ref()), (1, b"one".as_ref()));
        assert_eq!((f2.kind(), f2.payload().as_ref()), (2, b"two".as_ref()));
        assert_eq!((f3.kind(), f3.payload().as_ref()), (3, b"three".as_ref()));
        assert!(matches!(reader.read_frame(), Err(FrameError::ConnectionClosed)));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(TRACE_DATA, &[0x11; 32]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.kind(), TRACE_DATA);
        assert_eq!(frame.payload().as_ref(), &[0x11; 32]);
    }

    #[test]
    fn corrupted_bytes_between_frames_are_skipped() {
        let mut bytes = wire(COMMAND_DATA, &[0, 100, 255, 206, 0, 0, 0, 200]);
        bytes.extend([0x00, 0x42, 0xFF, 0x10, 0x99, 0xFE, 0x7F, 0xFF, 0x33]);
        bytes.extend(wire(GROUND_REPORT, &[0x5A; 62]));

        let byte_reader = ByteByByteReader { bytes, pos: 0 };
        let mut reader = FrameReader::new(byte_reader);

        let first = reader.read_frame().unwrap();
        let second = reader.read_frame().unwrap();
        assert_eq!(first.kind(), COMMAND_DATA);
        assert_eq!(second.kind(), GROUND_REPORT);
        assert_eq!(second.payload().len(), 62);
        assert!(matches!(reader.read_frame(), Err(FrameError::ConnectionClosed)));
        assert_eq!(reader.stats().frames, 2);
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let bytes = wire(SENSOR_DATA, &[1; 42]);
        let mut reader = FrameReader::new(Cursor::new(bytes[..20].to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn garbage_only_stream_closes() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x01, 0xFF, 0x02, 0xFF, 0xFF, 0x40]));
        assert!(matches!(reader.read_frame(), Err(FrameError::ConnectionClosed)));
        assert_eq!(reader.stats().frames, 0);
        assert_eq!(reader.stats().invalid_kinds, 1);
    }

    #[test]
    fn would_block_surfaces_as_io_error() {
        let mut framed = FrameReader::new(FailOnce::new(ErrorKind::WouldBlock, wire(7, b"ok")));
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));

        // The stream is still usable once the caller retries.
        assert_eq!(framed.read_frame().unwrap().payload().as_ref(), b"ok");
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut framed = FrameReader::new(FailOnce::new(ErrorKind::Interrupted, wire(8, b"ok")));
        let frame = framed.read_frame().unwrap();

        assert_eq!(frame.kind(), 8);
        assert_eq!(frame.payload().as_ref(), b"ok");
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.send(COMMAND_DATA, &[0, 1, 0, 2, 0, 3, 0, 4]).unwrap();
        writer.send(SENSOR_DATA, &[9; 42]).unwrap();

        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();
        assert_eq!(f1.kind(), COMMAND_DATA);
        assert_eq!(f2.payload().as_ref(), &[9; 42]);
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.config(), &FrameConfig::default());
        let _inner = reader.into_inner();
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Fails the first read with `error`, then serves `bytes`.
    struct FailOnce {
        error: Option<ErrorKind>,
        bytes: Cursor<Vec<u8>>,
    }

    impl FailOnce {
        fn new(error: ErrorKind, bytes: Vec<u8>) -> Self {
            Self {
                error: Some(error),
                bytes: Cursor::new(bytes),
            }
        }
    }

    impl Read for FailOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.error.take() {
                Some(kind) => Err(std::io::Error::from(kind)),
                None => self.bytes.read(buf),
            }
        }
    }
}
