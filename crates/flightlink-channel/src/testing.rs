//! In-process transport over socket pairs.

use std::io;
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use flightlink_frame::{Frame, FrameReader, FrameWriter};
use flightlink_transport::{Result as TransportResult, Transport, TransportError};

/// Each `connect` creates a fresh socket pair and hands the far end to the
/// test through a channel.
pub(crate) struct PairTransport {
    remotes: mpsc::Sender<UnixStream>,
    control: Option<UnixStream>,
    connects: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
}

impl PairTransport {
    pub(crate) fn new() -> (Self, mpsc::Receiver<UnixStream>) {
        let (tx, rx) = mpsc::channel();
        let transport = Self {
            remotes: tx,
            control: None,
            connects: Arc::new(AtomicUsize::new(0)),
            refuse: Arc::new(AtomicBool::new(false)),
        };
        (transport, rx)
    }

    /// While set, `connect` fails as if the peer refused.
    pub(crate) fn refuse_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.refuse)
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Transport for PairTransport {
    type Reader = UnixStream;
    type Writer = UnixStream;

    fn connect(&mut self) -> TransportResult<(UnixStream, UnixStream)> {
        self.disconnect();
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Connect {
                addr: self.describe(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }

        let (near, far) = UnixStream::pair()?;
        self.remotes.send(far).map_err(|_| TransportError::Closed)?;
        let reader = near.try_clone()?;
        let writer = near.try_clone()?;
        self.control = Some(near);
        Ok((reader, writer))
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.control.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn describe(&self) -> String {
        "pair".to_string()
    }
}

/// The vehicle side of one socket pair.
pub(crate) struct RemoteEnd {
    stream: UnixStream,
    reader: FrameReader<UnixStream>,
    writer: FrameWriter<UnixStream>,
}

impl RemoteEnd {
    pub(crate) fn accept(remotes: &mpsc::Receiver<UnixStream>) -> Self {
        let stream = remotes
            .recv_timeout(Duration::from_secs(5))
            .expect("channel should open a link");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout should apply");
        let reader = FrameReader::new(stream.try_clone().expect("stream should clone"));
        let writer = FrameWriter::new(stream.try_clone().expect("stream should clone"));
        Self {
            stream,
            reader,
            writer,
        }
    }

    pub(crate) fn read(&mut self) -> flightlink_frame::Result<Frame> {
        self.reader.read_frame()
    }

    pub(crate) fn send(&mut self, frame: &Frame) {
        self.writer.write_frame(frame).expect("remote write should succeed");
    }

    pub(crate) fn send_raw(&mut self, bytes: &[u8]) {
        use std::io::Write;
        self.writer
            .get_mut()
            .write_all(bytes)
            .expect("remote write should succeed");
    }

    /// Refuse further inbound bytes so the channel's next write fails.
    pub(crate) fn stop_reading(&self) {
        self.stream
            .shutdown(Shutdown::Read)
            .expect("shutdown should succeed");
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub(crate) fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
