use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use flightlink_frame::{Frame, FrameError, FrameReader, FrameWriter, ScanStats};
use flightlink_message::Message;
use flightlink_transport::Transport;
use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::dispatch::{FrameSink, Registry, Route};
use crate::error::{ChannelError, Result};
use crate::state::{lock, ChannelState, HaltSignal};
use crate::stats::{bump, ChannelStats, Counters};

const RECEIVE_THREAD_NAME: &str = "flightlink-rx";

/// The transport plus the reader handoff to the receive thread.
struct Link<T: Transport> {
    transport: T,
    /// Reader of a link opened while the receive thread was still running.
    pending: Option<T::Reader>,
    /// True while a receive thread owns the inbound side.
    receiving: bool,
}

struct Shared<T: Transport> {
    config: ChannelConfig,
    link: Mutex<Link<T>>,
    writer: Mutex<Option<FrameWriter<T::Writer>>>,
    state: Mutex<ChannelState>,
    halt: HaltSignal,
    registry: Mutex<Registry>,
    last_received: Mutex<Option<Frame>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
    counters: Counters,
}

/// Bidirectional channel over a [`Transport`].
///
/// All methods take `&self`; share the channel behind an `Arc` or hand out
/// [`FrameSender`]s to components that only send. Dropping the transceiver
/// terminates it.
pub struct Transceiver<T: Transport> {
    shared: Arc<Shared<T>>,
}

/// Cloneable handle onto a channel's send path.
pub struct FrameSender<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Transceiver<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ChannelConfig::default())
    }

    pub fn with_config(transport: T, config: ChannelConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                link: Mutex::new(Link {
                    transport,
                    pending: None,
                    receiving: false,
                }),
                writer: Mutex::new(None),
                state: Mutex::new(ChannelState::Disconnected),
                halt: HaltSignal::default(),
                registry: Mutex::new(Registry::default()),
                last_received: Mutex::new(None),
                receiver: Mutex::new(None),
                counters: Counters::default(),
            }),
        }
    }

    /// Open the link and start the receive thread if it is not running.
    ///
    /// Clears a previous halt. Connecting while already connected replaces
    /// the link; the running receive thread picks up the new reader.
    pub fn connect(&self) -> Result<()> {
        let shared = &self.shared;
        shared.halt.clear();

        let mut link = lock(&shared.link);
        shared.set_state(ChannelState::Connecting);
        let peer = link.transport.describe();
        let (reader, writer) = match link.transport.connect() {
            Ok(halves) => halves,
            Err(err) => {
                warn!(peer = %peer, error = %err, "connect failed");
                shared.set_state(ChannelState::Disconnected);
                return Err(err.into());
            }
        };
        shared.install_writer(writer);
        shared.set_state(ChannelState::Connected);
        info!(peer = %peer, "connected");

        if link.receiving {
            link.pending = Some(reader);
            return Ok(());
        }

        let worker = Arc::clone(shared);
        let spawned = thread::Builder::new()
            .name(RECEIVE_THREAD_NAME.to_string())
            .spawn(move || receive_loop(worker, reader));
        match spawned {
            Ok(handle) => {
                link.receiving = true;
                *lock(&shared.receiver) = Some(handle);
                Ok(())
            }
            Err(err) => {
                link.transport.disconnect();
                *lock(&shared.writer) = None;
                shared.set_state(ChannelState::Disconnected);
                Err(ChannelError::Spawn(err))
            }
        }
    }

    /// Close the current link.
    ///
    /// The receive thread sees the failed read and, unless the channel is
    /// halted, reconnects after the configured delay.
    pub fn disconnect(&self) {
        let shared = &self.shared;
        let mut link = lock(&shared.link);
        link.pending = None;
        link.transport.disconnect();
        *lock(&shared.writer) = None;
        shared.set_state(ChannelState::Disconnected);
        debug!(peer = %link.transport.describe(), "disconnected");
    }

    /// Stop the channel for good: halt, close the link, join the receive
    /// thread.
    ///
    /// Safe to call from a handler running on the receive thread; the join is
    /// skipped there and the thread exits once the handler returns.
    pub fn terminate(&self) {
        let shared = &self.shared;
        shared.halt.set();
        shared.set_state(ChannelState::Halting);
        {
            let mut link = lock(&shared.link);
            link.pending = None;
            link.transport.disconnect();
            *lock(&shared.writer) = None;
        }

        let handle = lock(&shared.receiver).take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                debug!("terminate called on the receive thread; not joining");
            } else if handle.join().is_err() {
                warn!("receive thread panicked");
            }
        }
        shared.set_state(ChannelState::Disconnected);
        info!("channel terminated");
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Connected
    }

    pub fn state(&self) -> ChannelState {
        *lock(&self.shared.state)
    }

    /// Write and flush one frame under the channel's send lock.
    ///
    /// A frame with a stale checksum or an oversize payload is refused with
    /// [`ChannelError::Frame`] and nothing is written. A failed write halts
    /// and disconnects the channel and returns [`ChannelError::SendFailed`].
    pub fn send_packet(&self, frame: &Frame) -> Result<()> {
        self.shared.send(frame)
    }

    /// Encode `message` as a frame of `kind` and send it.
    pub fn send_message<M: Message>(&self, kind: u8, message: &M) -> Result<()> {
        self.shared.send(&message.to_frame(kind)?)
    }

    /// Cloneable handle onto the send path.
    pub fn sender(&self) -> FrameSender<T> {
        FrameSender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Pass frames with no registered handler to `relay`, or drop them when
    /// `None`.
    pub fn set_relay(&self, relay: Option<Arc<dyn FrameSink>>) {
        lock(&self.shared.registry).set_relay(relay);
    }

    /// Handle raw frames of `kind`. Returns true if a handler was replaced.
    pub fn register<F>(&self, kind: u8, handler: F) -> bool
    where
        F: FnMut(&Frame) + Send + 'static,
    {
        lock(&self.shared.registry).register(kind, handler)
    }

    /// Handle frames of `kind` decoded into a record of type `M`.
    ///
    /// Frames that fail to decode are logged and counted, the handler is not
    /// called.
    pub fn register_message<M, F>(&self, kind: u8, handler: F) -> bool
    where
        M: Message + Send + 'static,
        F: FnMut(&M) + Send + 'static,
    {
        lock(&self.shared.registry).register_message(kind, handler)
    }

    pub fn unregister(&self, kind: u8) -> bool {
        lock(&self.shared.registry).unregister(kind)
    }

    /// Most recent validated inbound frame.
    pub fn last_received(&self) -> Option<Frame> {
        lock(&self.shared.last_received).clone()
    }

    pub fn stats(&self) -> ChannelStats {
        self.shared.counters.snapshot()
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.shared.config
    }

    /// Peer description from the transport.
    pub fn describe(&self) -> String {
        lock(&self.shared.link).transport.describe()
    }
}

impl<T: Transport> Drop for Transceiver<T> {
    fn drop(&mut self) {
        if lock(&self.shared.link).receiving || self.state() != ChannelState::Disconnected {
            self.terminate();
        }
    }
}

impl<T: Transport> fmt::Debug for Transceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transceiver")
            .field("peer", &self.describe())
            .field("state", &self.state())
            .field("relay", &lock(&self.shared.registry).has_relay())
            .finish()
    }
}

impl<T: Transport> FrameSink for Transceiver<T> {
    fn send_frame(&self, frame: &Frame) -> Result<()> {
        self.send_packet(frame)
    }
}

impl<T: Transport> FrameSender<T> {
    pub fn send_packet(&self, frame: &Frame) -> Result<()> {
        self.shared.send(frame)
    }

    pub fn send_message<M: Message>(&self, kind: u8, message: &M) -> Result<()> {
        self.shared.send(&message.to_frame(kind)?)
    }

    pub fn is_connected(&self) -> bool {
        *lock(&self.shared.state) == ChannelState::Connected
    }
}

impl<T: Transport> Clone for FrameSender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Transport> FrameSink for FrameSender<T> {
    fn send_frame(&self, frame: &Frame) -> Result<()> {
        self.send_packet(frame)
    }
}

impl<T: Transport> Shared<T> {
    fn set_state(&self, next: ChannelState) {
        let mut state = lock(&self.state);
        if *state != next {
            debug!(from = %*state, to = %next, "channel state");
            *state = next;
        }
    }

    fn install_writer(&self, writer: T::Writer) {
        *lock(&self.writer) = Some(FrameWriter::with_config(writer, self.config.frame.clone()));
    }

    fn send(&self, frame: &Frame) -> Result<()> {
        let written = {
            let mut writer = lock(&self.writer);
            let Some(writer) = writer.as_mut() else {
                return Err(if self.halt.is_set() {
                    ChannelError::Halted
                } else {
                    ChannelError::NotConnected
                });
            };
            writer.write_frame(frame)
        };

        match written {
            Ok(()) => {
                bump(&self.counters.frames_sent);
                Ok(())
            }
            Err(err @ (FrameError::PayloadTooLarge { .. } | FrameError::StaleChecksum(_))) => {
                Err(ChannelError::Frame(err))
            }
            Err(err) => {
                warn!(kind = frame.kind(), error = %err, "send failed; halting channel");
                self.halt.set();
                let mut link = lock(&self.link);
                link.pending = None;
                link.transport.disconnect();
                *lock(&self.writer) = None;
                self.set_state(ChannelState::Disconnected);
                Err(ChannelError::SendFailed(err))
            }
        }
    }

    fn frame_reader(&self, reader: T::Reader) -> FrameReader<T::Reader> {
        FrameReader::with_config(reader, self.config.frame.clone())
    }

    fn deliver(&self, frame: Frame) {
        bump(&self.counters.frames_received);
        *lock(&self.last_received) = Some(frame.clone());

        let route = lock(&self.registry).route(frame.kind());
        match route {
            Route::Handler(handler) => {
                let mut handler = lock(&handler);
                // A panicking handler must not take the receive thread with it.
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| (&mut *handler)(&frame)));
                match outcome {
                    Ok(Ok(())) => bump(&self.counters.dispatched),
                    Ok(Err(err)) => {
                        warn!(kind = frame.kind(), size = frame.size(), error = %err, "decode failed");
                        bump(&self.counters.decode_failures);
                    }
                    Err(_) => {
                        warn!(kind = frame.kind(), size = frame.size(), "handler panicked");
                        bump(&self.counters.handler_panics);
                    }
                }
            }
            Route::Relay(sink) => match sink.send_frame(&frame) {
                Ok(()) => bump(&self.counters.relayed),
                Err(err) => {
                    warn!(kind = frame.kind(), error = %err, "relay failed");
                    bump(&self.counters.relay_failures);
                }
            },
            Route::Drop => {
                debug!(kind = frame.kind(), "no handler for kind; dropping frame");
                bump(&self.counters.dropped);
            }
        }
    }

    /// Find the next reader after the current one failed, reconnecting if
    /// needed. `None` means the receive thread should exit.
    fn recover(&self, cause: &FrameError) -> Option<T::Reader> {
        if self.halt.is_set() {
            return self.retire();
        }

        {
            let mut link = lock(&self.link);
            if let Some(next) = link.pending.take() {
                return Some(next);
            }
            warn!(peer = %link.transport.describe(), error = %cause, "link lost");
            link.transport.disconnect();
            *lock(&self.writer) = None;
            self.set_state(ChannelState::Disconnected);
        }

        let mut attempts = 0u32;
        while !self.config.attempts_exhausted(attempts) {
            if self.halt.wait(self.config.reconnect_delay) {
                break;
            }
            attempts += 1;
            bump(&self.counters.reconnect_attempts);

            let mut link = lock(&self.link);
            if let Some(next) = link.pending.take() {
                return Some(next);
            }
            if self.halt.is_set() {
                break;
            }

            self.set_state(ChannelState::Connecting);
            let peer = link.transport.describe();
            match link.transport.connect() {
                Ok((reader, writer)) => {
                    if self.halt.is_set() {
                        link.transport.disconnect();
                        break;
                    }
                    self.install_writer(writer);
                    self.set_state(ChannelState::Connected);
                    info!(peer = %peer, attempt = attempts, "reconnected");
                    return Some(reader);
                }
                Err(err) => {
                    self.set_state(ChannelState::Disconnected);
                    warn!(peer = %peer, attempt = attempts, error = %err, "reconnect failed");
                }
            }
        }

        if !self.halt.is_set() {
            info!(attempts, "giving up on reconnect");
        }
        self.retire()
    }

    /// Hand the inbound side back, unless a fresh reader is waiting for it.
    fn retire(&self) -> Option<T::Reader> {
        let mut link = lock(&self.link);
        if !self.halt.is_set() {
            if let Some(next) = link.pending.take() {
                return Some(next);
            }
        }
        link.pending = None;
        link.receiving = false;
        let mut state = lock(&self.state);
        if *state != ChannelState::Halting {
            *state = ChannelState::Disconnected;
        }
        None
    }
}

/// Releases the link if the receive thread unwinds, so the channel reads as
/// disconnected and a later `connect()` starts a fresh thread.
struct AbandonOnUnwind<'a, T: Transport>(&'a Shared<T>);

impl<T: Transport> Drop for AbandonOnUnwind<'_, T> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        warn!("receive thread panicked; abandoning link");
        let mut link = lock(&self.0.link);
        link.pending = None;
        link.receiving = false;
        link.transport.disconnect();
        *lock(&self.0.writer) = None;
        self.0.set_state(ChannelState::Disconnected);
    }
}

fn receive_loop<T: Transport>(shared: Arc<Shared<T>>, reader: T::Reader) {
    let _guard = AbandonOnUnwind(&*shared);
    let mut reader = shared.frame_reader(reader);
    let mut seen = ScanStats::default();
    debug!("receive loop started");

    loop {
        let result = reader.read_frame();
        shared.counters.absorb(&mut seen, reader.stats());
        match result {
            Ok(frame) => shared.deliver(frame),
            Err(err) => match shared.recover(&err) {
                Some(next) => {
                    reader = shared.frame_reader(next);
                    seen = ScanStats::default();
                }
                None => break,
            },
        }
    }

    debug!("receive loop exited");
}
