use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flightlink_frame::Frame;
use flightlink_message::{Message, MessageError};

use crate::error::Result;

/// Anything that accepts outbound frames.
///
/// Implemented by [`Transceiver`](crate::Transceiver) and
/// [`FrameSender`](crate::FrameSender), so one channel can relay into another.
pub trait FrameSink: Send + Sync {
    fn send_frame(&self, frame: &Frame) -> Result<()>;
}

pub(crate) type Handler =
    Arc<Mutex<dyn FnMut(&Frame) -> std::result::Result<(), MessageError> + Send>>;

/// Where an inbound frame goes.
pub(crate) enum Route {
    Handler(Handler),
    Relay(Arc<dyn FrameSink>),
    Drop,
}

/// Kind-indexed handler table plus the pass-through relay.
#[derive(Default)]
pub(crate) struct Registry {
    handlers: HashMap<u8, Handler>,
    relay: Option<Arc<dyn FrameSink>>,
}

impl Registry {
    /// Install a raw frame handler. Returns true if one was replaced.
    pub(crate) fn register<F>(&mut self, kind: u8, mut handler: F) -> bool
    where
        F: FnMut(&Frame) + Send + 'static,
    {
        self.insert(
            kind,
            Arc::new(Mutex::new(move |frame: &Frame| {
                handler(frame);
                Ok(())
            })),
        )
    }

    /// Install a handler that decodes into a record it owns.
    ///
    /// The record is reused across frames; each decode overwrites it in place.
    pub(crate) fn register_message<M, F>(&mut self, kind: u8, mut handler: F) -> bool
    where
        M: Message + Send + 'static,
        F: FnMut(&M) + Send + 'static,
    {
        let mut record = M::default();
        self.insert(
            kind,
            Arc::new(Mutex::new(move |frame: &Frame| {
                record.read_frame(frame)?;
                handler(&record);
                Ok(())
            })),
        )
    }

    fn insert(&mut self, kind: u8, handler: Handler) -> bool {
        self.handlers.insert(kind, handler).is_some()
    }

    pub(crate) fn unregister(&mut self, kind: u8) -> bool {
        self.handlers.remove(&kind).is_some()
    }

    pub(crate) fn set_relay(&mut self, relay: Option<Arc<dyn FrameSink>>) {
        self.relay = relay;
    }

    pub(crate) fn has_relay(&self) -> bool {
        self.relay.is_some()
    }

    pub(crate) fn route(&self, kind: u8) -> Route {
        if let Some(handler) = self.handlers.get(&kind) {
            return Route::Handler(Arc::clone(handler));
        }
        match &self.relay {
            Some(relay) => Route::Relay(Arc::clone(relay)),
            None => Route::Drop,
        }
    }
}
