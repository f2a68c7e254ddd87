use std::io::{Read, Write};

use crate::error::Result;

/// Opens and closes the byte stream a channel runs on.
///
/// `connect` hands out an owned reader and writer for one link. The reader is
/// moved to the receive thread and blocks there; `disconnect` is called from
/// other threads and must make such a pending read fail or return EOF so the
/// receive thread can observe the shutdown.
pub trait Transport: Send + 'static {
    /// Inbound half of a link.
    type Reader: Read + Send + 'static;
    /// Outbound half of a link.
    type Writer: Write + Send + 'static;

    /// Open a new link, replacing any previous one.
    fn connect(&mut self) -> Result<(Self::Reader, Self::Writer)>;

    /// Force the current link closed. Calling this with no open link is a no-op.
    fn disconnect(&mut self);

    /// Human-readable peer description for diagnostics.
    fn describe(&self) -> String;
}
