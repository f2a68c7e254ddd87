//! Telemetry and command link between a ground station and a flight computer.
//!
//! flightlink moves fixed-layout records over an unreliable byte stream:
//! marker-delimited, checksummed frames, a scanner that resynchronizes after
//! corruption, and a channel that dispatches inbound frames and reconnects on
//! its own.
//!
//! # Crate Structure
//!
//! - [`transport`]: Stream and datagram transports (TCP, UDP)
//! - [`frame`]: Frame model, checksum, wire codec and resynchronizing scanner
//! - [`message`]: Fixed-layout telemetry and command records
//! - [`channel`]: The `Transceiver`: receive loop, dispatch, relay, reconnect

/// Re-export transport types.
pub mod transport {
    pub use flightlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use flightlink_frame::*;
}

/// Re-export message records.
pub mod message {
    pub use flightlink_message::*;
}

/// Re-export channel types.
pub mod channel {
    pub use flightlink_channel::*;
}
