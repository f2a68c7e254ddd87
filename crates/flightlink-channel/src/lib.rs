//! Bidirectional channel between a ground station and a flight computer.
//!
//! A [`Transceiver`] owns one [`Transport`](flightlink_transport::Transport),
//! a receive thread that turns the inbound byte stream into validated frames,
//! and a locked send path. Inbound frames are dispatched by kind to
//! registered handlers, passed through to a relay [`FrameSink`], or dropped.
//! When the link fails the receive thread reconnects on its own until the
//! channel is terminated.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod state;
pub mod stats;
pub mod transceiver;

#[cfg(all(test, unix))]
mod testing;

pub use config::ChannelConfig;
pub use dispatch::FrameSink;
pub use error::{ChannelError, Result};
pub use state::ChannelState;
pub use stats::ChannelStats;
pub use transceiver::{FrameSender, Transceiver};
