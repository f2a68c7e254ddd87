//! Ground station: connects to a vehicle, prints its ground reports through a
//! typed handler and sends a short command sequence.
//!
//! Run `cargo run --example vehicle-sim` first, then:
//!   cargo run --example ground-station

use std::thread;
use std::time::Duration;

use flightlink::channel::{ChannelConfig, Transceiver};
use flightlink::frame::kind::{COMMAND_DATA, GROUND_REPORT, MODE_STATE};
use flightlink::message::{CommandMessage, GroundReport, ModeStateMessage};
use flightlink::transport::TcpTransport;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7300".to_string());

    let config = ChannelConfig {
        reconnect_delay: Duration::from_millis(500),
        max_reconnect_attempts: Some(10),
        ..ChannelConfig::default()
    };
    let channel = Transceiver::with_config(TcpTransport::new(addr), config);

    channel.register_message::<GroundReport, _>(GROUND_REPORT, |report| {
        eprintln!(
            "report: yaw={} z={} battery={} mode={} state={}",
            report.sensor.yaw,
            report.sensor.z,
            report.sensor.battery,
            report.mode_state.mode,
            report.mode_state.state
        );
    });
    channel.register_message::<ModeStateMessage, _>(MODE_STATE, |mode_state| {
        eprintln!("mode changed: {mode_state:?}");
    });

    channel.connect()?;
    eprintln!("Connected to {}", channel.describe());

    let sender = channel.sender();
    for step in 0i16..10 {
        let command = CommandMessage {
            roll: 0,
            pitch: step * 10,
            yaw: 0,
            z: 150,
        };
        sender.send_message(COMMAND_DATA, &command)?;
        thread::sleep(Duration::from_millis(300));
    }

    let stats = channel.stats();
    eprintln!(
        "received={} sent={} dispatched={} checksum_mismatches={}",
        stats.frames_received, stats.frames_sent, stats.dispatched, stats.checksum_mismatches
    );
    channel.terminate();
    Ok(())
}
