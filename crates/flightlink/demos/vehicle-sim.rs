//! Simulated flight computer: streams ground reports to one ground station
//! and prints the commands it sends back.
//!
//! Run with:
//!   cargo run --example vehicle-sim
//!
//! In another terminal:
//!   cargo run --features cli -- listen 127.0.0.1:7300 --count 5
//!   cargo run --features cli -- command 127.0.0.1:7300 --roll 100 --z 200

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use flightlink::frame::kind::GROUND_REPORT;
use flightlink::frame::{FrameError, FrameReader, FrameWriter};
use flightlink::message::{AnyMessage, GroundReport, Message, ModeStateMessage};

const REPORT_INTERVAL: Duration = Duration::from_millis(200);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7300".to_string());
    let listener = TcpListener::bind(&addr)?;
    eprintln!("Vehicle listening on {addr}");

    let (stream, peer) = listener.accept()?;
    eprintln!("Ground station connected: {peer}");

    let mut reader = FrameReader::new(stream.try_clone()?);
    thread::spawn(move || loop {
        match reader.read_frame() {
            Ok(frame) => match AnyMessage::decode(&frame) {
                Ok(message) => eprintln!("Received {message:?}"),
                Err(e) => eprintln!("Undecodable frame 0x{:02X}: {e}", frame.kind()),
            },
            Err(FrameError::ConnectionClosed) => {
                eprintln!("Ground station closed the link");
                break;
            }
            Err(e) => {
                eprintln!("Read failed: {e}");
                break;
            }
        }
    });

    let mut writer = FrameWriter::new(stream);
    let mut report = GroundReport {
        mode_state: ModeStateMessage { mode: 1, state: 0 },
        ..GroundReport::default()
    };

    let mut tick: i16 = 0;
    loop {
        report.sensor.yaw = tick.wrapping_mul(5);
        report.sensor.z = 100 + tick % 20;
        report.sensor.battery = 1260 - (tick / 10).min(300);
        report.motor_signal.id = tick;

        if let Err(e) = writer.write_frame(&report.to_frame(GROUND_REPORT)?) {
            eprintln!("Ground station gone: {e}");
            break;
        }
        tick = tick.wrapping_add(1);
        thread::sleep(REPORT_INTERVAL);
    }

    Ok(())
}
