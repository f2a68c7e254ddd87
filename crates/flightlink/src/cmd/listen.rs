use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flightlink_channel::{ChannelConfig, FrameSink, Transceiver};
use flightlink_frame::Frame;
use flightlink_transport::Transport;
use tracing::info;

use crate::cmd::{parse_duration, with_channel, Context, ListenArgs, Session};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT, TRANSPORT_ERROR};
use crate::output::print_frame;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: ListenArgs, ctx: &Context) -> CliResult<i32> {
    let config = ChannelConfig {
        reconnect_delay: parse_duration(&args.reconnect_delay)?,
        max_reconnect_attempts: args.max_reconnects,
        ..ChannelConfig::default()
    };
    let addr = args.addr.clone();
    with_channel(ctx, &addr, config, args)
}

/// Hands every unhandled frame to the printing thread.
struct Forward(mpsc::Sender<Frame>);

impl FrameSink for Forward {
    fn send_frame(&self, frame: &Frame) -> flightlink_channel::Result<()> {
        // The printer only goes away while the channel is shutting down.
        let _ = self.0.send(frame.clone());
        Ok(())
    }
}

impl ListenArgs {
    fn wants(&self, frame: &Frame) -> bool {
        self.kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&frame.kind()))
    }
}

impl Session for ListenArgs {
    fn run<T: Transport>(self, channel: &Transceiver<T>, ctx: &Context) -> CliResult<i32> {
        let idle_timeout = self.idle_timeout.as_deref().map(parse_duration).transpose()?;
        let running = Arc::new(AtomicBool::new(true));
        install_ctrlc_handler(running.clone())?;

        let (tx, rx) = mpsc::channel();
        channel.set_relay(Some(Arc::new(Forward(tx))));
        let peer = channel.describe();

        let mut printed = 0usize;
        let mut last_frame = Instant::now();
        let outcome = loop {
            if !running.load(Ordering::SeqCst) {
                break Ok(SUCCESS);
            }

            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(frame) => {
                    last_frame = Instant::now();
                    if !self.wants(&frame) {
                        continue;
                    }
                    print_frame("received", &frame, &peer, ctx.format);
                    printed = printed.saturating_add(1);
                    if self.count.is_some_and(|count| printed >= count) {
                        break Ok(SUCCESS);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(limit) = idle_timeout {
                        if last_frame.elapsed() >= limit {
                            break Err(CliError::new(
                                TIMEOUT,
                                format!("no frames received within {limit:?}"),
                            ));
                        }
                    }
                    if let Some(max) = self.max_reconnects {
                        let stats = channel.stats();
                        if !channel.is_connected() && stats.reconnect_attempts >= u64::from(max) {
                            break Err(CliError::new(
                                TRANSPORT_ERROR,
                                format!("link to {peer} lost after {max} reconnect attempts"),
                            ));
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    break Err(CliError::new(INTERNAL, "frame relay closed unexpectedly"));
                }
            }
        };

        channel.set_relay(None);
        let stats = channel.stats();
        info!(
            printed,
            received = stats.frames_received,
            checksum_mismatches = stats.checksum_mismatches,
            framing_errors = stats.framing_errors,
            reconnects = stats.reconnect_attempts,
            "listen finished"
        );
        outcome
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use flightlink_frame::kind::{COMMAND_DATA, SENSOR_DATA};

    use super::*;

    fn args(kinds: Option<Vec<u8>>) -> ListenArgs {
        ListenArgs {
            addr: "127.0.0.1:9000".to_string(),
            count: None,
            kinds,
            idle_timeout: None,
            reconnect_delay: "1s".to_string(),
            max_reconnects: None,
        }
    }

    #[test]
    fn no_filter_accepts_everything() {
        assert!(args(None).wants(&Frame::empty(COMMAND_DATA)));
    }

    #[test]
    fn filter_limits_kinds() {
        let args = args(Some(vec![SENSOR_DATA]));
        assert!(args.wants(&Frame::empty(SENSOR_DATA)));
        assert!(!args.wants(&Frame::empty(COMMAND_DATA)));
    }

    #[test]
    fn forward_sink_passes_frames_on() {
        let (tx, rx) = mpsc::channel();
        let sink = Forward(tx);
        sink.send_frame(&Frame::empty(SENSOR_DATA)).unwrap();
        assert_eq!(rx.recv().unwrap().kind(), SENSOR_DATA);

        drop(rx);
        assert!(sink.send_frame(&Frame::empty(SENSOR_DATA)).is_ok());
    }
}
