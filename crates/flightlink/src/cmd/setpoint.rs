use std::thread;

use flightlink_channel::Transceiver;
use flightlink_frame::kind::COMMAND_DATA;
use flightlink_message::{CommandMessage, Message};
use flightlink_transport::Transport;

use crate::cmd::{one_shot_config, parse_duration, with_channel, Context, Session, SetpointArgs};
use crate::exit::{channel_error, message_error, CliResult, SUCCESS};
use crate::output::print_frame;

pub fn run(args: SetpointArgs, ctx: &Context) -> CliResult<i32> {
    let addr = args.addr.clone();
    with_channel(ctx, &addr, one_shot_config(), args)
}

impl SetpointArgs {
    fn message(&self) -> CommandMessage {
        CommandMessage {
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
            z: self.z,
        }
    }
}

impl Session for SetpointArgs {
    fn run<T: Transport>(self, channel: &Transceiver<T>, ctx: &Context) -> CliResult<i32> {
        let interval = parse_duration(&self.interval)?;
        let frame = self
            .message()
            .to_frame(COMMAND_DATA)
            .map_err(|err| message_error("encode failed", err))?;
        let peer = channel.describe();

        for sent in 0..self.repeat {
            if sent > 0 {
                thread::sleep(interval);
            }
            channel
                .send_packet(&frame)
                .map_err(|err| channel_error("send failed", err))?;
            print_frame("sent", &frame, &peer, ctx.format);
        }
        Ok(SUCCESS)
    }
}
