use flightlink_channel::Transceiver;
use flightlink_message::{AnyMessage, GainAxis, GainMessage};
use flightlink_transport::Transport;

use crate::cmd::{one_shot_config, with_channel, Context, GainsArgs, Session};
use crate::exit::{channel_error, message_error, CliResult, SUCCESS};
use crate::output::print_frame;

pub fn run(args: GainsArgs, ctx: &Context) -> CliResult<i32> {
    let addr = args.addr.clone();
    with_channel(ctx, &addr, one_shot_config(), args)
}

impl GainsArgs {
    fn message(&self) -> AnyMessage {
        AnyMessage::Gains {
            axis: GainAxis::from(self.axis),
            gains: GainMessage {
                p: self.p,
                i: self.i,
                d: self.d,
                dd: self.dd,
            },
        }
    }
}

impl Session for GainsArgs {
    fn run<T: Transport>(self, channel: &Transceiver<T>, ctx: &Context) -> CliResult<i32> {
        let frame = self
            .message()
            .to_frame()
            .map_err(|err| message_error("encode failed", err))?;
        channel
            .send_packet(&frame)
            .map_err(|err| channel_error("send failed", err))?;
        print_frame("sent", &frame, &channel.describe(), ctx.format);
        Ok(SUCCESS)
    }
}
