use flightlink_channel::Transceiver;
use flightlink_message::{AnyMessage, SwitchMessage};
use flightlink_transport::Transport;

use crate::cmd::{one_shot_config, with_channel, Context, RequestAction, RequestArgs, Session};
use crate::exit::{channel_error, message_error, CliResult, SUCCESS};
use crate::output::print_frame;

pub fn run(args: RequestArgs, ctx: &Context) -> CliResult<i32> {
    let addr = args.addr.clone();
    with_channel(ctx, &addr, one_shot_config(), args.action)
}

impl From<RequestAction> for AnyMessage {
    fn from(action: RequestAction) -> Self {
        match action {
            RequestAction::SwitchState { target } => {
                AnyMessage::SwitchState(SwitchMessage { target })
            }
            RequestAction::SwitchMode { target } => AnyMessage::SwitchMode(SwitchMessage { target }),
            RequestAction::StoreTrim => AnyMessage::StoreTrim,
            RequestAction::ClearTrim => AnyMessage::ClearTrim,
            RequestAction::Shutdown => AnyMessage::ShutDown,
            RequestAction::EnableSensors => AnyMessage::EnableSensors,
        }
    }
}

impl Session for RequestAction {
    fn run<T: Transport>(self, channel: &Transceiver<T>, ctx: &Context) -> CliResult<i32> {
        let frame = AnyMessage::from(self)
            .to_frame()
            .map_err(|err| message_error("encode failed", err))?;
        channel
            .send_packet(&frame)
            .map_err(|err| channel_error("send failed", err))?;
        print_frame("sent", &frame, &channel.describe(), ctx.format);
        Ok(SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use flightlink_frame::kind::{ENABLE_SENSORS, SHUT_DOWN, SWITCH_MODE};

    use super::*;

    #[test]
    fn bare_requests_have_empty_payloads() {
        let frame = AnyMessage::from(RequestAction::Shutdown).to_frame().unwrap();
        assert_eq!(frame.kind(), SHUT_DOWN);
        assert_eq!(frame.size(), 0);
        assert_eq!(
            AnyMessage::from(RequestAction::EnableSensors).kind(),
            ENABLE_SENSORS
        );
    }

    #[test]
    fn switch_requests_carry_the_target() {
        let frame = AnyMessage::from(RequestAction::SwitchMode { target: 3 })
            .to_frame()
            .unwrap();
        assert_eq!(frame.kind(), SWITCH_MODE);
        assert_eq!(frame.payload().as_ref(), &[3]);
    }
}
