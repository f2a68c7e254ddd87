use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{window, window_mut};
use crate::records::{ModeStateMessage, MotorOffsetMessage, MotorSignalMessage, SensorMessage};
use crate::Message;

const SENSOR_AT: usize = 0;
const MOTOR_SIGNAL_AT: usize = SENSOR_AT + SensorMessage::PACKET_SIZE;
const MOTOR_OFFSET_AT: usize = MOTOR_SIGNAL_AT + MotorSignalMessage::PACKET_SIZE;
const MODE_STATE_AT: usize = MOTOR_OFFSET_AT + MotorOffsetMessage::PACKET_SIZE;

/// Composite status report: sensors, motor signals, motor offsets and
/// mode/state, concatenated in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundReport {
    pub sensor: SensorMessage,
    pub motor_signal: MotorSignalMessage,
    pub motor_offset: MotorOffsetMessage,
    pub mode_state: ModeStateMessage,
}

impl Message for GroundReport {
    const PACKET_SIZE: usize = MODE_STATE_AT + ModeStateMessage::PACKET_SIZE;

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        // Bounds-check the whole report before touching any byte.
        let dst = window_mut(buf, offset, Self::PACKET_SIZE)?;
        self.sensor.encode(dst, SENSOR_AT)?;
        self.motor_signal.encode(dst, MOTOR_SIGNAL_AT)?;
        self.motor_offset.encode(dst, MOTOR_OFFSET_AT)?;
        self.mode_state.encode(dst, MODE_STATE_AT)
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        let src = window(buf, offset, Self::PACKET_SIZE)?;
        self.sensor.decode(src, SENSOR_AT)?;
        self.motor_signal.decode(src, MOTOR_SIGNAL_AT)?;
        self.motor_offset.decode(src, MOTOR_OFFSET_AT)?;
        self.mode_state.decode(src, MODE_STATE_AT)
    }
}
