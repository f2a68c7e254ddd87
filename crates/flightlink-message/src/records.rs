use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{i16_record, window, window_mut};
use crate::Message;

i16_record! {
    /// Attitude and altitude setpoint sent by the ground station.
    CommandMessage {
        roll,
        pitch,
        yaw,
        z,
    }
}

i16_record! {
    /// Full sensor snapshot reported by the flight computer.
    SensorMessage {
        /// Attitude.
        roll,
        pitch,
        yaw,
        /// Angular rates.
        roll_rate,
        pitch_rate,
        yaw_rate,
        /// World-frame accelerations.
        acc_x,
        acc_y,
        acc_z,
        /// Position.
        x,
        y,
        z,
        /// Velocity.
        vel_x,
        vel_y,
        vel_z,
        /// Raw accelerometer.
        raw_acc_x,
        raw_acc_y,
        raw_acc_z,
        /// Barometric pressure.
        pressure,
        temperature,
        /// Battery voltage.
        battery,
    }
}

i16_record! {
    /// Motor outputs plus the id of the command they respond to.
    MotorSignalMessage {
        front,
        rear,
        left,
        right,
        id,
    }
}

i16_record! {
    /// Per-motor trim offsets.
    MotorOffsetMessage {
        front,
        rear,
        left,
        right,
    }
}

i16_record! {
    /// PID gains plus a second-derivative term, one set per control axis.
    GainMessage {
        p,
        i,
        d,
        dd,
    }
}

i16_record! {
    /// Motor revving parameters.
    RevvingMessage {
        idle_limit,
        control_speed,
        ramp_up_step,
        ramp_down_step,
    }
}

/// Number of diagnostic slots in a [`TraceMessage`].
pub const TRACE_SLOTS: usize = 16;

/// Free-form diagnostic values traced by the flight computer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMessage {
    pub slots: [i16; TRACE_SLOTS],
}

impl Message for TraceMessage {
    const PACKET_SIZE: usize = 2 * TRACE_SLOTS;

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut dst = window_mut(buf, offset, Self::PACKET_SIZE)?;
        for slot in self.slots {
            dst.put_i16(slot);
        }
        Ok(())
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        let mut src = window(buf, offset, Self::PACKET_SIZE)?;
        for slot in self.slots.iter_mut() {
            *slot = src.get_i16();
        }
        Ok(())
    }
}

/// Flight mode and controller state, one byte each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStateMessage {
    pub mode: u8,
    pub state: u8,
}

impl Message for ModeStateMessage {
    const PACKET_SIZE: usize = 2;

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let dst = window_mut(buf, offset, Self::PACKET_SIZE)?;
        dst[0] = self.mode;
        dst[1] = self.state;
        Ok(())
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        let src = window(buf, offset, Self::PACKET_SIZE)?;
        self.mode = src[0];
        self.state = src[1];
        Ok(())
    }
}

/// Target of a switch-mode or switch-state request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchMessage {
    pub target: u8,
}

impl Message for SwitchMessage {
    const PACKET_SIZE: usize = 1;

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        window_mut(buf, offset, Self::PACKET_SIZE)?[0] = self.target;
        Ok(())
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        self.target = window(buf, offset, Self::PACKET_SIZE)?[0];
        Ok(())
    }
}
