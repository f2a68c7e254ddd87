//! Kind-tagged view over every record the protocol carries.

use serde::{Deserialize, Serialize};

use flightlink_frame::kind::{
    is_bare_request, ALTITUDE_GAINS, BYTE_STREAM, CLEAR_TRIM, COMMAND_DATA, ENABLE_SENSORS,
    GROUND_REPORT, IDLE_LIMIT, MODE_STATE, MOTOR_OFFSETS, MOTOR_SIGNALS, ROLL_PITCH_GAINS,
    SENSOR_DATA, SHUT_DOWN, STORE_TRIM, SWITCH_MODE, SWITCH_STATE, TRACE_DATA, XY_GAINS,
    YAW_GAINS,
};
use flightlink_frame::Frame;

use crate::error::{MessageError, Result};
use crate::records::{
    CommandMessage, GainMessage, ModeStateMessage, MotorOffsetMessage, MotorSignalMessage,
    RevvingMessage, SensorMessage, SwitchMessage, TraceMessage,
};
use crate::report::GroundReport;
use crate::Message;

/// Fixed payload size for a kind, `Some(0)` for bare requests.
///
/// `None` for the byte stream (variable length) and for kinds with no
/// assigned record.
pub fn payload_size(kind: u8) -> Option<usize> {
    let size = match kind {
        SENSOR_DATA => SensorMessage::PACKET_SIZE,
        MOTOR_SIGNALS => MotorSignalMessage::PACKET_SIZE,
        MOTOR_OFFSETS => MotorOffsetMessage::PACKET_SIZE,
        MODE_STATE => ModeStateMessage::PACKET_SIZE,
        GROUND_REPORT => GroundReport::PACKET_SIZE,
        TRACE_DATA => TraceMessage::PACKET_SIZE,
        COMMAND_DATA => CommandMessage::PACKET_SIZE,
        ROLL_PITCH_GAINS | YAW_GAINS | ALTITUDE_GAINS | XY_GAINS => GainMessage::PACKET_SIZE,
        IDLE_LIMIT => RevvingMessage::PACKET_SIZE,
        SWITCH_STATE | SWITCH_MODE => SwitchMessage::PACKET_SIZE,
        kind if is_bare_request(kind) => 0,
        _ => return None,
    };
    Some(size)
}

/// Control axis a [`GainMessage`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GainAxis {
    RollPitch,
    Yaw,
    Altitude,
    Xy,
}

impl GainAxis {
    pub const ALL: [GainAxis; 4] = [
        GainAxis::RollPitch,
        GainAxis::Yaw,
        GainAxis::Altitude,
        GainAxis::Xy,
    ];

    /// Kind code carrying gains for this axis.
    pub fn kind(self) -> u8 {
        match self {
            GainAxis::RollPitch => ROLL_PITCH_GAINS,
            GainAxis::Yaw => YAW_GAINS,
            GainAxis::Altitude => ALTITUDE_GAINS,
            GainAxis::Xy => XY_GAINS,
        }
    }

    pub fn from_kind(kind: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.kind() == kind)
    }
}

/// Any decoded record, tagged by what it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", content = "fields", rename_all = "snake_case")]
pub enum AnyMessage {
    Sensor(SensorMessage),
    MotorSignals(MotorSignalMessage),
    MotorOffsets(MotorOffsetMessage),
    ModeState(ModeStateMessage),
    GroundReport(GroundReport),
    Trace(TraceMessage),
    Command(CommandMessage),
    Gains { axis: GainAxis, gains: GainMessage },
    Revving(RevvingMessage),
    ByteStream(Vec<u8>),
    SwitchState(SwitchMessage),
    SwitchMode(SwitchMessage),
    StoreTrim,
    ClearTrim,
    ShutDown,
    EnableSensors,
}

impl AnyMessage {
    /// Decode a frame into the record its kind carries.
    pub fn decode(frame: &Frame) -> Result<Self> {
        fn read<M: Message>(frame: &Frame) -> Result<M> {
            let mut record = M::default();
            record.read_frame(frame)?;
            Ok(record)
        }

        let kind = frame.kind();
        if is_bare_request(kind) && !frame.payload().is_empty() {
            return Err(MessageError::SizeMismatch {
                kind,
                expected: 0,
                actual: frame.payload().len(),
            });
        }

        let message = match kind {
            SENSOR_DATA => AnyMessage::Sensor(read(frame)?),
            MOTOR_SIGNALS => AnyMessage::MotorSignals(read(frame)?),
            MOTOR_OFFSETS => AnyMessage::MotorOffsets(read(frame)?),
            MODE_STATE => AnyMessage::ModeState(read(frame)?),
            GROUND_REPORT => AnyMessage::GroundReport(read(frame)?),
            TRACE_DATA => AnyMessage::Trace(read(frame)?),
            COMMAND_DATA => AnyMessage::Command(read(frame)?),
            IDLE_LIMIT => AnyMessage::Revving(read(frame)?),
            BYTE_STREAM => AnyMessage::ByteStream(frame.payload().to_vec()),
            SWITCH_STATE => AnyMessage::SwitchState(read(frame)?),
            SWITCH_MODE => AnyMessage::SwitchMode(read(frame)?),
            STORE_TRIM => AnyMessage::StoreTrim,
            CLEAR_TRIM => AnyMessage::ClearTrim,
            SHUT_DOWN => AnyMessage::ShutDown,
            ENABLE_SENSORS => AnyMessage::EnableSensors,
            other => match GainAxis::from_kind(other) {
                Some(axis) => AnyMessage::Gains {
                    axis,
                    gains: read(frame)?,
                },
                None => return Err(MessageError::UnknownKind(other)),
            },
        };
        Ok(message)
    }

    /// Kind code this record travels under.
    pub fn kind(&self) -> u8 {
        match self {
            AnyMessage::Sensor(_) => SENSOR_DATA,
            AnyMessage::MotorSignals(_) => MOTOR_SIGNALS,
            AnyMessage::MotorOffsets(_) => MOTOR_OFFSETS,
            AnyMessage::ModeState(_) => MODE_STATE,
            AnyMessage::GroundReport(_) => GROUND_REPORT,
            AnyMessage::Trace(_) => TRACE_DATA,
            AnyMessage::Command(_) => COMMAND_DATA,
            AnyMessage::Gains { axis, .. } => axis.kind(),
            AnyMessage::Revving(_) => IDLE_LIMIT,
            AnyMessage::ByteStream(_) => BYTE_STREAM,
            AnyMessage::SwitchState(_) => SWITCH_STATE,
            AnyMessage::SwitchMode(_) => SWITCH_MODE,
            AnyMessage::StoreTrim => STORE_TRIM,
            AnyMessage::ClearTrim => CLEAR_TRIM,
            AnyMessage::ShutDown => SHUT_DOWN,
            AnyMessage::EnableSensors => ENABLE_SENSORS,
        }
    }

    /// Encode into a ready-to-send frame.
    pub fn to_frame(&self) -> Result<Frame> {
        let kind = self.kind();
        match self {
            AnyMessage::Sensor(m) => m.to_frame(kind),
            AnyMessage::MotorSignals(m) => m.to_frame(kind),
            AnyMessage::MotorOffsets(m) => m.to_frame(kind),
            AnyMessage::ModeState(m) => m.to_frame(kind),
            AnyMessage::GroundReport(m) => m.to_frame(kind),
            AnyMessage::Trace(m) => m.to_frame(kind),
            AnyMessage::Command(m) => m.to_frame(kind),
            AnyMessage::Gains { gains, .. } => gains.to_frame(kind),
            AnyMessage::Revving(m) => m.to_frame(kind),
            AnyMessage::ByteStream(bytes) => Ok(Frame::new(kind, bytes.clone())?),
            AnyMessage::SwitchState(m) | AnyMessage::SwitchMode(m) => m.to_frame(kind),
            AnyMessage::StoreTrim
            | AnyMessage::ClearTrim
            | AnyMessage::ShutDown
            | AnyMessage::EnableSensors => Ok(Frame::empty(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use flightlink_frame::kind::KIND_LIMIT;

    use super::*;

    #[test]
    fn sizes_for_every_assigned_kind() {
        assert_eq!(payload_size(SENSOR_DATA), Some(42));
        assert_eq!(payload_size(GROUND_REPORT), Some(62));
        assert_eq!(payload_size(COMMAND_DATA), Some(8));
        assert_eq!(payload_size(XY_GAINS), Some(8));
        assert_eq!(payload_size(SWITCH_MODE), Some(1));
        assert_eq!(payload_size(SHUT_DOWN), Some(0));
        assert_eq!(payload_size(BYTE_STREAM), None);
        assert_eq!(payload_size(KIND_LIMIT), None);
        assert_eq!(payload_size(0), None);
    }

    #[test]
    fn gain_axes_map_to_kinds() {
        for axis in GainAxis::ALL {
            assert_eq!(GainAxis::from_kind(axis.kind()), Some(axis));
        }
        assert_eq!(GainAxis::Yaw.kind(), YAW_GAINS);
        assert_eq!(GainAxis::from_kind(COMMAND_DATA), None);
    }

    #[test]
    fn decode_command_frame() {
        let command = CommandMessage {
            roll: 100,
            pitch: -50,
            yaw: 0,
            z: 200,
        };
        let frame = command.to_frame(COMMAND_DATA).unwrap();
        assert_eq!(AnyMessage::decode(&frame).unwrap(), AnyMessage::Command(command));
    }

    #[test]
    fn encode_then_decode_each_variant() {
        let samples = vec![
            AnyMessage::Gains {
                axis: GainAxis::Altitude,
                gains: GainMessage {
                    p: 1,
                    i: 2,
                    d: 3,
                    dd: 4,
                },
            },
            AnyMessage::ModeState(ModeStateMessage { mode: 1, state: 2 }),
            AnyMessage::ByteStream(b"hello".to_vec()),
            AnyMessage::SwitchState(SwitchMessage { target: 4 }),
            AnyMessage::ShutDown,
            AnyMessage::EnableSensors,
        ];
        for message in samples {
            let frame = message.to_frame().unwrap();
            assert_eq!(frame.kind(), message.kind());
            assert_eq!(AnyMessage::decode(&frame).unwrap(), message);
        }
    }

    #[test]
    fn bare_request_with_payload_is_rejected() {
        let frame = Frame::new(STORE_TRIM, vec![1]).unwrap();
        assert!(matches!(
            AnyMessage::decode(&frame),
            Err(MessageError::SizeMismatch { expected: 0, .. })
        ));
    }

    #[test]
    fn reserved_kind_is_unknown() {
        let frame = Frame::new(0x15, vec![0; 4]).unwrap();
        assert!(matches!(
            AnyMessage::decode(&frame),
            Err(MessageError::UnknownKind(0x15))
        ));
    }

    #[test]
    fn short_payload_is_rejected() {
        let frame = Frame::new(SENSOR_DATA, vec![0; 10]).unwrap();
        assert!(matches!(
            AnyMessage::decode(&frame),
            Err(MessageError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn json_is_tagged_by_record() {
        let json = serde_json::to_value(AnyMessage::Gains {
            axis: GainAxis::RollPitch,
            gains: GainMessage::default(),
        })
        .unwrap();
        assert_eq!(json["record"], "gains");
        assert_eq!(json["fields"]["axis"], "roll-pitch");
        assert_eq!(json["fields"]["gains"]["p"], 0);

        let json = serde_json::to_value(AnyMessage::ShutDown).unwrap();
        assert_eq!(json["record"], "shut_down");
    }
}
