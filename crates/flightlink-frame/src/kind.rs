//! Message kind codes.
//!
//! Kinds are single bytes in `0x01..=0x16`. `0xFF` (-1 as a signed byte) is
//! the frame marker and is never assigned to a kind.

/// Sensor readings (attitude, rates, position, environment).
pub const SENSOR_DATA: u8 = 0x01;
/// Motor output signals.
pub const MOTOR_SIGNALS: u8 = 0x02;
/// Motor trim offsets.
pub const MOTOR_OFFSETS: u8 = 0x03;
/// Flight mode and controller state.
pub const MODE_STATE: u8 = 0x04;
/// Composite report: sensor + motor signals + motor offsets + mode/state.
pub const GROUND_REPORT: u8 = 0x05;
/// Diagnostic trace slots.
pub const TRACE_DATA: u8 = 0x06;
/// Attitude/altitude command from the ground station.
pub const COMMAND_DATA: u8 = 0x07;
/// Roll/pitch controller gains.
pub const ROLL_PITCH_GAINS: u8 = 0x08;
/// Yaw controller gains.
pub const YAW_GAINS: u8 = 0x09;
/// Altitude controller gains.
pub const ALTITUDE_GAINS: u8 = 0x0A;
/// Horizontal position controller gains.
pub const XY_GAINS: u8 = 0x0B;
/// Motor revving parameters (idle limit, control speed, ramp steps).
pub const IDLE_LIMIT: u8 = 0x0C;
/// Opaque byte stream.
pub const BYTE_STREAM: u8 = 0x0D;
/// Request a controller state switch.
pub const SWITCH_STATE: u8 = 0x0E;
/// Request a flight mode switch.
pub const SWITCH_MODE: u8 = 0x0F;
/// Store the current motor trim.
pub const STORE_TRIM: u8 = 0x10;
/// Clear the stored motor trim.
pub const CLEAR_TRIM: u8 = 0x11;
/// Shut the vehicle down.
pub const SHUT_DOWN: u8 = 0x12;
/// Enable the sensor pipeline.
pub const ENABLE_SENSORS: u8 = 0x13;

/// Highest kind code accepted on the wire by default.
pub const KIND_LIMIT: u8 = 0x16;

/// Reserved in-band resynchronization value; never a kind.
pub const RESYNC: u8 = 0xFF;

/// Returns a human-readable name for a kind code.
pub fn kind_name(kind: u8) -> &'static str {
    match kind {
        SENSOR_DATA => "SENSOR_DATA",
        MOTOR_SIGNALS => "MOTOR_SIGNALS",
        MOTOR_OFFSETS => "MOTOR_OFFSETS",
        MODE_STATE => "MODE_STATE",
        GROUND_REPORT => "GROUND_REPORT",
        TRACE_DATA => "TRACE_DATA",
        COMMAND_DATA => "COMMAND_DATA",
        ROLL_PITCH_GAINS => "ROLL_PITCH_GAINS",
        YAW_GAINS => "YAW_GAINS",
        ALTITUDE_GAINS => "ALTITUDE_GAINS",
        XY_GAINS => "XY_GAINS",
        IDLE_LIMIT => "IDLE_LIMIT",
        BYTE_STREAM => "BYTE_STREAM",
        SWITCH_STATE => "SWITCH_STATE",
        SWITCH_MODE => "SWITCH_MODE",
        STORE_TRIM => "STORE_TRIM",
        CLEAR_TRIM => "CLEAR_TRIM",
        SHUT_DOWN => "SHUT_DOWN",
        ENABLE_SENSORS => "ENABLE_SENSORS",
        0x14..=KIND_LIMIT => "RESERVED",
        _ => "UNKNOWN",
    }
}

/// Returns true if `kind` lies in the accepted range `1..=limit`.
pub fn in_range(kind: u8, limit: u8) -> bool {
    kind != 0 && kind != RESYNC && kind <= limit
}

/// Returns true for request kinds that carry no payload.
pub fn is_bare_request(kind: u8) -> bool {
    matches!(kind, STORE_TRIM | CLEAR_TRIM | SHUT_DOWN | ENABLE_SENSORS)
}

/// Parse a kind from its name (case-insensitive, `-` or `_` separated) or a
/// numeric literal such as `7` or `0x07`.
pub fn parse_kind(input: &str) -> Option<u8> {
    let input = input.trim();
    if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        return u8::from_str_radix(hex, 16).ok();
    }
    if let Ok(value) = input.parse::<u8>() {
        return Some(value);
    }
    let wanted = input.replace('-', "_").to_ascii_uppercase();
    (1..=KIND_LIMIT).find(|&kind| kind_name(kind) == wanted)
}
