use flightlink_frame::{checks_out, checksum, kind_name, Frame, HEADER_SIZE, MARKER, TRAILER_SIZE};
use flightlink_message::AnyMessage;
use serde::Serialize;

use crate::cmd::CheckArgs;
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{kind_label, print_fields, OutputFormat};

#[derive(Debug, Serialize)]
struct CheckReport {
    valid: bool,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    received_checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<AnyMessage>,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    let report = inspect(&bytes);

    let mut fields = vec![
        ("valid", report.valid.to_string()),
        ("length", report.length.to_string()),
    ];
    if let Some(kind) = report.kind {
        fields.push(("kind", kind_label(kind)));
    }
    if let Some(size) = report.size {
        fields.push(("size", size.to_string()));
    }
    if let Some(expected) = &report.expected_checksum {
        fields.push(("expected_checksum", expected.clone()));
    }
    if let Some(received) = &report.received_checksum {
        fields.push(("received_checksum", received.clone()));
    }
    if let Some(record) = &report.record {
        fields.push((
            "record",
            serde_json::to_string(record).unwrap_or_else(|_| "<unprintable>".to_string()),
        ));
    }
    print_fields(&report, &fields, format);

    Ok(if report.valid { SUCCESS } else { DATA_INVALID })
}

fn inspect(bytes: &[u8]) -> CheckReport {
    let mut report = CheckReport {
        valid: checks_out(bytes),
        length: bytes.len(),
        kind: None,
        kind_name: None,
        size: None,
        expected_checksum: None,
        received_checksum: None,
        record: None,
    };

    if bytes.len() < HEADER_SIZE || bytes[0] != MARKER || bytes[1] != MARKER {
        return report;
    }
    let (kind, size) = (bytes[2], bytes[3]);
    report.kind = Some(kind);
    report.kind_name = Some(kind_name(kind));
    report.size = Some(size);

    let end = HEADER_SIZE + usize::from(size);
    if bytes.len() < end + TRAILER_SIZE {
        return report;
    }
    let expected = checksum::compute(kind, size, bytes, HEADER_SIZE);
    let received = u16::from_be_bytes([bytes[end], bytes[end + 1]]);
    report.expected_checksum = Some(format!("0x{expected:04X}"));
    report.received_checksum = Some(format!("0x{received:04X}"));

    if report.valid {
        report.record = Frame::new(kind, bytes[HEADER_SIZE..end].to_vec())
            .ok()
            .and_then(|frame| AnyMessage::decode(&frame).ok());
    }
    report
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    if digits.is_empty() {
        return Err(CliError::new(USAGE, "no frame bytes given"));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "hex input has an odd number of digits"));
    }

    (0..digits.len())
        .step_by(2)
        .map(|at| {
            digits
                .get(at..at + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CliError::new(USAGE, format!("invalid hex near offset {at}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMAND_FRAME: &str = "ffff0708 0064ffce000000c8 0308";

    #[test]
    fn parses_separated_hex() {
        assert_eq!(parse_hex("ff:ff-07 08").unwrap(), vec![0xFF, 0xFF, 0x07, 0x08]);
        assert_eq!(parse_hex("0xFFFF").unwrap(), vec![0xFF, 0xFF]);
        assert_eq!(parse_hex("abc").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("zz").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("  ").unwrap_err().code, USAGE);
    }

    #[test]
    fn valid_command_frame_decodes() {
        let report = inspect(&parse_hex(COMMAND_FRAME).unwrap());
        assert!(report.valid);
        assert_eq!(report.kind, Some(0x07));
        assert_eq!(report.size, Some(8));
        assert_eq!(report.expected_checksum.as_deref(), Some("0x0308"));
        assert!(matches!(report.record, Some(AnyMessage::Command(c)) if c.pitch == -50));
    }

    #[test]
    fn flipped_trailer_is_reported() {
        let mut bytes = parse_hex(COMMAND_FRAME).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let report = inspect(&bytes);
        assert!(!report.valid);
        assert_eq!(report.expected_checksum.as_deref(), Some("0x0308"));
        assert_eq!(report.received_checksum.as_deref(), Some("0x0309"));
        assert!(report.record.is_none());
    }

    #[test]
    fn truncated_frame_has_header_only() {
        let report = inspect(&[0xFF, 0xFF, 0x01, 0x2A, 0x00]);
        assert!(!report.valid);
        assert_eq!(report.kind_name, Some("SENSOR_DATA"));
        assert!(report.expected_checksum.is_none());
    }

    #[test]
    fn missing_marker_has_no_header() {
        let report = inspect(&[0x00, 0xFF, 0x07, 0x00, 0x00, 0x07]);
        assert!(!report.valid);
        assert!(report.kind.is_none());
    }
}
