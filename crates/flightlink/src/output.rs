use std::fmt::Write as _;
use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use flightlink_frame::{kind_name, Frame};
use flightlink_message::AnyMessage;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    event: &'a str,
    peer: &'a str,
    kind: u8,
    kind_name: &'a str,
    size: u8,
    checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<AnyMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decode_error: Option<String>,
    wire: String,
    timestamp: String,
}

/// Print a frame that was received (`event = "received"`) or sent.
pub fn print_frame(event: &str, frame: &Frame, peer: &str, format: OutputFormat) {
    let (record, decode_error) = match AnyMessage::decode(frame) {
        Ok(record) => (Some(record), None),
        Err(err) => (None, Some(err.to_string())),
    };

    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                event,
                peer,
                kind: frame.kind(),
                kind_name: kind_name(frame.kind()),
                size: frame.size(),
                checksum: format!("0x{:04X}", frame.checksum()),
                record,
                decode_error,
                wire: hex(&frame.to_bytes()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "KIND", "SIZE", "CHECKSUM", "RECORD"])
                .add_row(vec![
                    event.to_string(),
                    kind_label(frame.kind()),
                    frame.size().to_string(),
                    format!("0x{:04X}", frame.checksum()),
                    record_summary(record.as_ref(), decode_error.as_deref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{event} kind={} size={} checksum=0x{:04X} peer={peer} record={}",
                kind_label(frame.kind()),
                frame.size(),
                frame.checksum(),
                record_summary(record.as_ref(), decode_error.as_deref())
            );
        }
    }
}

/// Print a flat report: JSON object, two-column table, or `key=value` line.
pub fn print_fields<T: Serialize>(value: &T, fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
    }
}

pub fn kind_label(kind: u8) -> String {
    format!("0x{kind:02X} ({})", kind_name(kind))
}

fn record_summary(record: Option<&AnyMessage>, error: Option<&str>) -> String {
    match (record, error) {
        (Some(record), _) => {
            serde_json::to_string(record).unwrap_or_else(|_| "<unprintable>".to_string())
        }
        (None, Some(error)) => format!("<{error}>"),
        (None, None) => String::new(),
    }
}

/// Lowercase hex, no separators.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
