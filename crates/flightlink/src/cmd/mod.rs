use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use flightlink_channel::{ChannelConfig, Transceiver};
use flightlink_frame::kind::parse_kind;
use flightlink_message::GainAxis;
use flightlink_transport::{TcpConfig, TcpTransport, Transport, UdpTransport};

use crate::exit::{channel_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod gains;
pub mod listen;
pub mod request;
pub mod setpoint;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send an attitude/altitude command.
    #[command(name = "command")]
    Setpoint(SetpointArgs),
    /// Send controller gains for one axis.
    Gains(GainsArgs),
    /// Send a mode/state switch or a bare request.
    Request(RequestArgs),
    /// Connect and print received frames.
    Listen(ListenArgs),
    /// Validate a hex-encoded frame offline.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Setpoint(args) => setpoint::run(args, ctx),
        Command::Gains(args) => gains::run(args, ctx),
        Command::Request(args) => request::run(args, ctx),
        Command::Listen(args) => listen::run(args, ctx),
        Command::Check(args) => check::run(args, ctx.format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TransportKind {
    Tcp,
    Udp,
}

/// Settings shared by every subcommand.
#[derive(Debug)]
pub struct Context {
    pub format: OutputFormat,
    pub transport: TransportKind,
    pub connect_timeout: Duration,
}

impl Context {
    pub fn new(
        format: OutputFormat,
        transport: TransportKind,
        connect_timeout: &str,
    ) -> CliResult<Self> {
        Ok(Self {
            format,
            transport,
            connect_timeout: parse_duration(connect_timeout)?,
        })
    }
}

/// Work done on an open channel.
pub trait Session {
    fn run<T: Transport>(self, channel: &Transceiver<T>, ctx: &Context) -> CliResult<i32>;
}

/// Open a channel to `addr` over the selected transport, run `session` on it,
/// then terminate the channel.
pub fn with_channel<S: Session>(
    ctx: &Context,
    addr: &str,
    config: ChannelConfig,
    session: S,
) -> CliResult<i32> {
    match ctx.transport {
        TransportKind::Tcp => {
            let tcp = TcpConfig {
                connect_timeout: ctx.connect_timeout,
                ..TcpConfig::default()
            };
            drive(TcpTransport::with_config(addr, tcp), config, ctx, session)
        }
        TransportKind::Udp => drive(UdpTransport::new(addr), config, ctx, session),
    }
}

fn drive<T: Transport, S: Session>(
    transport: T,
    config: ChannelConfig,
    ctx: &Context,
    session: S,
) -> CliResult<i32> {
    let channel = Transceiver::with_config(transport, config);
    channel
        .connect()
        .map_err(|err| channel_error("connect failed", err))?;
    let result = session.run(&channel, ctx);
    channel.terminate();
    result
}

/// Channel settings for commands that send and exit: no reconnects.
pub fn one_shot_config() -> ChannelConfig {
    ChannelConfig {
        max_reconnect_attempts: Some(0),
        ..ChannelConfig::default()
    }
}

#[derive(Args, Debug)]
pub struct SetpointArgs {
    /// Vehicle address (host:port).
    pub addr: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub roll: i16,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub pitch: i16,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub yaw: i16,
    /// Altitude setpoint.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub z: i16,
    /// Send the command this many times.
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
    /// Pause between repeated sends (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub interval: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AxisArg {
    RollPitch,
    Yaw,
    Altitude,
    Xy,
}

impl From<AxisArg> for GainAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::RollPitch => GainAxis::RollPitch,
            AxisArg::Yaw => GainAxis::Yaw,
            AxisArg::Altitude => GainAxis::Altitude,
            AxisArg::Xy => GainAxis::Xy,
        }
    }
}

#[derive(Args, Debug)]
pub struct GainsArgs {
    /// Vehicle address (host:port).
    pub addr: String,
    /// Control axis the gains apply to.
    #[arg(long, value_enum)]
    pub axis: AxisArg,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub p: i16,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub i: i16,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub d: i16,
    /// Second-derivative gain.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub dd: i16,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Vehicle address (host:port).
    pub addr: String,
    #[command(subcommand)]
    pub action: RequestAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    /// Switch the controller state.
    SwitchState { target: u8 },
    /// Switch the flight mode.
    SwitchMode { target: u8 },
    /// Store the current motor trim.
    StoreTrim,
    /// Clear the stored motor trim.
    ClearTrim,
    /// Shut the vehicle down.
    Shutdown,
    /// Enable the sensor pipeline.
    EnableSensors,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Vehicle address (host:port).
    pub addr: String,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Only print these kinds (names or numbers, comma-separated).
    #[arg(long, value_delimiter = ',', value_parser = parse_kind_arg)]
    pub kinds: Option<Vec<u8>>,
    /// Fail with exit code 124 if no frame arrives for this long.
    #[arg(long, value_name = "DURATION")]
    pub idle_timeout: Option<String>,
    /// Pause between reconnect attempts.
    #[arg(long, value_name = "DURATION", default_value = "1s")]
    pub reconnect_delay: String,
    /// Give up after this many failed reconnect attempts.
    #[arg(long)]
    pub max_reconnects: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Frame bytes as hex; spaces, `:` and `-` separators are ignored.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_kind_arg(input: &str) -> Result<u8, String> {
    parse_kind(input).ok_or_else(|| format!("unknown message kind: {input}"))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
