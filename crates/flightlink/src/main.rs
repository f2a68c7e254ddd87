mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, Context, TransportKind};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "flightlink", version, about = "Ground-station link CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true, env = "FLIGHTLINK_FORMAT")]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        global = true,
        env = "FLIGHTLINK_LOG_FORMAT"
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        global = true,
        env = "FLIGHTLINK_LOG_LEVEL"
    )]
    log_level: LogLevel,

    /// Link transport.
    #[arg(
        long,
        value_name = "KIND",
        default_value = "tcp",
        global = true,
        env = "FLIGHTLINK_TRANSPORT"
    )]
    transport: TransportKind,

    /// Connect timeout (e.g. 5s, 500ms).
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "5s",
        global = true,
        env = "FLIGHTLINK_CONNECT_TIMEOUT"
    )]
    connect_timeout: String,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = Context::new(format, cli.transport, &cli.connect_timeout)
        .and_then(|ctx| cmd::run(cli.command, &ctx));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
