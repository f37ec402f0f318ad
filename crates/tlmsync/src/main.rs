mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use tlmsync_frame::{SyncConfig, DEFAULT_MAX_CHECK_SIZE};

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tlmsync", version, about = "Serial telemetry frame decoder")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Bytes scanned past a marker before resynchronizing (at most 8172,
    /// so the window fits the 8192-byte input buffer).
    #[arg(
        long,
        value_name = "BYTES",
        env = "TLMSYNC_MAX_CHECK_SIZE",
        default_value_t = DEFAULT_MAX_CHECK_SIZE,
        global = true
    )]
    max_check_size: usize,

    /// JSON decode table replacing the built-in one.
    #[arg(long, value_name = "FILE", env = "TLMSYNC_TABLE", global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = Context {
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
        sync_config: SyncConfig {
            max_check_size: cli.max_check_size,
            ..SyncConfig::default()
        },
        table: cli.table,
    };

    match cmd::run(cli.command, &ctx) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_subcommand() {
        let cli = Cli::try_parse_from(["tlmsync", "replay", "capture.bin", "--chunk-size", "1"])
            .expect("replay args should parse");
        assert!(matches!(cli.command, Command::Replay(_)));
        assert_eq!(cli.max_check_size, DEFAULT_MAX_CHECK_SIZE);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tlmsync",
            "table",
            "--max-check-size",
            "200",
            "--format",
            "json",
        ])
        .expect("global flags should parse");
        assert_eq!(cli.max_check_size, 200);
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn encode_requires_records() {
        let err = Cli::try_parse_from(["tlmsync", "encode"]).expect_err("records are required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
