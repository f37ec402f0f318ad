use clap::{Args, Subcommand};
use std::path::PathBuf;

use tlmsync::Pipeline;
use tlmsync_decode::DecodeTable;
use tlmsync_frame::SyncConfig;
use tlmsync_transport::InputQueue;

use crate::exit::{decode_error, frame_error, CliResult};
use crate::output::OutputFormat;

pub mod encode;
pub mod follow;
pub mod replay;
pub mod table;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a captured byte stream.
    Replay(ReplayArgs),
    /// Decode a live stream (device, FIFO or capture file) until EOF or Ctrl-C.
    Follow(FollowArgs),
    /// Write one framed batch of float records to stdout.
    Encode(EncodeArgs),
    /// Show the active decode table.
    Table(TableArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every subcommand.
pub struct Context {
    pub format: OutputFormat,
    pub sync_config: SyncConfig,
    pub table: Option<PathBuf>,
}

impl Context {
    /// The decode table from `--table`, or the built-in one.
    pub fn load_table(&self) -> CliResult<DecodeTable> {
        match &self.table {
            Some(path) => {
                DecodeTable::from_file(path).map_err(|err| decode_error("table load failed", err))
            }
            None => Ok(DecodeTable::builtin()),
        }
    }

    pub fn pipeline(&self, input: InputQueue) -> CliResult<Pipeline> {
        let table = self.load_table()?;
        Pipeline::with_config(input, self.sync_config, table)
            .map_err(|err| frame_error("invalid configuration", err))
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Replay(args) => replay::run(args, ctx),
        Command::Follow(args) => follow::run(args, ctx),
        Command::Encode(args) => encode::run(args),
        Command::Table(args) => table::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file to decode, or `-` for stdin.
    pub input: PathBuf,
    /// Bytes handed to the synchronizer per tick.
    #[arg(long, default_value = "64")]
    pub chunk_size: usize,
    /// Print only the last value of each reading at the end.
    #[arg(long)]
    pub latest: bool,
}

#[derive(Args, Debug)]
pub struct FollowArgs {
    /// Path to read from; must already be configured (baud rate etc.).
    pub path: PathBuf,
    /// Tick interval (e.g. 50ms, 1s).
    #[arg(long, default_value = "50ms")]
    pub interval: String,
    /// Exit after printing N readings.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Record as ID_HI:ID_LO:FUNCTION:VALUE (bytes accept 0x hex). Repeatable.
    #[arg(long = "record", value_name = "SPEC", required = true)]
    pub records: Vec<String>,
    /// Repeat the frame N times, sharing markers.
    #[arg(long, default_value = "1")]
    pub frames: usize,
}

#[derive(Args, Debug, Default)]
pub struct TableArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
