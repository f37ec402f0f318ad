use std::io::Read;

use tlmsync_decode::{LatestReadings, Reading};
use tlmsync_transport::{InputQueue, DEFAULT_INPUT_CAPACITY};

use crate::cmd::{Context, ReplayArgs};
use crate::exit::{io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_latest, print_readings};

pub fn run(args: ReplayArgs, ctx: &Context) -> CliResult<i32> {
    if args.chunk_size == 0 || args.chunk_size > DEFAULT_INPUT_CAPACITY {
        return Err(CliError::new(
            USAGE,
            format!("chunk size must be between 1 and {DEFAULT_INPUT_CAPACITY}"),
        ));
    }

    let data = read_input(&args)?;
    let mut pipeline = ctx.pipeline(InputQueue::new())?;
    let mut latest = LatestReadings::new();

    for chunk in data.chunks(args.chunk_size) {
        if args.latest {
            pipeline.feed(chunk, &mut latest);
        } else {
            let mut readings: Vec<Reading> = Vec::new();
            pipeline.feed(chunk, &mut readings);
            print_readings(&readings, ctx.format);
        }
    }

    if args.latest {
        print_latest(&latest, ctx.format);
    }

    let totals = pipeline.totals();
    tracing::info!(
        bytes = data.len(),
        frames = totals.sync.frames,
        misaligned = totals.sync.misaligned,
        stalls = totals.sync.stalls,
        dropped_bytes = totals.sync.dropped_bytes,
        readings = totals.decode.emitted,
        unrecognized = totals.decode.unrecognized,
        "replay complete"
    );

    Ok(SUCCESS)
}

fn read_input(args: &ReplayArgs) -> CliResult<Vec<u8>> {
    if args.input.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut data)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(data);
    }

    std::fs::read(&args.input).map_err(|err| {
        io_error(
            &format!("failed reading {}", args.input.display()),
            err,
        )
    })
}
