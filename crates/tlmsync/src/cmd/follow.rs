use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tlmsync_decode::Reading;
use tlmsync_transport::{InputQueue, StreamPump};

use crate::cmd::{Context, FollowArgs};
use crate::exit::{io_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::print_readings;

pub fn run(args: FollowArgs, ctx: &Context) -> CliResult<i32> {
    let interval = parse_interval(&args.interval)?;
    let file = std::fs::File::open(&args.path)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;

    let input = InputQueue::new();
    let mut pipeline = ctx.pipeline(input.clone())?;
    let pump = StreamPump::spawn(file, input)
        .map_err(|err| CliError::new(INTERNAL, format!("reader thread failed: {err}")))?;
    tracing::info!(path = ?args.path, ?interval, "following stream");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let reader_done = pump.is_finished();

        let mut readings: Vec<Reading> = Vec::new();
        pipeline.tick(&mut readings);
        if let Some(count) = args.count {
            readings.truncate(count.saturating_sub(printed));
        }
        print_readings(&readings, ctx.format);
        printed = printed.saturating_add(readings.len());

        if args.count.is_some_and(|count| printed >= count) {
            return Ok(SUCCESS);
        }
        if reader_done {
            break;
        }
        std::thread::sleep(interval);
    }

    if pump.is_finished() {
        match pump.join() {
            Ok(Ok(total)) => tracing::info!(total, "stream ended"),
            Ok(Err(err)) => return Err(transport_error("read failed", err)),
            Err(_) => return Err(CliError::new(INTERNAL, "reader thread panicked")),
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_interval(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "interval must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, true)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid interval value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "interval must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_units() {
        assert_eq!(parse_interval("50ms").unwrap(), Duration::from_millis(50));
        assert_eq!(parse_interval("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_interval("250").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn parse_interval_invalid() {
        assert!(parse_interval("0ms").is_err());
        assert!(parse_interval("").is_err());
        assert!(parse_interval("fast").is_err());
    }
}
