use tlmsync_frame::{MARKER, MARKER_LEN, RECORD_LEN};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("tlmsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: tlmsync");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("TLMSYNC_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("TLMSYNC_BUILD_PROFILE").unwrap_or("unknown")
    );
    let marker = MARKER
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("marker: {marker} ({MARKER_LEN} bytes)");
    println!("record_len: {RECORD_LEN}");

    Ok(SUCCESS)
}
