use crate::cmd::{Context, TableArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::print_decode_table;

pub fn run(_args: TableArgs, ctx: &Context) -> CliResult<i32> {
    let table = ctx.load_table()?;
    tracing::debug!(entries = table.len(), source = ?ctx.table, "decode table loaded");
    print_decode_table(&table, ctx.format);
    Ok(SUCCESS)
}
