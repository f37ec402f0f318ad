use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tlmsync_decode::{DecodeTable, FieldLayout, LatestReadings, Reading, ReadingValue, ValueFormat};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReadingOutput<'a> {
    name: &'a str,
    value: &'a ReadingValue,
    timestamp: String,
}

/// Print readings as they are decoded. Table output is one table per batch.
pub fn print_readings(readings: &[Reading], format: OutputFormat) {
    if readings.is_empty() {
        return;
    }
    match format {
        OutputFormat::Json => {
            let timestamp = now_unix_seconds();
            for reading in readings {
                print_json(&ReadingOutput {
                    name: &reading.name,
                    value: &reading.value,
                    timestamp: timestamp.clone(),
                });
            }
        }
        OutputFormat::Table => {
            let rows = readings
                .iter()
                .map(|r| vec![r.name.clone(), r.value.to_string()]);
            println!("{}", build_table(vec!["NAME", "VALUE"], rows));
        }
        OutputFormat::Pretty => {
            for reading in readings {
                println!("{} = {}", reading.name, reading.value);
            }
        }
    }
}

/// Print the last value seen for every reading name.
pub fn print_latest(latest: &LatestReadings, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let timestamp = now_unix_seconds();
            for (name, value) in latest.iter() {
                print_json(&ReadingOutput {
                    name,
                    value,
                    timestamp: timestamp.clone(),
                });
            }
        }
        OutputFormat::Table => {
            let rows = latest.iter().map(|(name, value)| {
                vec![
                    name.to_string(),
                    value.to_string(),
                    latest.updates(name).to_string(),
                ]
            });
            println!("{}", build_table(vec!["NAME", "VALUE", "UPDATES"], rows));
        }
        OutputFormat::Pretty => {
            for (name, value) in latest.iter() {
                println!("{name} = {value} ({} updates)", latest.updates(name));
            }
        }
    }
}

/// Print the active decode table.
pub fn print_decode_table(table: &DecodeTable, format: OutputFormat) {
    match format {
        OutputFormat::Json => match table.to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::warn!(error = %err, "failed serializing decode table"),
        },
        OutputFormat::Table => {
            let rows = table.entries().into_iter().map(|(identifier, function, d)| {
                vec![
                    identifier.to_string(),
                    function.to_string(),
                    d.name.clone(),
                    describe_field(&d.field),
                    describe_format(&d.format),
                ]
            });
            println!(
                "{}",
                build_table(vec!["IDENTIFIER", "FUNCTION", "NAME", "FIELD", "FORMAT"], rows)
            );
        }
        OutputFormat::Pretty => {
            for (identifier, function, d) in table.entries() {
                println!(
                    "({identifier}, {function}) -> {} [{}, {}]",
                    d.name,
                    describe_field(&d.field),
                    describe_format(&d.format)
                );
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn build_table(header: Vec<&str>, rows: impl Iterator<Item = Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    table
}

fn describe_field(field: &FieldLayout) -> String {
    match field {
        FieldLayout::F32Be { offset } => format!("f32 BE @{offset}"),
        FieldLayout::U32Be { offset } => format!("u32 BE @{offset}"),
        FieldLayout::I32Be { offset } => format!("i32 BE @{offset}"),
    }
}

fn describe_format(format: &ValueFormat) -> String {
    match format {
        ValueFormat::Suffix { unit } => format!("suffix \"{unit}\""),
        ValueFormat::Raw => "raw".to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
