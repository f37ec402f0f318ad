use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tlmsync_frame::{Record, VALUE_OFFSET};

use crate::error::{DecodeError, Result};
use crate::reading::ReadingValue;

/// Largest decode table file accepted by [`DecodeTable::from_file`].
pub const MAX_TABLE_FILE_SIZE: usize = 256 * 1024;

fn default_offset() -> usize {
    VALUE_OFFSET
}

/// Where and how a record's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldLayout {
    /// Big-endian IEEE-754 single.
    F32Be {
        #[serde(default = "default_offset")]
        offset: usize,
    },
    /// Big-endian unsigned 32-bit integer.
    U32Be {
        #[serde(default = "default_offset")]
        offset: usize,
    },
    /// Big-endian signed 32-bit integer.
    I32Be {
        #[serde(default = "default_offset")]
        offset: usize,
    },
}

impl Default for FieldLayout {
    fn default() -> Self {
        FieldLayout::F32Be {
            offset: VALUE_OFFSET,
        }
    }
}

/// How a decoded value is presented to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueFormat {
    /// Value text followed by `unit`, e.g. `3.7v`, `12.0v`, `1.0E-4v`.
    ///
    /// Floats are written the way telemetry consumers expect them: shortest
    /// round-trip digits, always with a fractional part, in `d.dddE±n` form
    /// outside `[1e-3, 1e7)`, and `Infinity`/`NaN` for non-finite values.
    Suffix { unit: String },
    /// The number itself.
    #[default]
    Raw,
}

/// Decoding rule for one `(identifier, function)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeDescriptor {
    pub name: String,
    pub field: FieldLayout,
    pub format: ValueFormat,
}

enum FieldValue {
    Float(f32),
    Unsigned(u32),
    Signed(i32),
}

impl DecodeDescriptor {
    /// A big-endian float at the standard offset with a unit suffix.
    pub fn float_with_unit(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: FieldLayout::default(),
            format: ValueFormat::Suffix { unit: unit.into() },
        }
    }

    /// Read and format this descriptor's field from `record`.
    ///
    /// Returns `None` if the layout reaches past the end of the record.
    pub fn decode(&self, record: &Record<'_>) -> Option<ReadingValue> {
        let value = match self.field {
            FieldLayout::F32Be { offset } => FieldValue::Float(record.f32_be(offset)?),
            FieldLayout::U32Be { offset } => FieldValue::Unsigned(record.u32_be(offset)?),
            FieldLayout::I32Be { offset } => FieldValue::Signed(record.i32_be(offset)?),
        };

        Some(match &self.format {
            ValueFormat::Suffix { unit } => ReadingValue::Text(match value {
                FieldValue::Float(v) => format!("{}{unit}", float_text(v)),
                FieldValue::Unsigned(v) => format!("{v}{unit}"),
                FieldValue::Signed(v) => format!("{v}{unit}"),
            }),
            ValueFormat::Raw => ReadingValue::Number(match value {
                FieldValue::Float(v) => widen(v),
                FieldValue::Unsigned(v) => f64::from(v),
                FieldValue::Signed(v) => f64::from(v),
            }),
        })
    }
}

fn float_text(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        return if text.contains('.') { text } else { text + ".0" };
    }

    // `{:e}` yields the shortest digits as `d[.ddd]e[-]n`.
    let exp = format!("{value:e}");
    let (mantissa, exponent) = exp.split_once('e').unwrap_or((exp.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exponent}")
    } else {
        format!("{mantissa}.0E{exponent}")
    }
}

/// Widen through the shortest decimal form so `3.7f32` becomes `3.7f64`.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableEntry {
    identifier: u16,
    function: u8,
    name: String,
    #[serde(default)]
    field: FieldLayout,
    #[serde(default)]
    format: ValueFormat,
}

#[derive(Serialize)]
struct TableEntryRef<'a> {
    identifier: u16,
    function: u8,
    name: &'a str,
    field: &'a FieldLayout,
    format: &'a ValueFormat,
}

/// Sparse mapping from `(identifier, function)` to a decode rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeTable {
    entries: HashMap<(u16, u8), DecodeDescriptor>,
}

impl DecodeTable {
    /// An empty table; every record is ignored.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference table: power distribution board battery voltages.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(1, 0, DecodeDescriptor::float_with_unit("battery_1_voltage", "v"));
        table.insert(1, 1, DecodeDescriptor::float_with_unit("battery_2_voltage", "v"));
        table
    }

    /// Add or replace a rule, returning the previous one.
    pub fn insert(
        &mut self,
        identifier: u16,
        function: u8,
        descriptor: DecodeDescriptor,
    ) -> Option<DecodeDescriptor> {
        self.entries.insert((identifier, function), descriptor)
    }

    pub fn get(&self, identifier: u16, function: u8) -> Option<&DecodeDescriptor> {
        self.entries.get(&(identifier, function))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules sorted by `(identifier, function)`.
    pub fn entries(&self) -> Vec<(u16, u8, &DecodeDescriptor)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(&(identifier, function), descriptor)| (identifier, function, descriptor))
            .collect();
        entries.sort_unstable_by_key(|&(identifier, function, _)| (identifier, function));
        entries
    }

    /// Parse a table from a JSON array of entries.
    ///
    /// ```json
    /// [{ "identifier": 1, "function": 0, "name": "battery_1_voltage",
    ///    "field": { "type": "f32_be", "offset": 3 },
    ///    "format": { "kind": "suffix", "unit": "v" } }]
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Vec<TableEntry> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for entry in parsed {
            if table.get(entry.identifier, entry.function).is_some() {
                return Err(DecodeError::DuplicateEntry {
                    identifier: entry.identifier,
                    function: entry.function,
                });
            }
            let descriptor = DecodeDescriptor {
                name: entry.name,
                field: entry.field,
                format: entry.format,
            };
            table.insert(entry.identifier, entry.function, descriptor);
        }
        Ok(table)
    }

    /// Load a table from a JSON file of at most [`MAX_TABLE_FILE_SIZE`] bytes.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| DecodeError::LoadFailed(format!("{}: {err}", path.display())))?;

        let read_limit = u64::try_from(MAX_TABLE_FILE_SIZE + 1).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| DecodeError::LoadFailed(format!("{}: {err}", path.display())))?;
        if content.len() > MAX_TABLE_FILE_SIZE {
            return Err(DecodeError::LoadFailed(format!(
                "decode table too large (max {MAX_TABLE_FILE_SIZE} bytes): {}",
                path.display()
            )));
        }

        Self::from_json(&content)
    }

    /// Serialize the table in the format accepted by [`from_json`](Self::from_json).
    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<TableEntryRef<'_>> = self
            .entries()
            .into_iter()
            .map(|(identifier, function, descriptor)| TableEntryRef {
                identifier,
                function,
                name: &descriptor.name,
                field: &descriptor.field,
                format: &descriptor.format,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}
