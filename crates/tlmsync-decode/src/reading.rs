use std::collections::BTreeMap;

use serde::Serialize;

/// A decoded value as delivered to a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Formatted value with unit suffix, e.g. `"3.7v"`.
    Text(String),
    /// Raw numeric value.
    Number(f64),
}

impl std::fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingValue::Text(text) => f.write_str(text),
            ReadingValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A named decoded value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub name: String,
    pub value: ReadingValue,
}

impl Reading {
    pub fn new(name: impl Into<String>, value: ReadingValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Receiver of decoded readings.
///
/// Called once per recognized record, in record order within a payload.
pub trait TelemetrySink {
    fn set_value(&mut self, name: &str, value: ReadingValue);
}

impl TelemetrySink for Vec<Reading> {
    fn set_value(&mut self, name: &str, value: ReadingValue) {
        self.push(Reading::new(name, value));
    }
}

/// Adapts a closure into a [`TelemetrySink`].
pub struct SinkFn<F>(pub F);

impl<F> TelemetrySink for SinkFn<F>
where
    F: FnMut(&str, ReadingValue),
{
    fn set_value(&mut self, name: &str, value: ReadingValue) {
        (self.0)(name, value)
    }
}

/// Keeps the most recent value per reading name.
#[derive(Debug, Default)]
pub struct LatestReadings {
    values: BTreeMap<String, Latest>,
}

#[derive(Debug)]
struct Latest {
    value: ReadingValue,
    updates: u64,
}

impl LatestReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent value for `name`.
    pub fn get(&self, name: &str) -> Option<&ReadingValue> {
        self.values.get(name).map(|latest| &latest.value)
    }

    /// How many times `name` has been set.
    pub fn updates(&self, name: &str) -> u64 {
        self.values.get(name).map_or(0, |latest| latest.updates)
    }

    /// Names and latest values, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReadingValue)> {
        self.values
            .iter()
            .map(|(name, latest)| (name.as_str(), &latest.value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TelemetrySink for LatestReadings {
    fn set_value(&mut self, name: &str, value: ReadingValue) {
        match self.values.get_mut(name) {
            Some(latest) => {
                latest.value = value;
                latest.updates += 1;
            }
            None => {
                self.values
                    .insert(name.to_string(), Latest { value, updates: 1 });
            }
        }
    }
}
