use std::ops::AddAssign;

use tlmsync_frame::{DecodeQueue, RawPayload};
use tracing::{debug, trace};

use crate::reading::TelemetrySink;
use crate::table::DecodeTable;

/// Counters for one or more decoded payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Payloads taken from the decode queue.
    pub payloads: u64,
    /// Records examined.
    pub records: u64,
    /// Readings handed to the sink.
    pub emitted: u64,
    /// Records whose `(identifier, function)` has no table entry.
    pub unrecognized: u64,
}

impl AddAssign for DecodeReport {
    fn add_assign(&mut self, rhs: Self) {
        self.payloads += rhs.payloads;
        self.records += rhs.records;
        self.emitted += rhs.emitted;
        self.unrecognized += rhs.unrecognized;
    }
}

/// Splits payloads into records and emits a reading for each recognized one.
#[derive(Debug)]
pub struct RecordDecoder {
    table: DecodeTable,
    totals: DecodeReport,
}

impl RecordDecoder {
    pub fn new(table: DecodeTable) -> Self {
        Self {
            table,
            totals: DecodeReport::default(),
        }
    }

    /// Decode the oldest queued payload. Returns `None` if the queue is empty.
    pub fn decode_next<S>(&mut self, queue: &mut DecodeQueue, sink: &mut S) -> Option<DecodeReport>
    where
        S: TelemetrySink + ?Sized,
    {
        let payload = queue.pop()?;
        Some(self.decode_payload(&payload, sink))
    }

    /// Decode every queued payload, oldest first.
    pub fn drain<S>(&mut self, queue: &mut DecodeQueue, sink: &mut S) -> DecodeReport
    where
        S: TelemetrySink + ?Sized,
    {
        let mut report = DecodeReport::default();
        while let Some(next) = self.decode_next(queue, sink) {
            report += next;
        }
        report
    }

    /// Decode one payload.
    pub fn decode_payload<S>(&mut self, payload: &RawPayload, sink: &mut S) -> DecodeReport
    where
        S: TelemetrySink + ?Sized,
    {
        let mut report = DecodeReport {
            payloads: 1,
            ..DecodeReport::default()
        };

        for record in payload.records() {
            report.records += 1;
            let identifier = record.identifier();
            let function = record.function();

            let Some(descriptor) = self.table.get(identifier, function) else {
                trace!(identifier, function, "no decode entry, skipping record");
                report.unrecognized += 1;
                continue;
            };

            match descriptor.decode(&record) {
                Some(value) => {
                    trace!(name = %descriptor.name, %value, "decoded reading");
                    sink.set_value(&descriptor.name, value);
                    report.emitted += 1;
                }
                None => {
                    debug!(
                        identifier,
                        function,
                        name = %descriptor.name,
                        "field layout outside record, skipping"
                    );
                    report.unrecognized += 1;
                }
            }
        }

        self.totals += report;
        report
    }

    pub fn table(&self) -> &DecodeTable {
        &self.table
    }

    /// Replace the decode table; counters are kept.
    pub fn set_table(&mut self, table: DecodeTable) {
        self.table = table;
    }

    /// Counters accumulated over every decoded payload.
    pub fn totals(&self) -> DecodeReport {
        self.totals
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new(DecodeTable::builtin())
    }
}
