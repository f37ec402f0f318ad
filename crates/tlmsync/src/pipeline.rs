use std::ops::AddAssign;

use tlmsync_decode::{DecodeReport, DecodeTable, RecordDecoder, TelemetrySink};
use tlmsync_frame::{FrameError, FrameSynchronizer, SyncConfig, SyncStats};
use tlmsync_transport::InputQueue;
use tracing::debug;

/// What one [`Pipeline::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sync: SyncStats,
    pub decode: DecodeReport,
}

impl AddAssign for TickReport {
    fn add_assign(&mut self, rhs: Self) {
        self.sync += rhs.sync;
        self.decode += rhs.decode;
    }
}

/// One independent stream: a frame synchronizer feeding a record decoder.
///
/// Pipelines share nothing, so several links can be decoded side by side.
#[derive(Debug)]
pub struct Pipeline {
    sync: FrameSynchronizer,
    decoder: RecordDecoder,
}

impl Pipeline {
    /// A pipeline over a fresh input queue with default sync settings.
    pub fn new(table: DecodeTable) -> Self {
        Self {
            sync: FrameSynchronizer::new(InputQueue::new()),
            decoder: RecordDecoder::new(table),
        }
    }

    /// A pipeline over an existing input queue with explicit sync settings.
    pub fn with_config(
        input: InputQueue,
        config: SyncConfig,
        table: DecodeTable,
    ) -> Result<Self, FrameError> {
        Ok(Self {
            sync: FrameSynchronizer::with_config(input, config)?,
            decoder: RecordDecoder::new(table),
        })
    }

    /// Producer-side handle; clone it into the reader.
    pub fn input(&self) -> InputQueue {
        self.sync.input().clone()
    }

    /// Run the synchronizer over buffered input, then decode every queued payload.
    pub fn tick<S>(&mut self, sink: &mut S) -> TickReport
    where
        S: TelemetrySink + ?Sized,
    {
        let sync = self.sync.run();
        let decode = self.decoder.drain(self.sync.decode_queue_mut(), sink);
        if sync.frames > 0 || sync.misaligned > 0 || sync.stalls > 0 {
            debug!(
                frames = sync.frames,
                misaligned = sync.misaligned,
                stalls = sync.stalls,
                emitted = decode.emitted,
                "tick"
            );
        }
        TickReport { sync, decode }
    }

    /// Append `bytes` to the input queue and tick.
    ///
    /// Input larger than the queue's free space is pushed in pieces with a
    /// tick after each, so nothing fed here is evicted before it is scanned.
    /// The returned report covers every tick.
    pub fn feed<S>(&mut self, mut bytes: &[u8], sink: &mut S) -> TickReport
    where
        S: TelemetrySink + ?Sized,
    {
        let input = self.input();
        let mut report = TickReport::default();
        loop {
            // A queue still full after a tick holds an unfinished frame
            // wider than the queue; it is lost either way.
            let room = match input.capacity().saturating_sub(input.len()) {
                0 => input.capacity(),
                room => room,
            };
            let (now, rest) = bytes.split_at(room.min(bytes.len()));
            input.extend(now);
            report += self.tick(sink);
            bytes = rest;
            if bytes.is_empty() {
                return report;
            }
        }
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.sync
    }

    pub fn decoder(&self) -> &RecordDecoder {
        &self.decoder
    }

    /// Counters accumulated over every tick.
    pub fn totals(&self) -> TickReport {
        TickReport {
            sync: self.sync.stats(),
            decode: self.decoder.totals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;
    use tlmsync_decode::{LatestReadings, Reading, ReadingValue};
    use tlmsync_frame::{encode_frame, encode_stream, RecordSpec, MARKER};
    use tlmsync_transport::StreamPump;

    use super::*;

    fn wire(frames: &[&[RecordSpec]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_stream(frames, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn bytes_to_readings() {
        let mut pipeline = Pipeline::new(DecodeTable::builtin());
        let mut readings = Vec::new();

        let report = pipeline.feed(
            &wire(&[&[RecordSpec::float(0, 1, 0, 3.7), RecordSpec::float(0, 1, 1, 4.1)]]),
            &mut readings,
        );

        assert_eq!(report.sync.frames, 1);
        assert_eq!(report.decode.emitted, 2);
        assert_eq!(
            readings,
            vec![
                Reading::new("battery_1_voltage", ReadingValue::Text("3.7v".into())),
                Reading::new("battery_2_voltage", ReadingValue::Text("4.1v".into())),
            ]
        );
    }

    #[test]
    fn corrupt_frame_does_not_stop_stream() {
        let mut bytes = wire(&[&[RecordSpec::float(0, 1, 0, 1.0)]]);
        // Misaligned frame: seven stray bytes, then a marker.
        bytes.extend_from_slice(&[0x01; 7]);
        bytes.extend_from_slice(&MARKER);
        let mut tail = BytesMut::new();
        encode_frame(&[RecordSpec::float(0, 1, 0, 2.0)], &mut tail).unwrap();
        // The tail's leading marker directly follows the previous one.
        bytes.extend_from_slice(&tail[MARKER.len()..]);

        let mut pipeline = Pipeline::new(DecodeTable::builtin());
        let mut latest = LatestReadings::new();
        let report = pipeline.feed(&bytes, &mut latest);

        assert_eq!(report.sync.frames, 2);
        assert_eq!(report.sync.misaligned, 1);
        assert_eq!(latest.get("battery_1_voltage"), Some(&ReadingValue::Text("2.0v".into())));
        assert_eq!(latest.updates("battery_1_voltage"), 2);
    }

    #[test]
    fn byte_at_a_time_matches_bulk() {
        let bytes = wire(&[
            &[RecordSpec::float(0, 1, 0, 3.3)],
            &[RecordSpec::float(0, 1, 1, 3.4), RecordSpec::float(0, 9, 9, 0.0)],
            &[RecordSpec::float(0, 1, 0, 3.5)],
        ]);

        let mut bulk = Pipeline::new(DecodeTable::builtin());
        let mut expected = Vec::new();
        bulk.feed(&bytes, &mut expected);

        let mut slow = Pipeline::new(DecodeTable::builtin());
        let mut actual = Vec::new();
        for byte in &bytes {
            slow.feed(std::slice::from_ref(byte), &mut actual);
        }

        assert_eq!(expected.len(), 3);
        assert_eq!(actual, expected);
    }

    #[test]
    fn independent_pipelines() {
        let mut a = Pipeline::new(DecodeTable::builtin());
        let mut b = Pipeline::new(DecodeTable::builtin());
        let bytes = wire(&[&[RecordSpec::float(0, 1, 0, 1.0)]]);

        let mut sink_a = Vec::new();
        let mut sink_b = Vec::new();
        a.feed(&bytes, &mut sink_a);
        b.feed(&bytes[..15], &mut sink_b);

        assert_eq!(sink_a.len(), 1);
        assert!(sink_b.is_empty());
        assert_eq!(a.totals().sync.frames, 1);
        assert_eq!(b.totals().sync.frames, 0);
    }

    #[test]
    fn pumped_from_reader_thread() {
        let frames: Vec<[RecordSpec; 1]> = (0..50)
            .map(|i| [RecordSpec::float(0, 1, 0, i as f32)])
            .collect();
        let refs: Vec<&[RecordSpec]> = frames.iter().map(|f| f.as_slice()).collect();
        let bytes = wire(&refs);

        let mut pipeline = Pipeline::new(DecodeTable::builtin());
        let handle = StreamPump::spawn(Cursor::new(bytes), pipeline.input()).unwrap();
        assert_eq!(handle.join().unwrap().unwrap(), (50 * 20 + 10) as u64);

        let mut latest = LatestReadings::new();
        pipeline.tick(&mut latest);
        assert_eq!(latest.updates("battery_1_voltage"), 50);
        assert_eq!(latest.get("battery_1_voltage"), Some(&ReadingValue::Text("49.0v".into())));
    }

    #[test]
    fn feed_larger_than_input_queue_loses_nothing() {
        let frames: Vec<[RecordSpec; 1]> = (0..1000)
            .map(|i| [RecordSpec::float(0, 1, (i % 2) as u8, i as f32)])
            .collect();
        let refs: Vec<&[RecordSpec]> = frames.iter().map(|f| f.as_slice()).collect();
        let bytes = wire(&refs);
        assert!(bytes.len() > InputQueue::new().capacity());

        let mut pipeline = Pipeline::new(DecodeTable::builtin());
        let mut readings = Vec::new();
        let report = pipeline.feed(&bytes, &mut readings);

        assert_eq!(readings.len(), 1000);
        assert_eq!(report.sync.frames, 1000);
        assert_eq!(report.sync.overruns, 0);
        assert_eq!(report.decode.emitted, 1000);
        assert_eq!(readings[999].value, ReadingValue::Text("999.0v".into()));
        assert_eq!(pipeline.input().evicted(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SyncConfig {
            max_check_size: 1,
            ..SyncConfig::default()
        };
        let result = Pipeline::with_config(InputQueue::new(), config, DecodeTable::new());
        assert!(matches!(result, Err(FrameError::InvalidConfig(_))));
    }
}
