use std::io::{ErrorKind, Read};
use std::thread::JoinHandle;

use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::queue::InputQueue;

/// Bytes requested from the reader per `read` call.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Copies bytes from any `Read` stream into an [`InputQueue`].
///
/// The pump has no framing knowledge; it only moves byte codes.
pub struct StreamPump<R> {
    inner: R,
    queue: InputQueue,
    total: u64,
}

impl<R: Read> StreamPump<R> {
    /// Create a pump feeding `queue` from `inner`.
    pub fn new(inner: R, queue: InputQueue) -> Self {
        Self {
            inner,
            queue,
            total: 0,
        }
    }

    /// Perform one read and append whatever arrived.
    ///
    /// Returns `Err(TransportError::Closed)` at end of stream.
    pub fn pump_once(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                return Err(TransportError::Closed);
            }

            self.queue.extend(&chunk[..read]);
            self.total += read as u64;
            trace!(read, total = self.total, "pumped bytes");
            return Ok(read);
        }
    }

    /// Pump until end of stream, returning the total number of bytes moved.
    pub fn run_until_closed(&mut self) -> Result<u64> {
        loop {
            match self.pump_once() {
                Ok(_) => {}
                Err(TransportError::Closed) => {
                    debug!(total = self.total, "input stream closed");
                    return Ok(self.total);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Bytes pumped so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the pump and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Send + 'static> StreamPump<R> {
    /// Run the pump on a dedicated reader thread until end of stream.
    pub fn spawn(inner: R, queue: InputQueue) -> std::io::Result<JoinHandle<Result<u64>>> {
        std::thread::Builder::new()
            .name("tlmsync-pump".to_string())
            .spawn(move || StreamPump::new(inner, queue).run_until_closed())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn pumps_everything_until_eof() {
        let queue = InputQueue::new();
        let data: Vec<u8> = (0..3000u32).map(|i| (i % 256) as u8).collect();

        let mut pump = StreamPump::new(Cursor::new(data.clone()), queue.clone());
        let total = pump.run_until_closed().unwrap();

        assert_eq!(total, 3000);
        assert_eq!(queue.len(), 3000);
        assert_eq!(queue.lock().copy_range(0, 3000), Some(data));
    }

    #[test]
    fn pump_once_reports_closed_on_empty_reader() {
        let queue = InputQueue::new();
        let mut pump = StreamPump::new(Cursor::new(Vec::<u8>::new()), queue);
        assert!(matches!(pump.pump_once(), Err(TransportError::Closed)));
    }

    #[test]
    fn interrupted_read_retries() {
        let queue = InputQueue::new();
        let reader = InterruptedThenData {
            interrupted: false,
            bytes: vec![0xFF, 0xFE],
            pos: 0,
        };
        let mut pump = StreamPump::new(reader, queue.clone());

        assert_eq!(pump.pump_once().unwrap(), 2);
        assert_eq!(queue.lock().copy_range(0, 2), Some(vec![0xFF, 0xFE]));
    }

    #[test]
    fn io_errors_propagate() {
        let queue = InputQueue::new();
        let mut pump = StreamPump::new(FailingReader, queue);
        let err = pump.run_until_closed().unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn spawned_pump_feeds_shared_queue() {
        let queue = InputQueue::new();
        let handle = StreamPump::spawn(Cursor::new(vec![1u8; 64]), queue.clone()).unwrap();
        assert_eq!(handle.join().unwrap().unwrap(), 64);
        assert_eq!(queue.len(), 64);
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }
}
