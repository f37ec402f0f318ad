//! Byte-code hand-off between a serial reader and the frame synchronizer.
//!
//! This is the lowest layer of tlmsync. A reader (usually [`StreamPump`] on
//! its own thread) appends raw byte codes to an [`InputQueue`]; the frame
//! synchronizer holds a clone of the same queue and consumes it strictly
//! front-to-back.
//!
//! Opening and configuring the physical port is left to the caller: anything
//! implementing [`std::io::Read`] can be pumped.

pub mod error;
pub mod pump;
pub mod queue;

pub use error::{Result, TransportError};
pub use pump::{StreamPump, READ_CHUNK_SIZE};
pub use queue::{InputGuard, InputQueue, DEFAULT_INPUT_CAPACITY, MIN_INPUT_CAPACITY};
