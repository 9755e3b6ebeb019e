//! Output sinks for the SEQ encoder.
//!
//! The encoder is generic over [`Write`](trait.Write.html), so the same code path can produce
//! an in-memory buffer, stream into a file, or just count bytes.

use crate::prelude::*;

pub type WriteResult<W> = StdResult<(), <W as Write>::Error>;

/// A byte sink the SEQ encoder writes into.
pub trait Write {
    type Error;
    fn write(&mut self, buf: &[u8]) -> WriteResult<Self>;
}

impl Write for Vec<u8> {
    type Error = Infallible;
    fn write(&mut self, buf: &[u8]) -> WriteResult<Self> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

/// Adapts any `std::io::Write` into a SEQ sink.
///
/// The encoder emits many tiny writes, so the wrapped writer should usually be buffered.
pub struct IoWrap<T>(pub T);
impl<T: io::Write> Write for IoWrap<T> {
    type Error = io::Error;
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut self.0, buf)
    }
}

/// Counts bytes without storing them, used to size output buffers up front.
pub(crate) struct WriteCounter(pub u64);
impl Write for WriteCounter {
    type Error = Infallible;
    fn write(&mut self, buf: &[u8]) -> WriteResult<Self> {
        self.0 += buf.len() as u64;
        Ok(())
    }
}
