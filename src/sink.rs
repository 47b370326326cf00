use std::io;

use crate::{GrowableBuffer, Result};

/// Answer to a delivered chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
	/// Chunk taken, send more
	Ready,
	/// Chunk taken, but the receiver is above its high-water mark
	/// and would rather be drained first
	Full,
}

/**
Receiving end of a chunked byte source.

Delivery is synchronous: by the time `deliver()` returns, the chunk has been stored.
*/
pub trait Sink {
	fn deliver(&mut self, chunk: &[u8]) -> Result<Ack>;
}

impl Sink for GrowableBuffer {
	fn deliver(&mut self, chunk: &[u8]) -> Result<Ack> {
		self.append(chunk)?;
		Ok(Ack::Ready)
	}
}

impl io::Write for GrowableBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.append(buf)?;
		Ok(buf.len())
	}
	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/**
Adapter that feeds a borrowed [`GrowableBuffer`] from a chunked source.

Optionally signals back-pressure with [`Ack::Full`] once the buffer holds
at least `high_water_mark` bytes; chunks are stored regardless.

```
use growbuf::{Ack, BufferSink, GrowableBuffer, Sink};

# fn main() -> growbuf::Result<()> {
let mut buf = GrowableBuffer::new()?;
let mut sink = BufferSink::new(&mut buf).high_water_mark(4);
assert_eq!(sink.deliver(b"ab")?, Ack::Ready);
assert_eq!(sink.deliver(b"cd")?, Ack::Full);
assert_eq!(sink.delivered(), 4);
assert_eq!(buf.consume(None), Some(b"abcd".to_vec()));
# Ok(())
# }
```
*/
pub struct BufferSink<'a> {
	buf: &'a mut GrowableBuffer,
	high_water_mark: Option<usize>,
	delivered: usize,
}

impl<'a> BufferSink<'a> {
	pub fn new(buf: &'a mut GrowableBuffer) -> Self {
		BufferSink {
			buf,
			high_water_mark: None,
			delivered: 0,
		}
	}

	pub fn high_water_mark(mut self, limit: usize) -> Self {
		self.high_water_mark = Some(limit);
		self
	}

	/// Total bytes delivered through this adapter
	pub fn delivered(&self) -> usize {
		self.delivered
	}

	pub fn get_ref(&self) -> &GrowableBuffer {
		&*self.buf
	}

	pub fn get_mut(&mut self) -> &mut GrowableBuffer {
		&mut *self.buf
	}
}

impl Sink for BufferSink<'_> {
	fn deliver(&mut self, chunk: &[u8]) -> Result<Ack> {
		self.buf.append(chunk)?;
		self.delivered += chunk.len();
		Ok(match self.high_water_mark {
			Some(limit) if self.buf.len() >= limit => Ack::Full,
			_ => Ack::Ready,
		})
	}
}

impl io::Write for BufferSink<'_> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.deliver(buf)?;
		Ok(buf.len())
	}
	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}
