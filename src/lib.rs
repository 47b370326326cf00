/*!
Growable in-memory byte buffer.

[`GrowableBuffer`] accepts chunks of bytes of any length (directly, through [`Sink`],
or as an [`io::Write`](std::io::Write)), hands them back in FIFO order,
and also lets you poke and peek fixed-width numbers at arbitrary offsets,
which comes handy when assembling or inspecting binary protocol frames.

```
use growbuf::GrowableBufferBuilder;

# fn main() -> growbuf::Result<()> {
let mut buf = GrowableBufferBuilder::new()
	.capacity(16)
	.increment(16)
	.build()?;

buf.append(b"\x01\x02")?;
// patch a length prefix in front of the payload
buf.write_u16_be(0xcafe)?
	.write_u24_le_at(7, 0)?;
assert_eq!(buf.read_u24_le(0), 7);
assert_eq!(buf.len(), 4);

assert_eq!(buf.consume(Some(3)), Some(vec![7, 0, 0]));
assert_eq!(buf.consume(None), Some(vec![0xfe]));
assert_eq!(buf.consume(None), None);
# Ok(())
# }
```

The buffer is not synchronized: wrap it in a mutex or keep it on a single thread.
Slices returned by [`peek()`](GrowableBuffer::peek) borrow the buffer,
so the borrow checker already rules out using them across a reallocation.
*/

#[macro_use]
extern crate quick_error;

use std::cmp;
use std::fmt;
use std::io::{self, Read};

// https://github.com/rust-lang/rust/issues/54236
use copy_in_place::copy_in_place;
use memchr::memchr;
use tracing::{debug, trace, warn};

mod error;
pub use error::{Error, Result};

pub mod codec;
pub use codec::{NumKind, Value};

pub mod text;
pub use text::Encoding;

mod sink;
pub use sink::*;

mod typed;

pub const DEFAULT_INITIAL_SIZE: usize = 8 * 1024;
pub const DEFAULT_INCREMENT_AMOUNT: usize = 8 * 1024;

pub struct GrowableBuffer {
	// `buf.len()` is the capacity, bytes past `size` are slack
	buf: Vec<u8>,
	incr: usize,
	size: usize,
}

// storage itself is left out, slack would only add noise
impl fmt::Debug for GrowableBuffer {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("GrowableBuffer")
			.field("size", &self.size)
			.field("capacity", &self.buf.len())
			.field("increment", &self.incr)
			.finish()
	}
}

pub struct GrowableBufferBuilder {
	bufsize: usize,
	incr: usize,
}
impl GrowableBufferBuilder {
	pub fn new() -> Self {
		GrowableBufferBuilder {
			bufsize: DEFAULT_INITIAL_SIZE,
			incr: DEFAULT_INCREMENT_AMOUNT,
		}
	}

	/// Initial capacity; zero is fine, first write will allocate.
	pub fn capacity(mut self, bufsize: usize) -> Self {
		self.bufsize = bufsize;
		self
	}

	/// Granularity of growth: capacity always increases by a multiple of this.
	pub fn increment(mut self, incr: usize) -> Self {
		if incr == 0 {
			panic!("non-positive buffer increments requested")
		}
		self.incr = incr;
		self
	}

	pub fn build(self) -> Result<GrowableBuffer> {
		Ok(GrowableBuffer {
			buf: alloc(self.bufsize)?,
			incr: self.incr,
			size: 0,
		})
	}
}
impl Default for GrowableBufferBuilder {
	fn default() -> Self { Self::new() }
}

/// Panics if the default storage cannot be allocated, just like `Vec` would.
impl Default for GrowableBuffer {
	fn default() -> Self {
		match GrowableBuffer::new() {
			Ok(buf) => buf,
			Err(err) => panic!("failed to allocate default buffer: {}", err),
		}
	}
}

fn alloc(size: usize) -> Result<Vec<u8>> {
	let mut buf = Vec::new();
	if let Err(err) = buf.try_reserve_exact(size) {
		warn!(size, "failed to allocate buffer");
		return Err(err.into());
	}
	buf.resize(size, 0);
	Ok(buf)
}

impl GrowableBuffer {
	pub fn new() -> Result<Self> {
		GrowableBufferBuilder::new()
			.build()
	}

	pub fn with_capacity(bufsize: usize) -> Result<Self> {
		GrowableBufferBuilder::new()
			.capacity(bufsize)
			.build()
	}

	/// Number of valid bytes
	pub fn len(&self) -> usize {
		self.size
	}
	/// Same as [`len()`](#method.len)
	pub fn size(&self) -> usize {
		self.size
	}
	pub fn is_empty(&self) -> bool {
		self.size == 0
	}
	/// Total allocated storage, valid bytes and slack alike
	pub fn capacity(&self) -> usize {
		self.buf.len()
	}
	pub fn increment(&self) -> usize {
		self.incr
	}
	/// Valid part of the buffer
	pub fn as_slice(&self) -> &[u8] {
		&self.buf[ .. self.size ]
	}

	/**
	Make sure that at least `offset + additional` bytes of storage are allocated.

	Capacity is only ever increased, in whole multiples of [`increment()`](#method.increment).
	Valid bytes are preserved; whatever sits in the slack is unspecified.
	*/
	pub fn ensure_capacity(&mut self, additional: usize, offset: usize) -> Result<()> {
		let end = offset.checked_add(additional)
			.ok_or(Error::CapacityOverflow(offset, additional))?;
		let cap = self.buf.len();
		if end <= cap {
			return Ok(());
		}

		let deficit = end - cap;
		let steps = deficit / self.incr + (deficit % self.incr != 0) as usize;
		let grow = steps.checked_mul(self.incr)
			.and_then(|grow| grow.checked_add(cap).map(|_| grow))
			.ok_or(Error::CapacityOverflow(offset, additional))?;

		if let Err(err) = self.buf.try_reserve_exact(grow) {
			warn!(capacity = cap, requested = grow, "failed to grow buffer");
			return Err(err.into());
		}
		self.buf.resize(cap + grow, 0);
		trace!(from = cap, to = cap + grow, steps, "grew buffer");
		Ok(())
	}

	// slice of `len` bytes at `offset`, allocated and counted as valid
	fn reserve_at(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
		self.ensure_capacity(len, offset)?;
		let end = offset + len;
		self.size = cmp::max(self.size, end);
		Ok(&mut self.buf[ offset .. end ])
	}

	pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
		let offset = self.size;
		self.reserve_at(offset, chunk.len())?
			.copy_from_slice(chunk);
		Ok(())
	}

	/**
	Slack right after the valid bytes that can be written into directly.

	Use [`mark_appended()`](#method.mark_appended) to turn written bytes into valid ones,
	and [`ensure_capacity()`](#method.ensure_capacity) if this turns out to be empty.
	*/
	pub fn appendable(&mut self) -> &mut [u8] {
		&mut self.buf[ self.size .. ]
	}
	/// Attaches `amount` bytes of [`appendable()`](#method.appendable) to the valid part of the buffer
	pub fn mark_appended(&mut self, amount: usize) {
		assert!(amount <= self.buf.len() - self.size, "appended past capacity");
		self.size += amount;
	}

	/**
	Read from `src` straight into the buffer until EOF, or until `max` bytes were appended.

	Returns number of bytes appended, so 0 means EOF (or `max == 0`).
	*/
	pub fn append_from<R: Read>(&mut self, mut src: R, max: usize) -> Result<usize> {
		let mut total = 0;
		while total < max {
			if self.size == self.buf.len() {
				// this buffer is already full, expand by one increment
				let offset = self.size;
				self.ensure_capacity(1, offset)?;
			}
			let room = cmp::min(self.buf.len() - self.size, max - total);
			let read = match src.read(&mut self.buf[ self.size .. self.size + room ]) {
				Ok(0) => break, // EOF
				Ok(n) => n,
				Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			};
			self.size += read;
			total += read;
		}
		Ok(total)
	}

	/**
	Up to `length` valid bytes starting at `offset` (all of them if `length` is `None`),
	without consuming anything.

	Returns `None` if `offset` is past valid data.
	*/
	pub fn peek(&self, length: Option<usize>, offset: usize) -> Option<&[u8]> {
		if offset >= self.size {
			return None;
		}
		let remaining = self.size - offset;
		let len = cmp::min(length.unwrap_or(remaining), remaining);
		Some(&self.buf[ offset .. offset + len ])
	}

	/*
	drop `amount` bytes from the front

	before:
	|xxxyyyyy   |
	    |      |size

	after:
	|yyyyy      |
	     |size
	*/
	fn discard(&mut self, amount: usize) {
		if amount < self.size {
			copy_in_place(&mut self.buf, amount..self.size, 0);
		}
		self.size -= amount;
	}

	/**
	Remove and return up to `length` bytes from the front (everything if `length` is `None`).

	Returns `None` if there's no data at all, which is not an error.
	*/
	pub fn consume(&mut self, length: Option<usize>) -> Option<Vec<u8>> {
		if self.size == 0 {
			return None;
		}
		let len = cmp::min(length.unwrap_or(self.size), self.size);
		let data = self.buf[ .. len ].to_vec();
		self.discard(len);
		Some(data)
	}

	/**
	Remove and return up to `length` bytes starting at `offset`
	(everything past `offset` if `length` is `None`).

	Bytes on both sides of the removed range stay, closing the gap:
	```text
	|aaaXXXbb   | → |aaabb      |
	    |-|return value
	```
	Returns `None` if `offset` is past valid data.
	*/
	pub fn remove_range(&mut self, offset: usize, length: Option<usize>) -> Option<Vec<u8>> {
		if offset >= self.size {
			return None;
		}
		let remaining = self.size - offset;
		let len = cmp::min(length.unwrap_or(remaining), remaining);
		let end = offset + len;
		let data = self.buf[ offset .. end ].to_vec();
		if end < self.size {
			copy_in_place(&mut self.buf, end..self.size, offset);
		}
		self.size -= len;
		debug!(offset, len, size = self.size, "removed byte range");
		Some(data)
	}

	/**
	Remove and return bytes up to the first `delim`, which is consumed but not returned.

	If `delim` is not buffered yet, returns `None` and leaves the data in place.
	*/
	pub fn consume_until(&mut self, delim: u8) -> Option<Vec<u8>> {
		let len = memchr(delim, self.as_slice())?;
		let data = self.buf[ .. len ].to_vec();
		self.discard(len + 1);
		Some(data)
	}

	/**
	Decode up to `length` bytes from the front (everything if `None`) as `encoding`,
	and consume as many bytes as the returned text was decoded from.

	That can be less than asked for: a multibyte character cut in half by `length`
	or by the end of data stays in the buffer.
	A single character wider than `length` is returned whole, so every call makes progress.

	Returns `None` if the buffer is empty, or if it only holds the beginning of a character
	(e.g. a truncated UTF-8 sequence): those bytes stay buffered until the rest arrives,
	and can still be taken raw with [`consume()`](#method.consume).
	`Some(0)` as `length` yields an empty string.
	*/
	pub fn consume_text(&mut self, encoding: Encoding, length: Option<usize>) -> Option<String> {
		if self.size == 0 {
			return None;
		}
		let len = cmp::min(length.unwrap_or(self.size), self.size);
		if len == 0 {
			return Some(String::new());
		}
		let mut end = len;
		let (text, used) = loop {
			let (text, used) = encoding.decode(&self.buf[ .. end ]);
			if used > 0 || end == self.size {
				break (text, used);
			}
			end += 1;
		};
		if used == 0 {
			return None;
		}
		self.discard(used);
		Some(text)
	}

	/// Like [`consume_text()`](#method.consume_text), with encoding looked up by name.
	pub fn consume_as_text(&mut self, encoding: &str, length: Option<usize>) -> Result<Option<String>> {
		let encoding = encoding.parse()?;
		Ok(self.consume_text(encoding, length))
	}

	/// Forget all data. Capacity is kept and storage is not cleared.
	pub fn reset(&mut self) {
		trace!(dropped = self.size, "reset");
		self.size = 0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn small() -> GrowableBuffer {
		GrowableBufferBuilder::new()
			.capacity(4)
			.increment(4)
			.build()
			.unwrap()
	}

	#[test]
	fn defaults() {
		let buf = GrowableBuffer::new().unwrap();
		assert_eq!(buf.capacity(), DEFAULT_INITIAL_SIZE);
		assert_eq!(buf.increment(), DEFAULT_INCREMENT_AMOUNT);
		assert_eq!(buf.len(), 0);
		assert!(buf.is_empty());

		let buf = GrowableBuffer::default();
		assert_eq!(buf.capacity(), DEFAULT_INITIAL_SIZE);
		assert_eq!(buf.increment(), DEFAULT_INCREMENT_AMOUNT);
		assert!(buf.is_empty());
	}

	#[test]
	#[should_panic(expected = "non-positive buffer increments requested")]
	fn zero_increment() {
		GrowableBufferBuilder::new().increment(0);
	}

	#[test]
	fn grows_in_increments() {
		let mut buf = small();
		buf.append(b"abc").unwrap();
		assert_eq!(buf.capacity(), 4);
		// 3 + 6 = 9 needs 5 more bytes, i.e. two increments
		buf.append(b"defghi").unwrap();
		assert_eq!(buf.capacity(), 12);
		assert_eq!(buf.as_slice(), b"abcdefghi");

		buf.ensure_capacity(3, buf.len()).unwrap();
		assert_eq!(buf.capacity(), 12);
		buf.ensure_capacity(0, 20).unwrap();
		assert_eq!(buf.capacity(), 20);
	}

	#[test]
	fn zero_capacity() {
		let mut buf = GrowableBuffer::with_capacity(0).unwrap();
		assert_eq!(buf.capacity(), 0);
		buf.append(b"x").unwrap();
		assert_eq!(buf.capacity(), DEFAULT_INCREMENT_AMOUNT);
	}

	#[test]
	fn capacity_overflow() {
		let mut buf = small();
		match buf.ensure_capacity(usize::MAX, 1) {
			Err(Error::CapacityOverflow(1, _)) => {},
			other => panic!("unexpected {:?}", other),
		}
		match buf.ensure_capacity(usize::MAX - 1, 0) {
			Err(Error::CapacityOverflow(..)) | Err(Error::Alloc(_)) => {},
			other => panic!("unexpected {:?}", other),
		}
		assert_eq!(buf.capacity(), 4);
	}

	#[test]
	fn partial_consume() {
		let mut buf = small();
		buf.append(&[1, 2, 3, 4, 5]).unwrap();
		assert_eq!(buf.consume(Some(2)), Some(vec![1, 2]));
		assert_eq!(buf.len(), 3);
		assert_eq!(buf.consume(None), Some(vec![3, 4, 5]));
		assert_eq!(buf.len(), 0);
		assert_eq!(buf.consume(None), None);
		assert_eq!(buf.consume(Some(1)), None);
	}

	#[test]
	fn consume_clamps() {
		let mut buf = small();
		buf.append(b"ab").unwrap();
		assert_eq!(buf.consume(Some(0)), Some(vec![]));
		assert_eq!(buf.consume(Some(100)), Some(b"ab".to_vec()));
	}

	#[test]
	fn interleaved() {
		let mut buf = small();
		buf.append(b"lorem ").unwrap();
		assert_eq!(buf.consume(Some(3)).unwrap(), b"lor");
		buf.append(b"ipsum").unwrap();
		assert_eq!(buf.consume(Some(4)).unwrap(), b"em i");
		buf.append(b" dolor").unwrap();
		assert_eq!(buf.consume(None).unwrap(), b"psum dolor");
	}

	#[test]
	fn peek() {
		let mut buf = small();
		buf.append(b"lorem ipsum").unwrap();
		assert_eq!(buf.peek(Some(5), 0), Some(&b"lorem"[..]));
		assert_eq!(buf.peek(None, 6), Some(&b"ipsum"[..]));
		assert_eq!(buf.peek(Some(100), 9), Some(&b"um"[..]));
		assert_eq!(buf.peek(None, 11), None);
		assert_eq!(buf.len(), 11);
		assert_eq!(buf.consume(Some(5)).unwrap(), b"lorem");
	}

	#[test]
	fn remove_range_keeps_both_sides() {
		let mut buf = small();
		buf.append(b"aaaXXXbb").unwrap();
		assert_eq!(buf.remove_range(3, Some(3)).unwrap(), b"XXX");
		assert_eq!(buf.as_slice(), b"aaabb");
		assert_eq!(buf.remove_range(3, None).unwrap(), b"bb");
		assert_eq!(buf.as_slice(), b"aaa");
		assert_eq!(buf.remove_range(3, None), None);
		assert_eq!(buf.remove_range(0, Some(1)).unwrap(), b"a");
		assert_eq!(buf.as_slice(), b"aa");
	}

	#[test]
	fn consume_until() {
		let mut buf = small();
		buf.append(b"lorem ipsum dol").unwrap();
		assert_eq!(buf.consume_until(b' ').unwrap(), b"lorem");
		assert_eq!(buf.consume_until(b' ').unwrap(), b"ipsum");
		assert_eq!(buf.consume_until(b' '), None);
		buf.append(b"or ").unwrap();
		assert_eq!(buf.consume_until(b' ').unwrap(), b"dolor");
		assert!(buf.is_empty());
	}

	#[test]
	fn consume_text() {
		let mut buf = small();
		buf.append("naïve €".as_bytes()).unwrap();
		// 'ï' is two bytes, asking for three splits it
		assert_eq!(buf.consume_as_text("utf8", Some(3)).unwrap().unwrap(), "na");
		assert_eq!(buf.consume_as_text("utf-8", Some(3)).unwrap().unwrap(), "ïv");
		// '€' is cut by the end of data: stays buffered
		buf.remove_range(buf.len() - 1, None);
		assert_eq!(buf.consume_text(Encoding::Utf8, None).unwrap(), "e ");
		assert_eq!(buf.len(), 2);
		buf.append(&[0xac]).unwrap();
		assert_eq!(buf.consume_text(Encoding::Utf8, None).unwrap(), "€");
		assert_eq!(buf.consume_as_text("utf8", None).unwrap(), None);
	}

	#[test]
	fn consume_text_partial_char_only() {
		let mut buf = small();
		buf.append(b"ok\xe2").unwrap();
		assert_eq!(buf.consume_as_text("utf8", None).unwrap().unwrap(), "ok");
		// nothing decodable: no empty strings, bytes wait for the rest of '€'
		assert_eq!(buf.consume_as_text("utf8", None).unwrap(), None);
		assert_eq!(buf.consume_as_text("utf8", Some(1)).unwrap(), None);
		assert_eq!(buf.len(), 1);
		buf.append(b"\x82\xac").unwrap();
		assert_eq!(buf.consume_text(Encoding::Utf8, None).unwrap(), "€");

		// lone UTF-16LE byte, then a lone high surrogate
		buf.append(b"a").unwrap();
		assert_eq!(buf.consume_text(Encoding::Utf16Le, None), None);
		buf.append(&[0xd8]).unwrap();
		assert_eq!(buf.consume_text(Encoding::Utf16Le, None), None);
		assert_eq!(buf.len(), 2);
		// raw bytes are still there
		assert_eq!(buf.consume(None).unwrap(), [b'a', 0xd8]);
	}

	#[test]
	fn consume_text_wider_than_length() {
		let mut buf = small();
		buf.append("€x".as_bytes()).unwrap();
		assert_eq!(buf.consume_as_text("utf8", Some(1)).unwrap().unwrap(), "€");
		assert_eq!(buf.consume_as_text("utf8", Some(1)).unwrap().unwrap(), "x");
		assert_eq!(buf.consume_as_text("utf8", Some(1)).unwrap(), None);

		buf.append(b"ab").unwrap();
		assert_eq!(buf.consume_text(Encoding::Utf8, Some(0)).unwrap(), "");
		assert_eq!(buf.len(), 2);
	}

	#[test]
	fn consume_text_polling_terminates() {
		let mut buf = small();
		buf.append("zażółć\u{1f600}".as_bytes()).unwrap();
		buf.append(b"\xf0\x9f").unwrap();
		let mut got = String::new();
		while let Some(part) = buf.consume_as_text("utf8", Some(2)).unwrap() {
			assert!(!part.is_empty());
			got.push_str(&part);
		}
		assert_eq!(got, "zażółć\u{1f600}");
		assert_eq!(buf.len(), 2);
	}

	#[test]
	fn consume_text_bad_encoding() {
		let mut buf = small();
		match buf.consume_as_text("klingon", None) {
			Err(Error::UnsupportedEncoding(_)) => {},
			other => panic!("unexpected {:?}", other),
		}
		buf.append(b"abc").unwrap();
		assert!(buf.consume_as_text("klingon", None).is_err());
		assert_eq!(buf.len(), 3);
		assert_eq!(buf.consume_as_text("hex", Some(2)).unwrap().unwrap(), "6162");
	}

	#[test]
	fn reset() {
		let mut buf = small();
		buf.append(b"lorem ipsum").unwrap();
		let cap = buf.capacity();
		buf.reset();
		assert_eq!(buf.len(), 0);
		assert_eq!(buf.capacity(), cap);
		assert_eq!(buf.peek(None, 0), None);
		assert_eq!(buf.consume(None), None);
	}

	#[test]
	fn append_from() {
		let mut buf = small();
		let src = b"lorem ipsum dolor sit amet";
		assert_eq!(buf.append_from(&src[..], 5).unwrap(), 5);
		assert_eq!(buf.as_slice(), b"lorem");
		assert_eq!(buf.append_from(&src[5..], usize::MAX).unwrap(), src.len() - 5);
		assert_eq!(buf.as_slice(), &src[..]);
		assert!(buf.len() <= buf.capacity());
		assert_eq!(buf.append_from(&b""[..], usize::MAX).unwrap(), 0);
	}

	enum Step {
		Interrupted,
		Data(&'static [u8]),
		Fail,
	}

	// replays a script of reads, then EOF
	struct Scripted(std::vec::IntoIter<Step>);
	impl Read for Scripted {
		fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
			match self.0.next() {
				None => Ok(0),
				Some(Step::Interrupted) => Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
				Some(Step::Fail) => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
				Some(Step::Data(data)) => {
					out[..data.len()].copy_from_slice(data);
					Ok(data.len())
				},
			}
		}
	}

	#[test]
	fn append_from_retries_interrupted() {
		let mut buf = GrowableBuffer::with_capacity(16).unwrap();
		let src = Scripted(vec![Step::Interrupted, Step::Data(b"lorem"), Step::Interrupted, Step::Data(b" ipsum")].into_iter());
		assert_eq!(buf.append_from(src, usize::MAX).unwrap(), 11);
		assert_eq!(buf.as_slice(), b"lorem ipsum");
	}

	#[test]
	fn append_from_error() {
		let mut buf = GrowableBuffer::with_capacity(16).unwrap();
		let src = Scripted(vec![Step::Interrupted, Step::Data(b"lorem"), Step::Fail, Step::Data(b"never")].into_iter());
		match buf.append_from(src, usize::MAX) {
			Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::ConnectionReset),
			other => panic!("unexpected {:?}", other),
		}
		// whatever was read before the error stays
		assert_eq!(buf.as_slice(), b"lorem");
	}

	#[test]
	fn appendable() {
		let mut buf = small();
		buf.append(b"ab").unwrap();
		let room = buf.appendable();
		assert_eq!(room.len(), 2);
		room[0] = b'c';
		buf.mark_appended(1);
		assert_eq!(buf.as_slice(), b"abc");
	}

	#[test]
	#[should_panic(expected = "appended past capacity")]
	fn mark_appended_past_capacity() {
		let mut buf = small();
		buf.mark_appended(5);
	}
}
