use std::collections::TryReserveError;
use std::io;

quick_error! {
	#[derive(Debug)]
	pub enum Error {
		/// Growing the storage failed; the buffer is left as it was.
		Alloc(err: TryReserveError) {
			from()
			display("failed to grow buffer: {}", err)
			cause(err)
		}
		/// `offset + length` does not fit in `usize`
		CapacityOverflow(offset: usize, additional: usize) {
			display("capacity overflow: {} + {} bytes", offset, additional)
		}
		UnsupportedEncoding(name: String) {
			display("unsupported encoding: {:?}", name)
		}
		Io(err: io::Error) {
			from()
			display("I/O error: {}", err)
			cause(err)
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for io::Error {
	fn from(err: Error) -> io::Error {
		match err {
			Error::Io(err) => err,
			Error::UnsupportedEncoding(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
			other => io::Error::new(io::ErrorKind::Other, other),
		}
	}
}
