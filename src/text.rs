/*!
Byte-to-text codecs used when draining the buffer as a string.

Every decoder reports how many source bytes the produced text covers.
Variable-width encodings stop short of a character that is cut in half
by the end of the input, so that its remaining bytes can still arrive
and be decoded with it on a later call.
*/

use std::fmt;
use std::str::{self, FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
	Utf8,
	/// 7-bit ASCII: the high bit of every byte is cleared, so `0xc1` reads as `'A'`.
	/// Bytes above `0x7f` are not passed through as code points; use `Latin1` for that.
	Ascii,
	/// ISO-8859-1, one byte per code point
	Latin1,
	/// lowercase hex digits, two per byte
	Hex,
	/// standard alphabet, padded
	Base64,
	Utf16Le,
}

impl Default for Encoding {
	fn default() -> Self { Encoding::Utf8 }
}

impl FromStr for Encoding {
	type Err = Error;
	fn from_str(name: &str) -> Result<Self, Error> {
		Ok(match name.to_ascii_lowercase().as_str() {
			"utf8" | "utf-8" => Encoding::Utf8,
			"ascii" => Encoding::Ascii,
			"latin1" | "binary" => Encoding::Latin1,
			"hex" => Encoding::Hex,
			"base64" => Encoding::Base64,
			"utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Encoding::Utf16Le,
			_ => return Err(Error::UnsupportedEncoding(name.to_owned())),
		})
	}
}

impl fmt::Display for Encoding {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Encoding::Utf8 => "utf8",
			Encoding::Ascii => "ascii",
			Encoding::Latin1 => "latin1",
			Encoding::Hex => "hex",
			Encoding::Base64 => "base64",
			Encoding::Utf16Le => "utf16le",
		})
	}
}

impl Encoding {
	/// Returns decoded text and the number of bytes of `src` it was decoded from.
	pub fn decode(self, src: &[u8]) -> (String, usize) {
		match self {
			Encoding::Utf8 => decode_utf8(src),
			Encoding::Utf16Le => decode_utf16le(src),
			Encoding::Ascii => (src.iter().map(|&b| (b & 0x7f) as char).collect(), src.len()),
			Encoding::Latin1 => (src.iter().map(|&b| b as char).collect(), src.len()),
			Encoding::Hex => (hex(src), src.len()),
			Encoding::Base64 => (STANDARD.encode(src), src.len()),
		}
	}
}

fn decode_utf8(src: &[u8]) -> (String, usize) {
	let mut out = String::with_capacity(src.len());
	let mut rest = src;
	loop {
		match str::from_utf8(rest) {
			Ok(s) => {
				out.push_str(s);
				return (out, src.len());
			},
			Err(e) => {
				let (valid, after) = rest.split_at(e.valid_up_to());
				// `valid` is known to be well-formed, so this never allocates
				out.push_str(&String::from_utf8_lossy(valid));
				match e.error_len() {
					Some(bad) => {
						out.push(char::REPLACEMENT_CHARACTER);
						rest = &after[bad..];
					},
					// truncated sequence at the very end
					None => return (out, src.len() - after.len()),
				}
			},
		}
	}
}

fn decode_utf16le(src: &[u8]) -> (String, usize) {
	let mut end = src.len() & !1;
	if end >= 2 {
		let last = u16::from_le_bytes([src[end-2], src[end-1]]);
		// high surrogate waiting for its pair
		if (0xd800..0xdc00).contains(&last) {
			end -= 2;
		}
	}
	let units = src[..end]
		.chunks_exact(2)
		.map(|c| u16::from_le_bytes([c[0], c[1]]));
	let text = char::decode_utf16(units)
		.map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
		.collect();
	(text, end)
}

fn hex(src: &[u8]) -> String {
	const DIGITS: &[u8; 16] = b"0123456789abcdef";
	let mut out = String::with_capacity(src.len() * 2);
	for &b in src {
		out.push(DIGITS[(b >> 4) as usize] as char);
		out.push(DIGITS[(b & 0xf) as usize] as char);
	}
	out
}
