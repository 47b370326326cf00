/*!
Random-offset typed access.

Every `write_*` appends at the end of valid data, `write_*_at` writes at an explicit offset;
both grow the buffer when needed and extend its size to cover the written value,
leaving whatever was in the slack in front of it.
They return the buffer again, so writes can be chained with `?`.

`read_*` are not checked against [`len()`](crate::GrowableBuffer::len):
reading slack is allowed and returns unspecified bytes.
Reading past [`capacity()`](crate::GrowableBuffer::capacity) panics.
Use [`try_read_value()`](crate::GrowableBuffer::try_read_value) for a checked read.
*/

use crate::codec::*;
use crate::{GrowableBuffer, Result};

macro_rules! typed_access {
	($( $ty:ty, $width:expr, $write:ident, $write_at:ident, $read:ident, $put:ident, $get:ident; )*) => {
		impl GrowableBuffer {
			$(
				pub fn $write(&mut self, value: $ty) -> Result<&mut Self> {
					let offset = self.size;
					self.$write_at(value, offset)
				}
				pub fn $write_at(&mut self, value: $ty, offset: usize) -> Result<&mut Self> {
					$put(self.reserve_at(offset, $width)?, value);
					Ok(self)
				}
				pub fn $read(&self, offset: usize) -> $ty {
					$get(&self.buf[ offset .. offset + $width ])
				}
			)*
		}
	}
}

typed_access! {
	u8,  1, write_u8,     write_u8_at,     read_u8,     put_u8,     get_u8;
	i8,  1, write_i8,     write_i8_at,     read_i8,     put_i8,     get_i8;
	u16, 2, write_u16_le, write_u16_le_at, read_u16_le, put_u16_le, get_u16_le;
	u16, 2, write_u16_be, write_u16_be_at, read_u16_be, put_u16_be, get_u16_be;
	i16, 2, write_i16_le, write_i16_le_at, read_i16_le, put_i16_le, get_i16_le;
	i16, 2, write_i16_be, write_i16_be_at, read_i16_be, put_i16_be, get_i16_be;
	u32, 3, write_u24_le, write_u24_le_at, read_u24_le, put_u24_le, get_u24_le;
	u32, 3, write_u24_be, write_u24_be_at, read_u24_be, put_u24_be, get_u24_be;
	i32, 3, write_i24_le, write_i24_le_at, read_i24_le, put_i24_le, get_i24_le;
	i32, 3, write_i24_be, write_i24_be_at, read_i24_be, put_i24_be, get_i24_be;
	u32, 4, write_u32_le, write_u32_le_at, read_u32_le, put_u32_le, get_u32_le;
	u32, 4, write_u32_be, write_u32_be_at, read_u32_be, put_u32_be, get_u32_be;
	i32, 4, write_i32_le, write_i32_le_at, read_i32_le, put_i32_le, get_i32_le;
	i32, 4, write_i32_be, write_i32_be_at, read_i32_be, put_i32_be, get_i32_be;
	f32, 4, write_f32_le, write_f32_le_at, read_f32_le, put_f32_le, get_f32_le;
	f32, 4, write_f32_be, write_f32_be_at, read_f32_be, put_f32_be, get_f32_be;
	f64, 8, write_f64_le, write_f64_le_at, read_f64_le, put_f64_le, get_f64_le;
	f64, 8, write_f64_be, write_f64_be_at, read_f64_be, put_f64_be, get_f64_be;
}

impl GrowableBuffer {
	/// Table-driven write: at `offset`, or appended if `None`.
	pub fn write_value(&mut self, kind: NumKind, value: Value, offset: Option<usize>) -> Result<&mut Self> {
		let offset = offset.unwrap_or(self.size);
		kind.encode(value, self.reserve_at(offset, kind.width())?);
		Ok(self)
	}

	/// Table-driven read, unchecked against `len()` just like `read_*`.
	pub fn read_value(&self, kind: NumKind, offset: usize) -> Value {
		kind.decode(&self.buf[ offset .. offset + kind.width() ])
	}

	/// Like [`read_value()`](#method.read_value), but `None` unless the value lies within valid data.
	pub fn try_read_value(&self, kind: NumKind, offset: usize) -> Option<Value> {
		let end = offset.checked_add(kind.width())?;
		if end > self.size {
			return None;
		}
		Some(kind.decode(&self.buf[ offset .. end ]))
	}
}
