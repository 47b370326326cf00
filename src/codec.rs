/*!
Fixed-width numeric codecs.

Free `put_*`/`get_*` functions encode into and decode from the first
`width` bytes of a slice; they panic if the slice is shorter than that.
[`NumKind`] ties every width/signedness/byte order combination to its pair
of functions, so table-driven callers don't have to spell out the method names.
*/

use std::mem::size_of;

macro_rules! native {
	($put:ident, $get:ident, $ty:ty, $to:ident, $from:ident) => {
		#[inline]
		pub fn $put(dst: &mut [u8], v: $ty) {
			dst[.. size_of::<$ty>()].copy_from_slice(&v.$to());
		}
		#[inline]
		pub fn $get(src: &[u8]) -> $ty {
			let mut b = [0; size_of::<$ty>()];
			b.copy_from_slice(&src[.. size_of::<$ty>()]);
			<$ty>::$from(b)
		}
	}
}

native!(put_u8, get_u8, u8, to_le_bytes, from_le_bytes);
native!(put_i8, get_i8, i8, to_le_bytes, from_le_bytes);
native!(put_u16_le, get_u16_le, u16, to_le_bytes, from_le_bytes);
native!(put_u16_be, get_u16_be, u16, to_be_bytes, from_be_bytes);
native!(put_i16_le, get_i16_le, i16, to_le_bytes, from_le_bytes);
native!(put_i16_be, get_i16_be, i16, to_be_bytes, from_be_bytes);
native!(put_u32_le, get_u32_le, u32, to_le_bytes, from_le_bytes);
native!(put_u32_be, get_u32_be, u32, to_be_bytes, from_be_bytes);
native!(put_i32_le, get_i32_le, i32, to_le_bytes, from_le_bytes);
native!(put_i32_be, get_i32_be, i32, to_be_bytes, from_be_bytes);
native!(put_f32_le, get_f32_le, f32, to_le_bytes, from_le_bytes);
native!(put_f32_be, get_f32_be, f32, to_be_bytes, from_be_bytes);
native!(put_f64_le, get_f64_le, f64, to_le_bytes, from_le_bytes);
native!(put_f64_be, get_f64_be, f64, to_be_bytes, from_be_bytes);

/*
24-bit values have no primitive of their own: they live in the low three
bytes of a u32/i32, anything above bit 23 is dropped on write.

    u32 LE: | b0 b1 b2 b3 |   u32 BE: | b3 b2 b1 b0 |
             |------|                     |------|
             u24 LE                        u24 BE
*/

pub const U24_MAX: u32 = 0x00ff_ffff;
pub const I24_MIN: i32 = -0x0080_0000;
pub const I24_MAX: i32 = 0x007f_ffff;

#[inline]
pub fn put_u24_le(dst: &mut [u8], v: u32) {
	dst[..3].copy_from_slice(&v.to_le_bytes()[..3]);
}
#[inline]
pub fn put_u24_be(dst: &mut [u8], v: u32) {
	dst[..3].copy_from_slice(&v.to_be_bytes()[1..]);
}
#[inline]
pub fn get_u24_le(src: &[u8]) -> u32 {
	u32::from_le_bytes([src[0], src[1], src[2], 0])
}
#[inline]
pub fn get_u24_be(src: &[u8]) -> u32 {
	u32::from_be_bytes([0, src[0], src[1], src[2]])
}
#[inline]
pub fn put_i24_le(dst: &mut [u8], v: i32) {
	put_u24_le(dst, v as u32)
}
#[inline]
pub fn put_i24_be(dst: &mut [u8], v: i32) {
	put_u24_be(dst, v as u32)
}
#[inline]
pub fn get_i24_le(src: &[u8]) -> i32 {
	sign_extend_24(get_u24_le(src))
}
#[inline]
pub fn get_i24_be(src: &[u8]) -> i32 {
	sign_extend_24(get_u24_be(src))
}

// shift bit 23 into the sign position, then arithmetic-shift it back down
#[inline]
fn sign_extend_24(v: u32) -> i32 {
	((v << 8) as i32) >> 8
}

/// A number as handed to or returned from [`NumKind`]-driven access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
	Int(i64),
	Float(f64),
}

impl Value {
	/**
	Integer view of the value, wrapped into the u32 domain:
	excess high bits are masked off rather than reported.
	Floats are truncated towards zero first and wrap the same way,
	NaN and infinities become 0.
	*/
	pub fn to_u32(self) -> u32 {
		match self {
			Value::Int(v) => v as u32,
			Value::Float(v) if !v.is_finite() => 0,
			Value::Float(v) => v.trunc().rem_euclid(4_294_967_296.0) as u32,
		}
	}
	pub fn to_f64(self) -> f64 {
		match self {
			Value::Int(v) => v as f64,
			Value::Float(v) => v,
		}
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self { Value::Int(v) }
}
impl From<u32> for Value {
	fn from(v: u32) -> Self { Value::Int(v.into()) }
}
impl From<i32> for Value {
	fn from(v: i32) -> Self { Value::Int(v.into()) }
}
impl From<f64> for Value {
	fn from(v: f64) -> Self { Value::Float(v) }
}
impl From<f32> for Value {
	fn from(v: f32) -> Self { Value::Float(v.into()) }
}

/// Width × signedness × byte order of a fixed-width number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumKind {
	U8, I8,
	U16Le, U16Be, I16Le, I16Be,
	U24Le, U24Be, I24Le, I24Be,
	U32Le, U32Be, I32Le, I32Be,
	F32Le, F32Be,
	F64Le, F64Be,
}

impl NumKind {
	pub const ALL: [NumKind; 18] = [
		NumKind::U8, NumKind::I8,
		NumKind::U16Le, NumKind::U16Be, NumKind::I16Le, NumKind::I16Be,
		NumKind::U24Le, NumKind::U24Be, NumKind::I24Le, NumKind::I24Be,
		NumKind::U32Le, NumKind::U32Be, NumKind::I32Le, NumKind::I32Be,
		NumKind::F32Le, NumKind::F32Be,
		NumKind::F64Le, NumKind::F64Be,
	];

	/// Encoded size in bytes
	pub fn width(self) -> usize {
		use NumKind::*;
		match self {
			U8 | I8 => 1,
			U16Le | U16Be | I16Le | I16Be => 2,
			U24Le | U24Be | I24Le | I24Be => 3,
			U32Le | U32Be | I32Le | I32Be | F32Le | F32Be => 4,
			F64Le | F64Be => 8,
		}
	}

	pub fn is_float(self) -> bool {
		use NumKind::*;
		matches!(self, F32Le | F32Be | F64Le | F64Be)
	}

	pub fn is_signed(self) -> bool {
		use NumKind::*;
		self.is_float() || matches!(self, I8 | I16Le | I16Be | I24Le | I24Be | I32Le | I32Be)
	}

	/// Encode `value` into `dst[.. self.width()]`.
	pub fn encode(self, value: Value, dst: &mut [u8]) {
		use NumKind::*;
		// the u32 domain is shared by every integer kind; narrower ones just truncate further
		let int = value.to_u32();
		match self {
			U8 => put_u8(dst, int as u8),
			I8 => put_i8(dst, int as i8),
			U16Le => put_u16_le(dst, int as u16),
			U16Be => put_u16_be(dst, int as u16),
			I16Le => put_i16_le(dst, int as i16),
			I16Be => put_i16_be(dst, int as i16),
			U24Le => put_u24_le(dst, int),
			U24Be => put_u24_be(dst, int),
			I24Le => put_i24_le(dst, int as i32),
			I24Be => put_i24_be(dst, int as i32),
			U32Le => put_u32_le(dst, int),
			U32Be => put_u32_be(dst, int),
			I32Le => put_i32_le(dst, int as i32),
			I32Be => put_i32_be(dst, int as i32),
			F32Le => put_f32_le(dst, value.to_f64() as f32),
			F32Be => put_f32_be(dst, value.to_f64() as f32),
			F64Le => put_f64_le(dst, value.to_f64()),
			F64Be => put_f64_be(dst, value.to_f64()),
		}
	}

	/// Decode `src[.. self.width()]`.
	pub fn decode(self, src: &[u8]) -> Value {
		use NumKind::*;
		match self {
			U8 => Value::Int(get_u8(src).into()),
			I8 => Value::Int(get_i8(src).into()),
			U16Le => Value::Int(get_u16_le(src).into()),
			U16Be => Value::Int(get_u16_be(src).into()),
			I16Le => Value::Int(get_i16_le(src).into()),
			I16Be => Value::Int(get_i16_be(src).into()),
			U24Le => Value::Int(get_u24_le(src).into()),
			U24Be => Value::Int(get_u24_be(src).into()),
			I24Le => Value::Int(get_i24_le(src).into()),
			I24Be => Value::Int(get_i24_be(src).into()),
			U32Le => Value::Int(get_u32_le(src).into()),
			U32Be => Value::Int(get_u32_be(src).into()),
			I32Le => Value::Int(get_i32_le(src).into()),
			I32Be => Value::Int(get_i32_be(src).into()),
			F32Le => Value::Float(get_f32_le(src).into()),
			F32Be => Value::Float(get_f32_be(src).into()),
			F64Le => Value::Float(get_f64_le(src)),
			F64Be => Value::Float(get_f64_be(src)),
		}
	}
}
