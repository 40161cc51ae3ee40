//! Little-endian primitive access for resource data.
//!
//! Every multi-byte value in a resource file is a little-endian 32-bit word (with the odd
//! 16-bit or 8-bit field inside a record body). This module provides bounds-checked helpers
//! to read and write such values from byte buffers, used by the [`crate::file::parser::Parser`],
//! the codec and the raw field accessors of record storage.
//!
//! # Key Components
//!
//! - [`crate::file::io::ResIO`] - Trait implemented by the primitive types stored in records
//! - [`crate::file::io::read_le`] / [`crate::file::io::read_le_at`] - Checked reads
//! - [`crate::file::io::write_le`] / [`crate::file::io::write_le_at`] - Checked writes
//! - [`crate::file::io::read_c_str`] - NUL-terminated text lookup
//!
//! # Examples
//!
//! ```rust,ignore
//! use toolres::file::io::{read_le_at, write_le_at};
//!
//! let mut data = [0u8; 8];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, -1_i32)?;
//! write_le_at(&mut data, &mut offset, 101_u32)?;
//!
//! let mut offset = 0;
//! assert_eq!(read_le_at::<i32>(&data, &mut offset)?, -1);
//! assert_eq!(read_le_at::<u32>(&data, &mut offset)?, 101);
//! # Ok::<(), toolres::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All functions are pure conversions over caller-owned buffers and can be used from any thread.

use crate::Result;

/// Primitive values that can be stored in a record body.
///
/// Implemented for the 8, 16 and 32-bit integers that the resource format uses. The
/// associated `Bytes` array is used for the actual conversion, so no unsafe slice casting is
/// needed to move a value in or out of a buffer.
pub trait ResIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_res_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ResIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_res_io!(u8 => 1, i8 => 1, u16 => 2, i16 => 2, u32 => 4, i32 => 4);

/// Safely reads a value of type `T` in little-endian byte order from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le<T: ResIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T`.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: ResIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Safely writes a value of type `T` in little-endian byte order to the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le<T: ResIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_le_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T`.
///
/// # Arguments
///
/// * `data` - The mutable byte buffer to write to
/// * `offset` - Mutable reference to the offset position (will be advanced after writing)
/// * `value` - The value to write
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le_at<T: ResIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();
    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

/// Returns the bytes of the NUL-terminated text starting at `pos`, without the terminator.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `pos` is outside of `data` and
/// [`crate::Error::Malformed`] if no terminator is found before the end of `data`.
pub fn read_c_bytes(data: &[u8], pos: usize) -> Result<&[u8]> {
    let Some(tail) = data.get(pos..) else {
        return Err(out_of_bounds_error!());
    };
    match tail.iter().position(|&b| b == 0) {
        Some(len) => Ok(&tail[..len]),
        None => Err(malformed_error!("Unterminated text at {}", pos)),
    }
}

/// Returns the NUL-terminated text starting at `pos` as a string slice.
///
/// # Errors
/// Same as [`read_c_bytes`], plus [`crate::Error::Malformed`] for text that is not UTF-8.
pub fn read_c_str(data: &[u8], pos: usize) -> Result<&str> {
    let bytes = read_c_bytes(data, pos)?;
    std::str::from_utf8(bytes).map_err(|_| malformed_error!("Text at {} is not UTF-8", pos))
}
