//! Length-prefixed fields.
//!
//! A field is a little-endian `u32` byte count followed by the raw bytes. There
//! is no terminator on the wire; strings are plain UTF-8 bytes.

use buffer::{DynBuf, Storage};

use crate::error::{DecodeError, EncodeError, WireResult};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Writes the length prefix and reserves `len` bytes for the caller to fill.
pub fn reserve_bytes<S: Storage>(
    buf: &mut DynBuf<S>,
    len: usize,
) -> Result<&mut [u8], EncodeError> {
    let prefix = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { length: len })?;
    buf.write_u32(prefix)?;
    Ok(buf.write(len)?)
}

/// Writes a bytes field.
pub fn write_bytes<S: Storage>(buf: &mut DynBuf<S>, bytes: &[u8]) -> Result<(), EncodeError> {
    reserve_bytes(buf, bytes.len())?.copy_from_slice(bytes);
    Ok(())
}

/// Writes a string field.
pub fn write_string<S: Storage>(buf: &mut DynBuf<S>, value: &str) -> Result<(), EncodeError> {
    write_bytes(buf, value.as_bytes())
}

/// Reads a bytes field, returning a view into the buffer.
pub fn read_bytes<S: Storage>(buf: &mut DynBuf<S>) -> WireResult<&[u8]> {
    let len = buf.read_u32()?;
    // A length that does not fit usize can never fit the buffer either.
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    Ok(buf.read(len)?)
}

/// Reads a string field, validating UTF-8.
pub fn read_string<S: Storage>(buf: &mut DynBuf<S>) -> WireResult<&str> {
    let bytes = read_bytes(buf)?;
    std::str::from_utf8(bytes).map_err(|err| DecodeError::InvalidUtf8 {
        valid_up_to: err.valid_up_to(),
    })
}

/// Returns the encoded size of a field holding `len` bytes.
#[must_use]
pub const fn encoded_len(len: usize) -> usize {
    LENGTH_PREFIX_SIZE.saturating_add(len)
}
