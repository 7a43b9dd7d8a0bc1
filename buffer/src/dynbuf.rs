//! Cursor-based buffer with bounded reads and checked writes.

use std::mem;

use crate::error::{BufError, BufResult};
use crate::storage::{Borrowed, Owned, Storage};

/// A byte buffer with a single read/write cursor.
///
/// The buffer tracks a logical size (bytes written so far, or bytes adopted at
/// construction) separately from the storage capacity. Invariant:
/// `position() <= len() <= capacity()`.
///
/// Writes grow the storage when it is [`Owned`]; on a [`Borrowed`] buffer a
/// write past capacity fails with [`BufError::NotOwned`] and leaves the buffer
/// unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DynBuf<S> {
    storage: S,
    size: usize,
    cursor: usize,
}

/// A buffer that owns its heap storage.
pub type DynamicBuffer = DynBuf<Owned>;

/// A buffer over caller-provided memory that cannot grow.
pub type BorrowedBuffer<'a> = DynBuf<Borrowed<'a>>;

impl DynamicBuffer {
    /// Creates an empty buffer with no allocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Owned::with_capacity(capacity),
            size: 0,
            cursor: 0,
        }
    }

    /// Adopts `bytes` as the buffer contents, cursor at the start.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let size = bytes.len();
        Self {
            storage: Owned::from_vec(bytes),
            size,
            cursor: 0,
        }
    }

    /// Takes the contents out of the buffer, leaving it empty.
    ///
    /// The returned vector holds exactly the logical contents.
    pub fn release(&mut self) -> Vec<u8> {
        let size = self.size;
        let mut bytes = mem::take(&mut self.storage).into_vec();
        bytes.truncate(size);
        self.size = 0;
        self.cursor = 0;
        bytes
    }

    /// Consumes the buffer, returning the logical contents.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        self.release()
    }
}

impl From<Vec<u8>> for DynamicBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl<'a> BorrowedBuffer<'a> {
    /// Wraps `bytes` as empty writable space.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self {
            storage: Borrowed::new(bytes),
            size: 0,
            cursor: 0,
        }
    }

    /// Wraps `bytes` as existing contents to be read, cursor at the start.
    pub fn filled(bytes: &'a mut [u8]) -> Self {
        let size = bytes.len();
        Self {
            storage: Borrowed::new(bytes),
            size,
            cursor: 0,
        }
    }

    /// Hands the borrowed region back to the caller, leaving the buffer empty.
    pub fn release(&mut self) -> &'a mut [u8] {
        self.size = 0;
        self.cursor = 0;
        mem::take(&mut self.storage).into_inner()
    }
}

impl<S: Storage> DynBuf<S> {
    /// Returns the logical size in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if nothing has been written or adopted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the storage capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns the cursor position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the number of bytes between the cursor and the logical end.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.size - self.cursor
    }

    /// Returns `true` if every byte has been read.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the logical contents, independent of the cursor.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage.as_bytes()[..self.size]
    }

    /// Moves the cursor back to the start so written bytes can be read.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Reserves `size` bytes at the cursor and returns them for writing.
    ///
    /// The cursor advances past the reserved region. Bytes in the region are
    /// whatever the storage held before; callers are expected to fill it.
    pub fn write(&mut self, size: usize) -> BufResult<&mut [u8]> {
        let start = self.cursor;
        let end = start.checked_add(size).ok_or(BufError::SizeOverflow {
            offset: start,
            requested: size,
        })?;
        if end > self.storage.capacity() {
            self.storage.grow(end)?;
        }
        self.cursor = end;
        self.size = self.size.max(end);
        Ok(&mut self.storage.as_bytes_mut()[start..end])
    }

    /// Returns a view of the next `size` bytes and advances the cursor.
    pub fn read(&mut self, size: usize) -> BufResult<&[u8]> {
        let available = self.remaining();
        if size > available {
            return Err(BufError::EndOfBuffer {
                requested: size,
                available,
            });
        }
        let start = self.cursor;
        self.cursor += size;
        Ok(&self.storage.as_bytes()[start..self.cursor])
    }

    /// Copies `src` into the buffer at the cursor.
    pub fn write_data(&mut self, src: &[u8]) -> BufResult<()> {
        self.write(src.len())?.copy_from_slice(src);
        Ok(())
    }

    /// Fills `dst` from the buffer at the cursor.
    pub fn read_data(&mut self, dst: &mut [u8]) -> BufResult<()> {
        dst.copy_from_slice(self.read(dst.len())?);
        Ok(())
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) -> BufResult<()> {
        self.write_data(&[value])
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> BufResult<()> {
        self.write_data(&value.to_le_bytes())
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) -> BufResult<()> {
        self.write_data(&value.to_le_bytes())
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> BufResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> BufResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> BufResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> BufResult<[u8; N]> {
        let mut out = [0u8; N];
        self.read_data(&mut out)?;
        Ok(out)
    }
}

impl<S: Storage + Default> DynBuf<S> {
    /// Drops the storage and empties the buffer.
    ///
    /// Owned storage is freed. Borrowed storage is only forgotten; the
    /// caller's memory keeps whatever was written into it.
    pub fn reset(&mut self) {
        self.storage = S::default();
        self.size = 0;
        self.cursor = 0;
    }
}
