//! Backing storage for [`DynBuf`](crate::DynBuf).
//!
//! Ownership is encoded in the storage type: [`Owned`] storage grows on demand,
//! [`Borrowed`] storage has a fixed capacity and rejects growth with
//! [`BufError::NotOwned`].

use crate::error::{BufError, BufResult};

/// Storage that a [`DynBuf`](crate::DynBuf) reads from and writes into.
///
/// The slice returned by [`as_bytes`](Self::as_bytes) spans the full capacity,
/// not just the logical contents.
pub trait Storage {
    /// Returns the whole storage region.
    fn as_bytes(&self) -> &[u8];

    /// Returns the whole storage region, mutably.
    fn as_bytes_mut(&mut self) -> &mut [u8];

    /// Returns the capacity in bytes.
    fn capacity(&self) -> usize {
        self.as_bytes().len()
    }

    /// Grows the storage so that it holds at least `required` bytes.
    ///
    /// Existing bytes are preserved and the capacity never shrinks.
    fn grow(&mut self, required: usize) -> BufResult<()>;
}

/// Heap storage owned by the buffer.
///
/// Grows geometrically: capacity doubles, or jumps straight to the required
/// size when doubling is not enough.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owned {
    /// Invariant: `bytes.len()` is the capacity; every byte is initialized.
    bytes: Vec<u8>,
}

impl Owned {
    /// Creates zero-filled storage of the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    /// Adopts an existing allocation. The capacity equals `bytes.len()`.
    #[must_use]
    pub const fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl Storage for Owned {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn grow(&mut self, required: usize) -> BufResult<()> {
        let capacity = self.bytes.len();
        if required <= capacity {
            return Ok(());
        }
        let new_capacity = capacity
            .checked_mul(2)
            .filter(|&doubled| doubled >= required)
            .unwrap_or(required);
        self.bytes
            .try_reserve_exact(new_capacity - capacity)
            .map_err(|_| BufError::AllocationFailed {
                capacity: new_capacity,
            })?;
        self.bytes.resize(new_capacity, 0);
        Ok(())
    }
}

/// Caller-provided storage with a fixed capacity.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Borrowed<'a> {
    bytes: &'a mut [u8],
}

impl<'a> Borrowed<'a> {
    /// Wraps a caller-provided region.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn into_inner(self) -> &'a mut [u8] {
        self.bytes
    }
}

impl Storage for Borrowed<'_> {
    fn as_bytes(&self) -> &[u8] {
        &*self.bytes
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    fn grow(&mut self, required: usize) -> BufResult<()> {
        if required <= self.bytes.len() {
            return Ok(());
        }
        Err(BufError::NotOwned {
            required,
            capacity: self.bytes.len(),
        })
    }
}
