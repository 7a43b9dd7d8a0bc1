//! Cursor-based byte buffer for the blinky wire codec.
//!
//! This crate provides [`DynBuf`], a byte buffer with one read/write cursor, in
//! two flavours selected by the storage type:
//!
//! - [`DynamicBuffer`] owns a heap allocation and grows on demand.
//! - [`BorrowedBuffer`] wraps caller memory and refuses to grow.
//!
//! # Design Principles
//!
//! - **No unsafe code** - every access is a checked slice operation.
//! - **Bounded operations** - reads stop at the logical end, writes at the capacity
//!   of borrowed storage.
//! - **Explicit errors** - all failures return [`BufError`], never panic.
//!
//! # Example
//!
//! ```
//! use buffer::DynamicBuffer;
//!
//! let mut buf = DynamicBuffer::new();
//! buf.write_u32(4).unwrap();
//! buf.write_data(b"PING").unwrap();
//!
//! buf.rewind();
//! let len = buf.read_u32().unwrap() as usize;
//! assert_eq!(buf.read(len).unwrap(), b"PING");
//! assert!(buf.is_exhausted());
//! ```

mod dynbuf;
mod error;
mod storage;

pub use dynbuf::{BorrowedBuffer, DynBuf, DynamicBuffer};
pub use error::{BufError, BufResult};
pub use storage::{Borrowed, Owned, Storage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_and_borrowed_share_codec_helpers() {
        fn encode<S: Storage>(buf: &mut DynBuf<S>) -> BufResult<()> {
            buf.write_u8(0xFE)?;
            buf.write_u64(u64::MAX)
        }

        let mut owned = DynamicBuffer::new();
        encode(&mut owned).unwrap();

        let mut region = [0u8; 9];
        let mut borrowed = BorrowedBuffer::new(&mut region);
        encode(&mut borrowed).unwrap();

        assert_eq!(owned.as_slice(), borrowed.as_slice());
    }

    #[test]
    fn borrowed_too_small_for_helper() {
        let mut region = [0u8; 3];
        let mut buf = BorrowedBuffer::new(&mut region);
        assert!(matches!(buf.write_u32(1), Err(BufError::NotOwned { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn from_vec_reads_back() {
        let mut buf = DynamicBuffer::from(vec![1, 0, 0, 0]);
        assert_eq!(buf.read_u32().unwrap(), 1);
    }
}
