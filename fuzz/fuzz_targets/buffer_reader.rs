#![no_main]

use buffer::{BorrowedBuffer, DynamicBuffer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut backing = data.to_vec();
    let mut reader = BorrowedBuffer::filled(&mut backing);
    let mut owned = DynamicBuffer::new();
    let mut idx = 0usize;

    // Input bytes pick a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        let arg = usize::from(data[idx.saturating_add(1) % data.len()]);
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_u32();
            }
            2 => {
                let _ = reader.read_u64();
            }
            3 => {
                if let Ok(bytes) = reader.read(arg) {
                    let _ = owned.write_data(bytes);
                }
            }
            4 => {
                let _ = wire::field::read_bytes(&mut reader);
            }
            5 => {
                let _ = reader.write(arg);
            }
            _ => reader.rewind(),
        }
        assert!(reader.position() <= reader.len());
        assert!(reader.len() <= reader.capacity());
    }

    owned.rewind();
    while !owned.is_exhausted() {
        if owned.read_u8().is_err() {
            break;
        }
    }
});
