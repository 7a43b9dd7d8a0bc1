#![no_main]

use std::io::{self, Cursor, Read, Write};

use libfuzzer_sys::fuzz_target;
use wire::{ChatMessage, Limits, RequestKind, HEADER_SIZE};

/// Peer whose reply bytes are the fuzz input.
struct Peer<'a> {
    reply: Cursor<&'a [u8]>,
}

impl Read for Peer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reply.read(buf)
    }
}

impl Write for Peer<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();

    // Header validation against the sequence the input claims.
    if let Some(fixed) = data.get(..=HEADER_SIZE) {
        let mut head = [0u8; HEADER_SIZE + 1];
        head.copy_from_slice(fixed);
        let expected = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
        if let Ok((header, _)) = wire::validate_reply_header(expected, &head, &limits) {
            assert!(header.length as usize <= limits.max_message_len);
            let mut tail = data[HEADER_SIZE + 1..].to_vec();
            let mut payload = buffer::BorrowedBuffer::filled(&mut tail);
            let _ = ChatMessage::decode(&mut payload);
        }
    }

    // Full exchange; the sequence number almost never matches.
    let mut peer = Peer {
        reply: Cursor::new(data),
    };
    if let Ok(reply) = wire::request_with_limits(&mut peer, RequestKind::ChatRead, b"", &limits) {
        assert!(reply.len() < limits.max_message_len);
        let _ = reply.text();
    }
});
