//! Loopback fake server for client integration tests.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use client::{ClientConfig, RpcClient};
use wire::{MessageHeader, ReplyStatus, RequestKind, HEADER_SIZE};

/// A request as the server received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sequence: u32,
    pub kind: RequestKind,
    pub payload: Vec<u8>,
}

/// Serves one connection on a background thread, answering each request with
/// the handler's verdict.
pub struct FakeServer {
    addr: SocketAddr,
    handle: JoinHandle<io::Result<Vec<Frame>>>,
}

impl FakeServer {
    pub fn spawn<F>(mut handler: F) -> Self
    where
        F: FnMut(RequestKind, &[u8]) -> (ReplyStatus, Vec<u8>) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept()?;
            let mut frames = Vec::new();
            while let Some(frame) = read_frame(&mut stream)? {
                let (status, reply) = handler(frame.kind, &frame.payload);
                write_reply(&mut stream, frame.sequence, status, &reply)?;
                frames.push(frame);
            }
            Ok(frames)
        });
        Self { addr, handle }
    }

    /// Accepts a connection and never answers.
    pub fn silent() -> (Self, std::sync::mpsc::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let (_stream, _) = listener.accept()?;
            let _ = rx.recv();
            Ok(Vec::new())
        });
        (Self { addr, handle }, tx)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connect(&self) -> RpcClient {
        self.connect_with(ClientConfig::for_testing())
    }

    pub fn connect_with(&self, config: ClientConfig) -> RpcClient {
        RpcClient::connect_to("127.0.0.1", self.port(), config).unwrap()
    }

    /// Waits for the client to hang up and returns every frame received.
    pub fn finish(self) -> Vec<Frame> {
        self.handle.join().unwrap().unwrap()
    }
}

fn read_frame(stream: &mut TcpStream) -> io::Result<Option<Frame>> {
    let mut head = [0u8; HEADER_SIZE];
    match stream.read_exact(&mut head) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }
    let header = MessageHeader::from_bytes(head);
    let mut body = vec![0u8; header.length as usize];
    stream.read_exact(&mut body)?;
    let kind = RequestKind::parse(body[0])
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(Some(Frame {
        sequence: header.sequence,
        kind,
        payload: body[1..].to_vec(),
    }))
}

fn write_reply(
    stream: &mut TcpStream,
    sequence: u32,
    status: ReplyStatus,
    payload: &[u8],
) -> io::Result<()> {
    let length = u32::try_from(payload.len() + 1).unwrap();
    let mut out = MessageHeader::new(sequence, length).to_bytes().to_vec();
    out.push(status.as_u8());
    out.extend_from_slice(payload);
    stream.write_all(&out)
}

pub fn ok(payload: impl Into<Vec<u8>>) -> (ReplyStatus, Vec<u8>) {
    (ReplyStatus::Ok, payload.into())
}

pub fn fail(message: &str) -> (ReplyStatus, Vec<u8>) {
    (ReplyStatus::Fail, message.as_bytes().to_vec())
}

/// Encodes a length-prefixed string field.
pub fn string_field(value: &str) -> Vec<u8> {
    let mut out = u32::try_from(value.len()).unwrap().to_le_bytes().to_vec();
    out.extend_from_slice(value.as_bytes());
    out
}
