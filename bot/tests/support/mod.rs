//! Stateful loopback server for bot integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use client::{ClientConfig, RpcClient};
use wire::{AuthToken, MessageHeader, ReplyStatus, RequestKind, HEADER_SIZE, SIGNATURE_SIZE};

pub const USER_ID: u64 = 77;

/// Knobs and observations shared with the server thread.
#[derive(Default)]
pub struct ServerState {
    pub inbox: Mutex<VecDeque<(u64, u64, String)>>,
    pub echoes: AtomicUsize,
    pub chat_reads: AtomicUsize,
    /// Echo requests after this many fail with a server error.
    pub fail_echo_after: Mutex<Option<usize>>,
    pub reject_auth: Mutex<bool>,
    /// Drop the connection on the next request instead of answering it.
    pub hang_up: AtomicBool,
    pub registered: Mutex<Vec<String>>,
}

impl ServerState {
    pub fn push_message(&self, sender: u64, timestamp: u64, content: &str) {
        self.inbox
            .lock()
            .unwrap()
            .push_back((sender, timestamp, content.to_owned()));
    }
}

pub struct BotServer {
    pub state: Arc<ServerState>,
    port: u16,
    handle: JoinHandle<()>,
}

impl BotServer {
    pub fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(ServerState::default());
        let shared = Arc::clone(&state);
        let handle = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                let _ = serve(stream, &shared);
            }
        });
        Self {
            state,
            port,
            handle,
        }
    }

    pub fn connect(&self) -> Arc<RpcClient> {
        Arc::new(RpcClient::connect_to("127.0.0.1", self.port, ClientConfig::for_testing()).unwrap())
    }

    pub fn finish(self) {
        self.handle.join().unwrap();
    }
}

pub fn token() -> AuthToken {
    AuthToken {
        user_id: USER_ID,
        signature: [0x42; SIGNATURE_SIZE],
    }
}

fn serve(mut stream: TcpStream, state: &ServerState) -> io::Result<()> {
    loop {
        let mut head = [0u8; HEADER_SIZE];
        if stream.read_exact(&mut head).is_err() {
            return Ok(());
        }
        let header = MessageHeader::from_bytes(head);
        let mut body = vec![0u8; header.length as usize];
        stream.read_exact(&mut body)?;
        if state.hang_up.load(Ordering::SeqCst) {
            return Ok(());
        }
        let kind = RequestKind::parse(body[0])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let (status, payload) = respond(state, kind, &body[1..]);

        let length = u32::try_from(payload.len() + 1).unwrap();
        let mut out = MessageHeader::new(header.sequence, length).to_bytes().to_vec();
        out.push(status.as_u8());
        out.extend_from_slice(&payload);
        stream.write_all(&out)?;
    }
}

fn respond(state: &ServerState, kind: RequestKind, payload: &[u8]) -> (ReplyStatus, Vec<u8>) {
    match kind {
        RequestKind::Register => {
            let len = u32::from_le_bytes(payload[..4].try_into().unwrap()) as usize;
            let name = String::from_utf8_lossy(&payload[4..4 + len]).into_owned();
            let mut registered = state.registered.lock().unwrap();
            if registered.contains(&name) {
                return (ReplyStatus::Fail, b"User exists".to_vec());
            }
            registered.push(name);
            (ReplyStatus::Ok, Vec::new())
        }
        RequestKind::Auth => {
            if *state.reject_auth.lock().unwrap() {
                return (ReplyStatus::Fail, b"Invalid credentials".to_vec());
            }
            (ReplyStatus::Ok, token().encode().to_vec())
        }
        RequestKind::Echo => {
            let count = state.echoes.fetch_add(1, Ordering::SeqCst);
            if let Some(limit) = *state.fail_echo_after.lock().unwrap() {
                if count >= limit {
                    return (ReplyStatus::Fail, b"Go away".to_vec());
                }
            }
            (ReplyStatus::Ok, payload.to_vec())
        }
        RequestKind::ChatRead => {
            state.chat_reads.fetch_add(1, Ordering::SeqCst);
            match state.inbox.lock().unwrap().pop_front() {
                Some((sender, timestamp, content)) => {
                    let mut out = sender.to_le_bytes().to_vec();
                    out.extend(timestamp.to_le_bytes());
                    out.extend(u32::try_from(content.len()).unwrap().to_le_bytes());
                    out.extend(content.as_bytes());
                    (ReplyStatus::Ok, out)
                }
                None => {
                    // Keep the message loop from spinning the CPU flat out.
                    thread::sleep(std::time::Duration::from_millis(2));
                    (ReplyStatus::Fail, b"No messages".to_vec())
                }
            }
        }
        _ => (ReplyStatus::Fail, b"Unsupported".to_vec()),
    }
}
