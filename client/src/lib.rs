//! Thread-safe blocking RPC client for the blinkygram protocol.
//!
//! [`RpcClient`] owns one connection and exposes every protocol operation as a
//! typed method. Calls from many threads are serialized on an internal lock,
//! one full round trip at a time.
//!
//! Errors fall into four [`ErrorKind`]s: transport failures, protocol
//! violations, server-reported FAIL replies and local resource limits.
//!
//! # Example
//!
//! ```no_run
//! use client::{ClientConfig, RpcClient};
//!
//! let client = RpcClient::connect_to("localhost", 4000, ClientConfig::default())?;
//! client.echo(b"PING")?;
//! client.register("alice", "hunter2", "-----BEGIN PUBLIC KEY-----", true)?;
//! let token = client.authenticate("alice", "hunter2")?;
//! while let Some(msg) = client.read_chat(&token)? {
//!     println!("{}: {}", msg.sender, msg.content);
//! }
//! # Ok::<(), client::ClientError>(())
//! ```

mod client;
mod config;
mod error;
mod ops;

pub use client::{ConnectionState, RpcClient, Transport};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use ops::{NO_MESSAGES, USER_EXISTS};

pub use wire::{AuthToken, ChatMessage, RequestKind, TransferReceipt};
