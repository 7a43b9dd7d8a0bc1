//! Dual-thread bot runtime for blinkygram clients.
//!
//! A [`Bot`] logs in over a shared [`RpcClient`](client::RpcClient) and runs two
//! threads: a message loop that polls the chat queue and a keepalive loop that
//! echoes on a fixed interval. Both watch one [`CancellationToken`]; whichever
//! stops first stops the other, and [`Bot::join`] collects them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bot::{Bot, BotConfig, BotError, Credentials, HandlerError};
//! use client::{ClientConfig, RpcClient};
//!
//! let client = Arc::new(RpcClient::connect_to("localhost", 4000, ClientConfig::default())?);
//! let credentials = Credentials {
//!     username: "bot-1".into(),
//!     password: "hunter2".into(),
//!     public_key: "-----BEGIN PUBLIC KEY-----".into(),
//! };
//!
//! let mut bot = Bot::new(
//!     client,
//!     credentials,
//!     |sender: u64, _timestamp: u64, content: &str| -> Result<(), HandlerError> {
//!         println!("{sender}: {content}");
//!         Ok(())
//!     },
//!     |err: &BotError| eprintln!("bot failed: {err}"),
//!     BotConfig::default(),
//! );
//! bot.start()?;
//! bot.handle().stop();
//! let stats = bot.join();
//! println!("handled {} messages", stats.messages_handled);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cancel;
mod config;
mod error;
mod handler;
mod runtime;
mod stats;

pub use cancel::CancellationToken;
pub use config::{BotConfig, DEFAULT_KEEPALIVE_INTERVAL, DEFAULT_KEEPALIVE_PAYLOAD};
pub use error::{BotError, BotResult};
pub use handler::{ErrorHandler, HandlerError, MessageHandler};
pub use runtime::{Bot, BotHandle, BotState, Credentials};
pub use stats::{BotStats, StatsSnapshot};
