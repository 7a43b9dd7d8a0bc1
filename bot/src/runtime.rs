//! The bot: session bootstrap, two loop threads, cooperative shutdown.

use std::fmt;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use client::{AuthToken, RpcClient, Transport};
use tracing::{debug, error, info};

use crate::cancel::CancellationToken;
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::handler::{ErrorHandler, MessageHandler};
use crate::stats::{BotStats, StatsSnapshot};

/// Account a bot logs in with.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// PEM-encoded public key, published to the server on registration.
    pub public_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of a [`Bot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotState {
    /// Not started yet.
    Created,
    /// Loops running.
    Running,
    /// Stop requested or a loop failed; terminal.
    Stopped,
}

/// Stops a bot from any thread without owning it.
#[derive(Debug, Clone)]
pub struct BotHandle {
    cancel: CancellationToken,
    stats: Arc<BotStats>,
}

impl BotHandle {
    /// Requests shutdown and wakes the keepalive loop.
    ///
    /// Idempotent and safe to call concurrently, including from a loop's error
    /// path. An in-flight network call is not interrupted; it finishes or times
    /// out first.
    pub fn stop(&self) {
        if self.cancel.cancel() {
            debug!("bot stop requested");
        }
    }

    /// Returns `true` once stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns the bot's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// State both loop threads share.
struct LoopContext<T> {
    name: String,
    client: Arc<RpcClient<T>>,
    auth: AuthToken,
    config: BotConfig,
    on_message: Arc<dyn MessageHandler>,
    on_error: Arc<dyn ErrorHandler>,
    handle: BotHandle,
}

impl<T> LoopContext<T> {
    fn fail(&self, err: &BotError) {
        self.handle.stats.record_failure();
        error!(bot = %self.name, error = %err, "bot loop failed");
        self.on_error.on_error(err);
    }
}

/// A worker that polls its chat queue and keeps its connection alive.
///
/// [`start`](Self::start) logs in and spawns two threads: one pulls chat
/// messages and hands them to the [`MessageHandler`], the other echoes a
/// keepalive every [`BotConfig::keepalive_interval`]. A failure in either loop
/// reports to the [`ErrorHandler`] and stops both. [`join`](Self::join) waits
/// for the threads and can run only once.
pub struct Bot<T = TcpStream> {
    client: Arc<RpcClient<T>>,
    credentials: Credentials,
    config: BotConfig,
    on_message: Arc<dyn MessageHandler>,
    on_error: Arc<dyn ErrorHandler>,
    handle: BotHandle,
    auth: Option<AuthToken>,
    threads: Vec<JoinHandle<()>>,
}

impl<T> fmt::Debug for Bot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("username", &self.credentials.username)
            .field("started", &self.auth.is_some())
            .field("stopped", &self.handle.is_stopped())
            .field("threads", &self.threads.len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport + 'static> Bot<T> {
    /// Creates a bot over a connected client. Nothing is sent until
    /// [`start`](Self::start).
    pub fn new(
        client: Arc<RpcClient<T>>,
        credentials: Credentials,
        on_message: impl MessageHandler + 'static,
        on_error: impl ErrorHandler + 'static,
        config: BotConfig,
    ) -> Self {
        Self {
            client,
            credentials,
            config,
            on_message: Arc::new(on_message),
            on_error: Arc::new(on_error),
            handle: BotHandle {
                cancel: CancellationToken::new(),
                stats: Arc::new(BotStats::default()),
            },
            auth: None,
            threads: Vec::new(),
        }
    }

    /// Registers (tolerating an existing account), logs in, then spawns the
    /// message and keepalive threads.
    ///
    /// A bootstrap failure is returned and no thread is spawned; the bot stays
    /// in [`BotState::Created`].
    pub fn start(&mut self) -> BotResult<()> {
        if self.auth.is_some() {
            return Err(BotError::AlreadyStarted);
        }

        let Credentials {
            username,
            password,
            public_key,
        } = &self.credentials;
        self.client.register(username, password, public_key, true)?;
        let auth = self.client.authenticate(username, password)?;

        let ctx = Arc::new(LoopContext {
            name: username.clone(),
            client: Arc::clone(&self.client),
            auth,
            config: self.config.clone(),
            on_message: Arc::clone(&self.on_message),
            on_error: Arc::clone(&self.on_error),
            handle: self.handle.clone(),
        });

        let keepalive = spawn_loop("keepalive", Arc::clone(&ctx), keepalive_loop)?;
        let messages = match spawn_loop("messages", ctx, message_loop) {
            Ok(messages) => messages,
            Err(err) => {
                self.handle.stop();
                if keepalive.join().is_err() {
                    error!(bot = %username, "keepalive thread panicked");
                }
                return Err(err);
            }
        };

        info!(bot = %username, user_id = auth.user_id, "bot started");
        self.auth = Some(auth);
        self.threads = vec![messages, keepalive];
        Ok(())
    }

    /// Requests shutdown. See [`BotHandle::stop`].
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Returns a handle that can stop the bot from elsewhere.
    pub fn handle(&self) -> BotHandle {
        self.handle.clone()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> BotState {
        if self.handle.is_stopped() {
            BotState::Stopped
        } else if self.auth.is_some() {
            BotState::Running
        } else {
            BotState::Created
        }
    }

    /// Returns the token obtained at start.
    pub const fn auth_token(&self) -> Option<&AuthToken> {
        self.auth.as_ref()
    }

    /// Returns the client the bot runs on.
    pub const fn client(&self) -> &Arc<RpcClient<T>> {
        &self.client
    }

    /// Returns the bot's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.handle.stats()
    }

    /// Waits for both loop threads to exit and returns the final counters.
    ///
    /// Does not stop the bot by itself; call [`stop`](Self::stop) first, or
    /// rely on a loop failing. A panicked loop counts as a failure.
    pub fn join(mut self) -> StatsSnapshot {
        self.join_threads();
        info!(bot = %self.credentials.username, "bot stopped");
        self.handle.stats()
    }
}

impl<T> Bot<T> {
    fn join_threads(&mut self) {
        for thread in self.threads.drain(..) {
            let name = thread.thread().name().unwrap_or("bot").to_owned();
            if thread.join().is_err() {
                self.handle.stats.record_failure();
                error!(thread = %name, "bot thread panicked");
            }
        }
    }
}

impl<T> Drop for Bot<T> {
    fn drop(&mut self) {
        if !self.threads.is_empty() {
            self.handle.stop();
            self.join_threads();
        }
    }
}

fn spawn_loop<T: Transport + 'static>(
    role: &'static str,
    ctx: Arc<LoopContext<T>>,
    body: fn(&LoopContext<T>),
) -> BotResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{}-{role}", ctx.name))
        .spawn(move || {
            body(&ctx);
            // Whichever loop exits first takes its sibling down with it.
            ctx.handle.stop();
        })
        .map_err(|source| BotError::Spawn { name: role, source })
}

fn message_loop<T: Transport>(ctx: &LoopContext<T>) {
    while !ctx.handle.is_stopped() {
        let msg = match ctx.client.read_chat(&ctx.auth) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(err) => {
                ctx.fail(&BotError::Client(err));
                return;
            }
        };

        if let Err(err) = ctx
            .on_message
            .handle(msg.sender, msg.timestamp, &msg.content)
        {
            ctx.fail(&BotError::Handler(err));
            return;
        }
        ctx.handle.stats.record_message();
    }
}

fn keepalive_loop<T: Transport>(ctx: &LoopContext<T>) {
    while !ctx.handle.is_stopped() {
        if let Err(err) = ctx.client.echo(&ctx.config.keepalive_payload) {
            ctx.fail(&BotError::Client(err));
            return;
        }
        ctx.handle.stats.record_keepalive();

        if ctx.handle.cancel.wait_timeout(ctx.config.keepalive_interval) {
            return;
        }
    }
}
