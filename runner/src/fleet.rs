//! `run`: a pool of bots sharing one account, stopped together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use bot::{Bot, BotConfig, BotError, BotHandle, Credentials, HandlerError, StatsSnapshot};
use client::RpcClient;
use serde::Serialize;
use tracing::{error, info};

use crate::{secrets, RunArgs};

/// Stop handles of every bot plus the shared failure flag.
#[derive(Default)]
struct FleetControl {
    handles: Mutex<Vec<BotHandle>>,
    failed: AtomicBool,
}

impl FleetControl {
    fn register(&self, handle: BotHandle) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    fn stop_all(&self) {
        for handle in self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            handle.stop();
        }
    }

    /// Marks the run failed and stops every bot. Only the first failure is
    /// logged here; the bot itself logs each one.
    fn fail(&self, err: &BotError) {
        if !self.failed.swap(true, Ordering::SeqCst) {
            error!(error = %err, "worker failed, stopping all workers");
        }
        self.stop_all();
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

/// Final counters of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub messages_handled: u64,
    pub keepalives_sent: u64,
    pub failed: bool,
}

impl WorkerReport {
    const fn new(worker: usize, stats: StatsSnapshot) -> Self {
        Self {
            worker,
            messages_handled: stats.messages_handled,
            keepalives_sent: stats.keepalives_sent,
            failed: stats.failed,
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetReport {
    pub username: String,
    pub workers: Vec<WorkerReport>,
    pub failed: bool,
}

pub fn run(args: &RunArgs) -> Result<FleetReport> {
    let server = &args.server;
    let credentials = Credentials {
        username: args.username.clone(),
        password: secrets::load_or_create_password(&args.password_file)?,
        public_key: secrets::load_public_key(&args.pubkey_file)?,
    };
    let config = BotConfig {
        keepalive_interval: Duration::from_secs(args.keepalive_secs),
        ..BotConfig::default()
    };

    info!(workers = args.workers.get(), "starting up");
    let control = Arc::new(FleetControl::default());

    let mut bots = Vec::with_capacity(args.workers.get());
    for worker in 0..args.workers.get() {
        let client = RpcClient::connect_to(&server.host, server.port, server.client_config())
            .with_context(|| {
                format!("worker {worker}: connect to {}:{}", server.host, server.port)
            })?;

        let on_error = {
            let control = Arc::clone(&control);
            move |err: &BotError| control.fail(err)
        };
        let bot = Bot::new(
            Arc::new(client),
            credentials.clone(),
            move |sender: u64, timestamp: u64, content: &str| -> Result<(), HandlerError> {
                info!(worker, sender, timestamp, content, "chat message");
                Ok(())
            },
            on_error,
            config.clone(),
        );
        control.register(bot.handle());
        bots.push(bot);
    }

    for (worker, bot) in bots.iter_mut().enumerate() {
        if let Err(err) = bot.start() {
            // Dropping the pool joins whatever already started.
            control.stop_all();
            return Err(err).with_context(|| format!("worker {worker}: start"));
        }
    }
    info!("startup complete");

    {
        let control = Arc::clone(&control);
        ctrlc::set_handler(move || {
            info!("terminating");
            control.stop_all();
        })
        .context("install signal handler")?;
    }

    let workers: Vec<_> = bots
        .into_iter()
        .enumerate()
        .map(|(worker, bot)| WorkerReport::new(worker, bot.join()))
        .collect();
    let failed = control.has_failed() || workers.iter().any(|w| w.failed);
    info!(failed, "all workers stopped");

    Ok(FleetReport {
        username: args.username.clone(),
        workers,
        failed,
    })
}
