mod support;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use bot::{Bot, BotConfig, BotError, BotHandle, BotState, Credentials, HandlerError};
use client::{ClientError, RpcClient};
use support::{BotServer, USER_ID};

fn credentials() -> Credentials {
    Credentials {
        username: "bot-under-test".into(),
        password: "pw".into(),
        public_key: "-----BEGIN PUBLIC KEY-----".into(),
    }
}

fn quiet_bot(client: Arc<RpcClient>, config: BotConfig) -> Bot {
    Bot::new(
        client,
        credentials(),
        |_: u64, _: u64, _: &str| -> Result<(), HandlerError> { Ok(()) },
        |_: &BotError| {},
        config,
    )
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn start_logs_in_and_runs_both_loops() {
    let server = BotServer::spawn();
    let mut bot = quiet_bot(server.connect(), BotConfig::for_testing());

    bot.start().unwrap();
    assert_eq!(bot.state(), BotState::Running);
    assert_eq!(bot.auth_token().map(|t| t.user_id), Some(USER_ID));
    assert_eq!(*server.state.registered.lock().unwrap(), vec!["bot-under-test"]);

    assert!(wait_until(Duration::from_secs(2), || {
        server.state.echoes.load(Ordering::SeqCst) >= 2
            && server.state.chat_reads.load(Ordering::SeqCst) >= 2
    }));

    bot.stop();
    assert_eq!(bot.state(), BotState::Stopped);
    let stats = bot.join();
    assert!(!stats.failed);
    assert!(stats.keepalives_sent >= 2);
}

#[test]
fn start_tolerates_existing_account() {
    let server = BotServer::spawn();
    server
        .state
        .registered
        .lock()
        .unwrap()
        .push("bot-under-test".into());
    let mut bot = quiet_bot(server.connect(), BotConfig::for_testing());

    bot.start().unwrap();
    bot.stop();
    assert!(!bot.join().failed);
}

#[test]
fn rejected_login_leaves_bot_created() {
    let server = BotServer::spawn();
    *server.state.reject_auth.lock().unwrap() = true;
    let mut bot = quiet_bot(server.connect(), BotConfig::for_testing());

    let err = bot.start().unwrap_err();
    match err {
        BotError::Client(ClientError::Server { message, .. }) => {
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(bot.state(), BotState::Created);
    assert_eq!(server.state.echoes.load(Ordering::SeqCst), 0);
}

#[test]
fn second_start_is_rejected() {
    let server = BotServer::spawn();
    let mut bot = quiet_bot(server.connect(), BotConfig::for_testing());

    bot.start().unwrap();
    assert!(matches!(bot.start(), Err(BotError::AlreadyStarted)));
    bot.stop();
    bot.join();
}

#[test]
fn stop_interrupts_keepalive_wait() {
    let server = BotServer::spawn();
    // The keepalive would sleep ten seconds between echoes.
    let mut bot = quiet_bot(server.connect(), BotConfig::default());

    bot.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || {
        server.state.echoes.load(Ordering::SeqCst) >= 1
    }));

    let started = Instant::now();
    bot.stop();
    let stats = bot.join();
    assert!(started.elapsed() < Duration::from_secs(2), "join took {:?}", started.elapsed());
    assert_eq!(stats.keepalives_sent, 1);
    assert!(!stats.failed);
}

#[test]
fn stop_right_after_start_is_prompt() {
    let server = BotServer::spawn();
    let mut bot = quiet_bot(server.connect(), BotConfig::default());

    let started = Instant::now();
    bot.start().unwrap();
    bot.stop();
    let stats = bot.join();

    assert!(started.elapsed() < Duration::from_secs(2), "join took {:?}", started.elapsed());
    assert!(stats.keepalives_sent <= 1);
    assert!(!stats.failed);
}

#[test]
fn concurrent_stops_are_safe() {
    let server = BotServer::spawn();
    let mut bot = quiet_bot(server.connect(), BotConfig::for_testing());
    bot.start().unwrap();

    let stoppers: Vec<_> = (0..8)
        .map(|_| {
            let handle = bot.handle();
            thread::spawn(move || {
                for _ in 0..10 {
                    handle.stop();
                }
            })
        })
        .collect();
    for stopper in stoppers {
        stopper.join().unwrap();
    }

    assert!(bot.handle().is_stopped());
    assert!(!bot.join().failed);
}

#[test]
fn messages_reach_handler_in_order() {
    let server = BotServer::spawn();
    server.state.push_message(5, 100, "first");
    server.state.push_message(6, 200, "second");
    server.state.push_message(5, 300, "third");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut bot = Bot::new(
        server.connect(),
        credentials(),
        move |sender: u64, timestamp: u64, content: &str| -> Result<(), HandlerError> {
            sink.lock().unwrap().push((sender, timestamp, content.to_owned()));
            Ok(())
        },
        |_: &BotError| {},
        BotConfig::for_testing(),
    );

    bot.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || bot.stats().messages_handled == 3));
    bot.stop();
    let stats = bot.join();

    assert_eq!(stats.messages_handled, 3);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (5, 100, "first".to_owned()),
            (6, 200, "second".to_owned()),
            (5, 300, "third".to_owned()),
        ]
    );
}

#[test]
fn handler_failure_stops_bot() {
    let server = BotServer::spawn();
    server.state.push_message(9, 1, "boom");

    let errors = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&errors);
    let mut bot = Bot::new(
        server.connect(),
        credentials(),
        |_: u64, _: u64, content: &str| -> Result<(), HandlerError> {
            Err(format!("cannot handle {content}").into())
        },
        move |err: &BotError| log.lock().unwrap().push(err.to_string()),
        BotConfig::default(),
    );

    bot.start().unwrap();
    let handle = bot.handle();
    assert!(wait_until(Duration::from_secs(2), || handle.is_stopped()));
    let stats = bot.join();

    assert!(stats.failed);
    assert_eq!(stats.messages_handled, 0);
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("cannot handle boom"), "{}", errors[0]);
}

#[test]
fn keepalive_failure_reports_and_stops() {
    let server = BotServer::spawn();
    *server.state.fail_echo_after.lock().unwrap() = Some(1);

    let reported = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&reported);
    let mut bot = Bot::new(
        server.connect(),
        credentials(),
        |_: u64, _: u64, _: &str| -> Result<(), HandlerError> { Ok(()) },
        move |err: &BotError| {
            slot.lock().unwrap().get_or_insert_with(|| err.to_string());
        },
        BotConfig::for_testing(),
    );

    bot.start().unwrap();
    let handle = bot.handle();
    assert!(wait_until(Duration::from_secs(2), || handle.is_stopped()));
    let stats = bot.join();

    assert!(stats.failed);
    assert_eq!(stats.keepalives_sent, 1);
    let message = reported.lock().unwrap().clone().unwrap();
    assert!(message.contains("Go away"), "{message}");
}

#[test]
fn server_hang_up_reports_and_stops() {
    let server = BotServer::spawn();
    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let mut bot = Bot::new(
        server.connect(),
        credentials(),
        |_: u64, _: u64, _: &str| -> Result<(), HandlerError> { Ok(()) },
        move |err: &BotError| {
            assert!(matches!(err, BotError::Client(_)));
            *counter.lock().unwrap() += 1;
        },
        BotConfig::for_testing(),
    );

    bot.start().unwrap();
    server.state.hang_up.store(true, Ordering::SeqCst);
    let handle = bot.handle();
    assert!(wait_until(Duration::from_secs(4), || handle.is_stopped()));
    let stats = bot.join();

    assert!(stats.failed);
    // Either loop, or both, may observe the dead connection.
    let calls = *calls.lock().unwrap();
    assert!((1..=2).contains(&calls), "error handler ran {calls} times");
}

#[test]
fn error_handler_may_stop_reentrantly() {
    let server = BotServer::spawn();
    *server.state.fail_echo_after.lock().unwrap() = Some(0);

    let handle_slot: Arc<OnceLock<BotHandle>> = Arc::new(OnceLock::new());
    let inner = Arc::clone(&handle_slot);
    let mut bot = Bot::new(
        server.connect(),
        credentials(),
        |_: u64, _: u64, _: &str| -> Result<(), HandlerError> { Ok(()) },
        move |_: &BotError| {
            if let Some(handle) = inner.get() {
                handle.stop();
                handle.stop();
            }
        },
        BotConfig::for_testing(),
    );
    handle_slot.set(bot.handle()).unwrap();

    bot.start().unwrap();
    let handle = bot.handle();
    assert!(wait_until(Duration::from_secs(2), || handle.is_stopped()));
    assert!(bot.join().failed);
}

#[test]
fn dropping_running_bot_joins_threads() {
    let server = BotServer::spawn();
    let mut bot = quiet_bot(server.connect(), BotConfig::default());
    bot.start().unwrap();
    let handle = bot.handle();

    let started = Instant::now();
    drop(bot);
    assert!(handle.is_stopped());
    assert!(started.elapsed() < Duration::from_secs(2));
}
