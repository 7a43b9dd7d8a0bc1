//! Connection lifecycle and the locked round trip.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};
use wire::{ExchangeError, Reply, RequestKind};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// A byte stream the client can run exchanges over.
pub trait Transport: Read + Write + Send {
    /// Shuts the stream down in both directions.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        Self::shutdown(self, Shutdown::Both)
    }
}

/// Lifecycle state of an [`RpcClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Created, no transport yet.
    Unconnected,
    /// Ready for requests.
    Connected,
    /// Shut down; terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconnected => "unconnected",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

enum Conn<T> {
    Unconnected,
    Connected(T),
    Closed,
}

impl<T> Conn<T> {
    const fn state(&self) -> ConnectionState {
        match self {
            Self::Unconnected => ConnectionState::Unconnected,
            Self::Connected(_) => ConnectionState::Connected,
            Self::Closed => ConnectionState::Closed,
        }
    }
}

/// Blocking RPC client over one persistent connection.
///
/// Every operation holds the connection lock for its whole request/reply round
/// trip, so concurrent callers never interleave bytes on the wire. The client is
/// `Sync` and is meant to be shared behind an `Arc`.
pub struct RpcClient<T = TcpStream> {
    conn: Mutex<Conn<T>>,
    config: ClientConfig,
}

impl<T> fmt::Debug for RpcClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .conn
            .try_lock()
            .map_or_else(|_| "busy".to_owned(), |conn| conn.state().to_string());
        f.debug_struct("RpcClient")
            .field("state", &state)
            .field("config", &self.config)
            .finish()
    }
}

impl RpcClient<TcpStream> {
    /// Creates a client and connects it in one step.
    pub fn connect_to(host: &str, port: u16, config: ClientConfig) -> ClientResult<Self> {
        let client = Self::new(config);
        client.connect(host, port)?;
        Ok(client)
    }

    /// Resolves `host` and connects to the first address that accepts.
    ///
    /// Each attempt is bounded by the configured timeout, which also becomes
    /// the socket's read and write timeout.
    pub fn connect(&self, host: &str, port: u16) -> ClientResult<()> {
        let mut conn = self.lock();
        match *conn {
            Conn::Unconnected => {}
            Conn::Connected(_) => return Err(ClientError::AlreadyConnected),
            Conn::Closed => return Err(ClientError::Closed),
        }

        let stream = open_stream(host, port, &self.config)?;
        info!(host, port, "connected");
        *conn = Conn::Connected(stream);
        Ok(())
    }
}

fn open_stream(host: &str, port: u16, config: &ClientConfig) -> ClientResult<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ClientError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, config.timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(config.timeout))?;
                stream.set_write_timeout(Some(config.timeout))?;
                stream.set_nodelay(config.nodelay)?;
                return Ok(stream);
            }
            Err(err) => {
                debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(last_err.map_or_else(
        || ClientError::NoAddress {
            host: host.to_owned(),
            port,
        },
        |source| ClientError::Connect {
            host: host.to_owned(),
            port,
            source,
        },
    ))
}

impl<T: Transport> RpcClient<T> {
    /// Creates an unconnected client.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self {
            conn: Mutex::new(Conn::Unconnected),
            config,
        }
    }

    /// Creates a connected client over an existing transport.
    #[must_use]
    pub const fn from_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            conn: Mutex::new(Conn::Connected(transport)),
            config,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the lifecycle state.
    ///
    /// Blocks while another thread holds the connection for a round trip.
    pub fn state(&self) -> ConnectionState {
        self.lock().state()
    }

    /// Closes the client, shutting the transport down.
    ///
    /// Idempotent. Blocks until any in-flight round trip finishes.
    pub fn close(&self) {
        let mut conn = self.lock();
        shut_down(&mut conn);
    }

    /// Performs one exchange under the connection lock.
    ///
    /// FAIL replies are returned as-is; see [`call`](Self::call) for the
    /// checked variant.
    ///
    /// A transport or decode failure leaves the stream at an unknown position,
    /// so it closes the client. An encode failure happens before anything is
    /// written and leaves the connection usable.
    pub fn round_trip(&self, kind: RequestKind, payload: &[u8]) -> ClientResult<Reply> {
        let mut conn = self.lock();
        let result = match &mut *conn {
            Conn::Connected(transport) => {
                wire::request_with_limits(transport, kind, payload, &self.config.limits)
            }
            Conn::Unconnected => return Err(ClientError::NotConnected),
            Conn::Closed => return Err(ClientError::Closed),
        };

        match result {
            Ok(reply) => Ok(reply),
            Err(err @ ExchangeError::Encode(_)) => Err(err.into()),
            Err(err) => {
                warn!(kind = kind.name(), error = %err, "exchange failed, closing connection");
                shut_down(&mut conn);
                Err(err.into())
            }
        }
    }

    /// Performs one exchange and turns a FAIL reply into an error.
    pub fn call(&self, kind: RequestKind, payload: &[u8]) -> ClientResult<Reply> {
        let reply = self.round_trip(kind, payload)?;
        if reply.is_fail() {
            return Err(server_failure(kind, &reply));
        }
        Ok(reply)
    }

    /// Locks the connection. A poisoned lock means a round trip panicked
    /// midway, so the stream position is unknown and the client is closed.
    fn lock(&self) -> MutexGuard<'_, Conn<T>> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            let mut conn = poisoned.into_inner();
            if !matches!(*conn, Conn::Closed) {
                warn!("connection lock poisoned, closing client");
                *conn = Conn::Closed;
            }
            conn
        })
    }
}

/// Shuts a connected transport down and marks the connection closed.
fn shut_down<T: Transport>(conn: &mut Conn<T>) {
    if let Conn::Connected(mut transport) = std::mem::replace(conn, Conn::Closed) {
        if let Err(err) = transport.shutdown() {
            debug!(error = %err, "shutdown failed");
        }
        info!("connection closed");
    }
}

/// Builds the error for an untolerated FAIL reply, logging the server message.
pub(crate) fn server_failure(kind: RequestKind, reply: &Reply) -> ClientError {
    let message = reply.text().into_owned();
    warn!(kind = kind.name(), %message, "failure reply");
    ClientError::Server { kind, message }
}
