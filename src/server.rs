//! TCP server for sensor terminals
//!
//! Accepts terminal connections and gives each one its own task and its own
//! decoding pipeline:
//! - accept loop: polls the shutdown flag between accepts
//! - connection task: reads chunks, feeds the pipeline, closes on idle timeout
//!
//! Sinks and counters are the only state shared between connections.

use crate::constants::{
    LISTEN_BACKLOG, MAX_SOCKET_RETRY_ATTEMPTS, RETRY_BASE_DELAY_MS, SHUTDOWN_POLL_INTERVAL_MS,
};
use crate::dispatch::stats::Stats;
use crate::dispatch::{ConnectionId, DiagnosticSink, Dispatcher, ReadingSink};
use crate::error::{GatewayError, Result};
use crate::pipeline::{DecoderSettings, Pipeline};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Everything a connection task needs, cloned per connection
#[derive(Clone)]
pub struct ServerContext {
    pub settings: DecoderSettings,
    pub readings: Arc<dyn ReadingSink>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub stats: Arc<Stats>,
    pub idle_timeout: Duration,
    pub read_buffer_size: usize,
}

/// Bound listener, ready to accept terminals
pub struct Server {
    listener: TcpListener,
    context: ServerContext,
    next_id: AtomicU64,
}

impl Server {
    /// Bind the listener (port 0 picks a free port)
    ///
    /// Retry backoff sleeps on the runtime, so other tasks keep running.
    pub async fn bind(addr: SocketAddr, context: ServerContext) -> Result<Self> {
        let listener = create_reusable_tcp_listener(addr).await?;
        Ok(Self {
            listener,
            context,
            next_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` is set
    pub async fn run(self, shutdown: Arc<AtomicBool>) -> Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(
                %addr,
                checksum = self.context.settings.validator.checksum_name(),
                "Listening for terminals"
            );
        }

        while !shutdown.load(Ordering::Relaxed) {
            match tokio::time::timeout(
                Duration::from_millis(SHUTDOWN_POLL_INTERVAL_MS),
                self.listener.accept(),
            )
            .await
            {
                Ok(Ok((stream, peer))) => {
                    let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
                    let context = self.context.clone();
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, peer, id, context, shutdown).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient accept errors (e.g. too many open files)
                    warn!("Accept failed: {}", e);
                }
                Err(_) => {
                    // Timeout - expected, allows checking shutdown flag
                }
            }
        }

        info!(stats = ?self.context.stats.snapshot(), "Server stopped");
        Ok(())
    }
}

/// Serve one terminal until it disconnects, idles out, or shutdown
pub async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    id: ConnectionId,
    context: ServerContext,
    shutdown: Arc<AtomicBool>,
) {
    context.stats.connection_opened();
    info!(connection = %id, %peer, "Terminal connected");

    let dispatcher = Dispatcher::new(
        id,
        context.readings.clone(),
        context.diagnostics.clone(),
        context.stats.clone(),
    );
    let mut pipeline = Pipeline::new(context.settings.clone(), dispatcher);
    let mut buf = vec![0u8; context.read_buffer_size];

    let reason = loop {
        if shutdown.load(Ordering::Relaxed) {
            break "shutdown";
        }
        match tokio::time::timeout(context.idle_timeout, stream.read(&mut buf)).await {
            Ok(Ok(0)) => break "closed by peer",
            Ok(Ok(n)) => {
                let summary = pipeline.push(&buf[..n]);
                debug!(
                    connection = %id,
                    bytes = n,
                    frames = summary.frames(),
                    pending = pipeline.pending(),
                    "Chunk processed"
                );
            }
            Ok(Err(e)) => {
                warn!(connection = %id, "Read error: {}", e);
                break "read error";
            }
            Err(_) => {
                info!(
                    connection = %id,
                    "No data received for {} seconds, closing",
                    context.idle_timeout.as_secs()
                );
                break "idle timeout";
            }
        }
    };

    pipeline.reset();
    info!(
        connection = %id,
        %peer,
        reason,
        stats = ?context.stats.snapshot(),
        "Terminal disconnected"
    );
}

/// Create a TCP listener with SO_REUSEADDR for quick rebind after restart
///
/// Retries a few times if the address is still in use.
async fn create_reusable_tcp_listener(addr: SocketAddr) -> Result<TcpListener> {
    let map_err = |e| GatewayError::TcpBind { addr, source: e };

    for attempt in 0..MAX_SOCKET_RETRY_ATTEMPTS {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(map_err)?;
        socket.set_reuse_address(true).map_err(map_err)?;
        socket.set_nonblocking(true).map_err(map_err)?;

        match socket.bind(&addr.into()) {
            Ok(_) => {
                socket.listen(LISTEN_BACKLOG).map_err(map_err)?;
                let std_listener: std::net::TcpListener = socket.into();
                return TcpListener::from_std(std_listener).map_err(map_err);
            }
            Err(_) if attempt < MAX_SOCKET_RETRY_ATTEMPTS - 1 => {
                // Exponential backoff: 200ms, 400ms, 800ms, 1600ms
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * (1 << attempt));
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(map_err(e)),
        }
    }

    Err(GatewayError::TcpBind {
        addr,
        source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "failed after retries"),
    })
}
