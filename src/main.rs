//! Telegram Gateway - TCP gateway for field sensor telegrams
//!
//! Usage:
//!   telegram-gateway                       Serve (config or defaults)
//!   telegram-gateway --listen 0.0.0.0:7000 Serve on another address
//!   telegram-gateway send --kind rain      Send synthetic telegrams

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use telegram_gateway::cli::{Cli, Command};
use telegram_gateway::client::{self, SendOptions};
use telegram_gateway::config::{self, Config};
use telegram_gateway::dispatch::stats::Stats;
use telegram_gateway::error::{GatewayError, Result};
use telegram_gateway::logging;
use telegram_gateway::pipeline::DecoderSettings;
use telegram_gateway::server::{Server, ServerContext};
use telegram_gateway::sink::{self, LogDiagnostics};
use tracing::{info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(checksum) = cli.checksum {
        config.decoder.checksum = checksum;
    }
    config.validate()?;

    logging::init_tracing(cli.verbose, &config.logging.level);

    let rt = tokio::runtime::Runtime::new().map_err(|e| GatewayError::Runtime { source: e })?;

    rt.block_on(async {
        let shutdown = Arc::new(AtomicBool::new(false));
        spawn_signal_handler(shutdown.clone());

        match cli.command {
            None | Some(Command::Serve) => serve(&config, shutdown).await,
            Some(Command::Send {
                addr,
                kind,
                count,
                interval_ms,
                split,
                terminal,
                sensor,
            }) => {
                let opts = SendOptions {
                    addr,
                    kind,
                    count,
                    interval: Duration::from_millis(interval_ms),
                    split,
                    terminal_address: terminal,
                    sensor_address: sensor,
                };
                client::run(&opts, config.decoder.checksum.algorithm(), shutdown)
                    .await
                    .map(|_| ())
            }
        }
    })
}

async fn serve(config: &Config, shutdown: Arc<AtomicBool>) -> Result<()> {
    let context = ServerContext {
        settings: DecoderSettings::new(config.decoder.checksum, config.decoder.scaled_int),
        readings: sink::build(&config.sink)?,
        diagnostics: Arc::new(LogDiagnostics),
        stats: Arc::new(Stats::new()),
        idle_timeout: config.server.idle_timeout(),
        read_buffer_size: config.server.read_buffer_size,
    };
    info!(
        sink = ?config.sink.kind,
        scaled_int = ?config.decoder.scaled_int,
        "Starting gateway"
    );

    let server = Server::bind(config.server.listen_addr()?, context).await?;
    server.run(shutdown).await
}

/// Set `shutdown` on SIGINT/SIGTERM (Ctrl-C on Windows)
fn spawn_signal_handler(shutdown: Arc<AtomicBool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        tokio::spawn(async move {
            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Cannot install signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            info!("Shutdown requested");
            shutdown.store(true, Ordering::SeqCst);
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }
}
