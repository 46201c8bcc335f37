// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build Tracker Daemon (btd)
//!
//! Background process that owns the tracker timers and processes commands
//! from the CLI one at a time.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod server;

use std::time::Duration;

use bt_daemon::paths::LOG_FILE;
use bt_daemon::{DaemonPaths, STARTUP_MARKER_PREFIX};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::LifecycleError;

/// How often due timers are checked
const TICK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let paths = DaemonPaths::from_env()?;

    // Write startup marker to log (before tracing setup, so CLI can find it)
    write_startup_marker(&paths)?;

    let log_guard = setup_logging(&paths)?;

    info!(state_dir = %paths.state_dir.display(), "starting btd");

    let mut daemon = match lifecycle::startup(&paths).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&paths, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        daemon.paths.socket_path.display()
    );

    // Signal ready for parent process
    println!("READY");

    let mut tick = lifecycle::timer_ticker(TICK);

    loop {
        tokio::select! {
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        if let Err(e) = server::handle_connection(&mut daemon, stream).await {
                            error!("Error handling connection: {}", e);
                        }
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            Some(command) = daemon.commands.recv() => {
                if let Err(e) = daemon.process_command(command).await {
                    error!("Error processing command: {}", e);
                }
            }

            _ = tick.tick() => {
                daemon.fire_timers().await;
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                daemon.shutdown().await?;
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                daemon.shutdown().await?;
                break;
            }
        }

        if daemon.shutdown_requested {
            info!("Shutdown requested via IPC, shutting down...");
            daemon.shutdown().await?;
            break;
        }
    }

    info!("Daemon stopped");
    Ok(())
}

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(paths: &DaemonPaths) -> Result<(), LifecycleError> {
    use std::io::Write;

    std::fs::create_dir_all(&paths.state_dir)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)?;
    writeln!(file, "{}{})", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(paths: &DaemonPaths, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    paths: &DaemonPaths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(&paths.state_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
