use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::shutdown::{ShutdownReceiver, ShutdownSender};

/// One notification is enough: every worker subscribes before it starts.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Broadcasts a shutdown to every sender, listener and forwarder on Ctrl-C
/// or SIGTERM. Returns once a signal arrived or something else already
/// fired `shutdown_tx`.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => {}
            signal = wait_for_signal() => {
                tracing::info!("Received {}, stopping flows", signal);
                drop(shutdown_tx.send(()));
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "Ctrl-C",
                _ = terminate.recv() => "SIGTERM",
            }
        }
        Err(err) => {
            tracing::warn!("Failed to register SIGTERM handler: {}", err);
            wait_for_ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
    "Ctrl-C"
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::time::Duration;

    use tokio::net::UdpSocket;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::metrics::{Direction, SeriesKey};
    use crate::sinks::{SinkOptions, SinkSet};
    use crate::transport::{ListenerConfig, WorkerExit, spawn_listener};

    const STOP_TIMEOUT: Duration = Duration::from_secs(2);

    fn run_async_test<F>(future: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
        runtime.block_on(future)
    }

    #[test]
    fn broadcast_stops_running_listener() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, _) = shutdown_channel();
            let handler = setup_signal_shutdown_handler(&shutdown_tx);

            let socket = UdpSocket::bind("127.0.0.1:0").await?;
            let port = socket.local_addr()?.port();
            let (report_tx, mut report_rx) = mpsc::unbounded_channel();
            let flow_start = Instant::now();
            let listener = spawn_listener(
                socket,
                ListenerConfig {
                    port,
                    packet_size: 1000,
                    flow_end: flow_start + Duration::from_secs(60),
                    read_timeout: Duration::from_millis(20),
                },
                SinkSet::new(
                    SeriesKey::new(port, Direction::Output),
                    flow_start,
                    &SinkOptions::default(),
                    report_tx,
                ),
                shutdown_tx.subscribe(),
            );

            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown_tx
                .send(())
                .map_err(|err| AppError::validation(format!("Shutdown send failed: {}", err)))?;

            let outcome = tokio::time::timeout(STOP_TIMEOUT, listener)
                .await
                .map_err(|_err| AppError::validation("Listener ignored shutdown"))??;
            if outcome.exit != WorkerExit::Cancelled {
                return Err(AppError::validation(format!("Unexpected exit: {:?}", outcome.exit)));
            }
            if report_rx.recv().await.is_none() {
                return Err(AppError::validation("Cancelled listener must still report"));
            }
            tokio::time::timeout(STOP_TIMEOUT, handler)
                .await
                .map_err(|_err| AppError::validation("Signal handler kept running"))??;
            Ok(())
        })
    }

    #[test]
    fn handler_returns_when_shutdown_already_fired() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, _) = shutdown_channel();
            let handler = setup_signal_shutdown_handler(&shutdown_tx);
            drop(shutdown_tx.send(()));

            tokio::time::timeout(STOP_TIMEOUT, handler)
                .await
                .map_err(|_err| AppError::validation("Signal handler kept running"))??;
            if shutdown_tx.receiver_count() != 0 {
                return Err(AppError::validation("Handler must drop its subscription"));
            }
            Ok(())
        })
    }
}
