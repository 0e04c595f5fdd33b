use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

use super::WorkerExit;
use crate::shutdown::ShutdownReceiver;

pub const DEFAULT_FORWARD_PACKET_SIZE: usize = 5000;
pub const DEFAULT_FORWARD_READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct ForwardConfig {
    pub port: u16,
    pub destination: SocketAddr,
    pub packet_size: usize,
    pub read_timeout: Duration,
    pub deadline: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub port: u16,
    pub forwarded: u64,
    pub errors: u64,
    pub exit: WorkerExit,
}

#[must_use]
pub fn spawn_forwarder(
    socket: UdpSocket,
    config: ForwardConfig,
    shutdown_rx: ShutdownReceiver,
) -> JoinHandle<ForwardOutcome> {
    tokio::spawn(run_forwarder(socket, config, shutdown_rx))
}

/// Relays every datagram received on `socket` unchanged to the destination.
pub async fn run_forwarder(
    socket: UdpSocket,
    config: ForwardConfig,
    mut shutdown_rx: ShutdownReceiver,
) -> ForwardOutcome {
    let mut buf = vec![0_u8; config.packet_size.max(1)];
    let mut outcome = ForwardOutcome {
        port: config.port,
        forwarded: 0,
        errors: 0,
        exit: WorkerExit::Deadline,
    };

    loop {
        let wait = match config.deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                config
                    .read_timeout
                    .min(deadline.saturating_duration_since(now))
            }
            None => config.read_timeout,
        };

        let read = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                outcome.exit = WorkerExit::Cancelled;
                break;
            }
            read = timeout(wait, socket.recv_from(&mut buf)) => read,
        };

        let len = match read {
            // Timeouts and empty datagrams only re-check the deadline.
            Err(_) | Ok(Ok((0, _))) => continue,
            Ok(Ok((len, _peer))) => len,
            Ok(Err(err)) => {
                tracing::warn!("Error receiving on port {}: {}", config.port, err);
                outcome.errors = outcome.errors.saturating_add(1);
                continue;
            }
        };
        let Some(payload) = buf.get(..len) else {
            continue;
        };
        match socket.send_to(payload, config.destination).await {
            Ok(_) => outcome.forwarded = outcome.forwarded.saturating_add(1),
            Err(err) => {
                tracing::warn!("Error forwarding to {}: {}", config.destination, err);
                outcome.errors = outcome.errors.saturating_add(1);
            }
        }
    }

    tracing::info!(
        "Forwarder on port {} stopped after {} datagrams.",
        config.port,
        outcome.forwarded
    );
    outcome
}
