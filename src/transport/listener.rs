use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

use super::WorkerExit;
use super::wire::{HEADER_OVERHEAD, TAG_SIZE, decode_tag};
use crate::metrics::DataTraceEvent;
use crate::shutdown::ShutdownReceiver;
use crate::sinks::SinkSet;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct ListenerConfig {
    pub port: u16,
    /// Largest datagram read, in bytes.
    pub packet_size: usize,
    pub flow_end: Instant,
    pub read_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerOutcome {
    pub port: u16,
    pub packets_received: u64,
    pub bytes_received: u64,
    pub read_errors: u64,
    pub exit: WorkerExit,
}

#[must_use]
pub fn spawn_listener(
    socket: UdpSocket,
    config: ListenerConfig,
    sinks: SinkSet,
    shutdown_rx: ShutdownReceiver,
) -> JoinHandle<ListenerOutcome> {
    tokio::spawn(run_listener(socket, config, sinks, shutdown_rx))
}

/// Records every tagged datagram until the flow end or shutdown, then writes
/// the sentinel and finalizes `sinks`.
pub async fn run_listener(
    socket: UdpSocket,
    config: ListenerConfig,
    mut sinks: SinkSet,
    mut shutdown_rx: ShutdownReceiver,
) -> ListenerOutcome {
    let mut buf = vec![0_u8; config.packet_size.max(TAG_SIZE)];
    let read_timeout = if config.read_timeout.is_zero() {
        DEFAULT_READ_TIMEOUT
    } else {
        config.read_timeout
    };
    let mut outcome = ListenerOutcome {
        port: config.port,
        packets_received: 0,
        bytes_received: 0,
        read_errors: 0,
        exit: WorkerExit::Deadline,
    };

    loop {
        let now = Instant::now();
        if now >= config.flow_end {
            outcome.exit = WorkerExit::Deadline;
            break;
        }
        let wait = read_timeout.min(config.flow_end.saturating_duration_since(now));

        let read = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                outcome.exit = WorkerExit::Cancelled;
                break;
            }
            read = timeout(wait, socket.recv_from(&mut buf)) => read,
        };

        let len = match read {
            Err(_elapsed) => continue,
            Ok(Ok((len, _peer))) => len,
            Ok(Err(err)) => {
                tracing::warn!("Error receiving on port {}: {}", config.port, err);
                outcome.read_errors = outcome.read_errors.saturating_add(1);
                continue;
            }
        };
        // Too short to carry a tag: same as a timeout.
        let Some(tag) = buf.get(..len).and_then(decode_tag) else {
            continue;
        };

        let size = u64::try_from(len.saturating_add(HEADER_OVERHEAD)).unwrap_or(u64::MAX);
        sinks.write(&DataTraceEvent::new(i64::from(tag), Instant::now(), size));
        outcome.packets_received = outcome.packets_received.saturating_add(1);
        outcome.bytes_received = outcome.bytes_received.saturating_add(size);
    }

    sinks.write(&DataTraceEvent::sentinel(Instant::now()));
    if let Err(err) = sinks.finalize().await {
        tracing::warn!("Failed to finalize listener sinks for port {}: {}", config.port, err);
    }
    tracing::debug!(
        "Listener on port {} stopped ({:?}) after {} packets.",
        config.port,
        outcome.exit,
        outcome.packets_received
    );
    outcome
}
