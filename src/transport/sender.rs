use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use super::WorkerExit;
use super::wire::{TagArena, WireLayout};
use crate::metrics::DataTraceEvent;
use crate::pattern::Event;
use crate::shutdown::ShutdownReceiver;
use crate::sinks::SinkSet;

#[derive(Debug, Clone, Copy)]
pub struct SenderConfig {
    pub destination: SocketAddr,
    pub flow_start: Instant,
    pub flow_end: Instant,
    pub packet_size: usize,
    /// Sum of the largest bursts of every merged pattern, in bytes.
    pub backlog: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderOutcome {
    pub destination: SocketAddr,
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub send_errors: u64,
    pub truncated_bursts: u64,
    pub exit: WorkerExit,
}

/// One packet that made it onto the socket, waiting to be recorded.
#[derive(Debug, Clone, Copy)]
struct Emitted {
    tag: u32,
    wire_size: usize,
}

#[must_use]
pub fn spawn_sender<I>(
    socket: UdpSocket,
    events: I,
    config: SenderConfig,
    sinks: SinkSet,
    shutdown_rx: ShutdownReceiver,
) -> JoinHandle<SenderOutcome>
where
    I: Iterator<Item = Event> + Send + 'static,
{
    tokio::spawn(run_sender(socket, events, config, sinks, shutdown_rx))
}

/// Emits `events` at `flow_start + offset` until the sequence ends, the flow
/// end is reached or shutdown is broadcast. Always writes the sentinel and
/// finalizes `sinks` before returning.
pub async fn run_sender<I>(
    socket: UdpSocket,
    events: I,
    config: SenderConfig,
    mut sinks: SinkSet,
    mut shutdown_rx: ShutdownReceiver,
) -> SenderOutcome
where
    I: Iterator<Item = Event>,
{
    let layout = WireLayout::new(config.packet_size);
    let mut arena = TagArena::new(layout, config.backlog);
    let mut emitted: Vec<Emitted> = Vec::with_capacity(arena.slots());
    let mut outcome = SenderOutcome {
        destination: config.destination,
        packets_sent: 0,
        bytes_sent: 0,
        send_errors: 0,
        truncated_bursts: 0,
        exit: WorkerExit::Exhausted,
    };
    let mut tag: u32 = 0;

    for event in events {
        let Some(deadline) = config.flow_start.checked_add(event.offset) else {
            outcome.exit = WorkerExit::Deadline;
            break;
        };
        if deadline >= config.flow_end {
            outcome.exit = WorkerExit::Deadline;
            break;
        }

        let burst = layout.partition(event.size);
        let wanted = burst.packets();
        let stamped = arena.stamp(tag, wanted);
        if stamped < wanted {
            tracing::warn!(
                "Burst of {} bytes to {} needs {} packets, arena holds {}; truncating.",
                event.size,
                config.destination,
                wanted,
                stamped
            );
            outcome.truncated_bursts = outcome.truncated_bursts.saturating_add(1);
        }

        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                outcome.exit = WorkerExit::Cancelled;
                break;
            }
            () = sleep_until(deadline) => {}
        }

        emitted.clear();
        for index in 0..stamped {
            let wire_size = if index < burst.full {
                layout.packet_size
            } else {
                burst.residual.unwrap_or(layout.packet_size)
            };
            let Some(payload) = arena.packet(index, WireLayout::payload_len(wire_size)) else {
                continue;
            };
            match socket.send_to(payload, config.destination).await {
                Ok(_) => emitted.push(Emitted {
                    tag: tag.wrapping_add(u32::try_from(index).unwrap_or(u32::MAX)),
                    wire_size,
                }),
                Err(err) => {
                    tracing::warn!("Error sending to {}: {}", config.destination, err);
                    outcome.send_errors = outcome.send_errors.saturating_add(1);
                }
            }
        }

        let sent_time = Instant::now();
        for packet in &emitted {
            let size = u64::try_from(packet.wire_size).unwrap_or(u64::MAX);
            sinks.write(&DataTraceEvent::new(i64::from(packet.tag), sent_time, size));
            outcome.bytes_sent = outcome.bytes_sent.saturating_add(size);
        }
        outcome.packets_sent = outcome
            .packets_sent
            .saturating_add(u64::try_from(emitted.len()).unwrap_or(u64::MAX));
        tag = tag.wrapping_add(u32::try_from(stamped).unwrap_or(u32::MAX));
    }

    sinks.write(&DataTraceEvent::sentinel(Instant::now()));
    if let Err(err) = sinks.finalize().await {
        tracing::warn!("Failed to finalize sender sinks for {}: {}", config.destination, err);
    }
    tracing::debug!(
        "Sender to {} stopped ({:?}) after {} packets.",
        config.destination,
        outcome.exit,
        outcome.packets_sent
    );
    outcome
}
