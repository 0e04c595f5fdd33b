//! UDP workers: paced sender, bounded-timeout listener and forwarder.
mod forward;
mod listener;
mod sender;
mod wire;


use std::net::SocketAddr;

use tokio::net::UdpSocket;

pub use forward::{
    DEFAULT_FORWARD_PACKET_SIZE, DEFAULT_FORWARD_READ_TIMEOUT, ForwardConfig, ForwardOutcome,
    run_forwarder, spawn_forwarder,
};
pub use listener::{
    DEFAULT_READ_TIMEOUT, ListenerConfig, ListenerOutcome, run_listener, spawn_listener,
};
pub use sender::{SenderConfig, SenderOutcome, run_sender, spawn_sender};
pub use wire::{
    Burst, HEADER_OVERHEAD, MIN_WIRE_PACKET, TAG_SIZE, TagArena, WireLayout, decode_tag,
};

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The event sequence ran out.
    Exhausted,
    /// The flow end was reached.
    Deadline,
    /// Shutdown was broadcast.
    Cancelled,
}

/// Binds an ephemeral local socket of the same family as `destination`.
///
/// # Errors
///
/// Returns an error when the socket cannot be bound.
pub async fn bind_for(destination: SocketAddr) -> std::io::Result<UdpSocket> {
    let bind_addr = if destination.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    UdpSocket::bind(bind_addr).await
}

/// Binds `port` on every IPv4 interface.
///
/// # Errors
///
/// Returns an error when the port is unavailable.
pub async fn bind_port(port: u16) -> std::io::Result<UdpSocket> {
    UdpSocket::bind(("0.0.0.0", port)).await
}
