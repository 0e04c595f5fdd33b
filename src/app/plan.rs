use std::collections::BTreeMap;
use std::net::{SocketAddr, ToSocketAddrs};

use crate::domain::{Command, Flow, FlowError, RunMode};
use crate::error::ConfigError;
use crate::pattern::TrafficPattern;

#[derive(Debug, Clone)]
pub struct SenderPlan {
    pub host: String,
    pub port: u16,
    pub destination: SocketAddr,
    pub packet_size: usize,
    /// Sum of every pattern's largest burst.
    pub backlog: u64,
    pub patterns: Vec<TrafficPattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPlan {
    pub port: u16,
    /// Largest packet size of any pattern targeting the port.
    pub packet_size: usize,
    pub backlog: u64,
}

#[derive(Debug, Default)]
pub struct RunPlan {
    pub senders: Vec<SenderPlan>,
    pub listeners: Vec<ListenerPlan>,
    pub errors: Vec<FlowError>,
}

impl RunPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty() && self.listeners.is_empty()
    }
}

/// Expands `command` into one sender per destination port and one listener
/// per distinct local port.
#[must_use]
pub fn plan_run(command: &Command, mode: RunMode, default_packet_size: usize) -> RunPlan {
    let mut plan = RunPlan::default();

    if mode.sends() {
        for flow in command.flows().filter(|flow| !flow.patterns.is_empty()) {
            match plan_sender(flow, default_packet_size) {
                Ok(sender) => plan.senders.push(sender),
                Err(error) => plan.errors.push(FlowError::new(flow.host, flow.port, error)),
            }
        }
    }

    if mode.receives() {
        let mut listeners: BTreeMap<u16, ListenerPlan> = BTreeMap::new();
        for flow in command.flows() {
            let entry = listeners.entry(flow.port).or_insert(ListenerPlan {
                port: flow.port,
                packet_size: 0,
                backlog: 0,
            });
            for pattern in flow.patterns {
                entry.packet_size = entry
                    .packet_size
                    .max(pattern.packet_size().unwrap_or(default_packet_size));
                entry.backlog = entry.backlog.saturating_add(pattern.max_burst_size());
            }
            if entry.packet_size == 0 {
                entry.packet_size = default_packet_size;
            }
        }
        plan.listeners = listeners.into_values().collect();
    }

    plan
}

fn plan_sender(flow: Flow<'_>, default_packet_size: usize) -> Result<SenderPlan, ConfigError> {
    let mut sizes = flow
        .patterns
        .iter()
        .map(|pattern| pattern.packet_size().unwrap_or(default_packet_size));
    let packet_size = sizes.next().unwrap_or(default_packet_size);
    if let Some(found) = sizes.find(|size| *size != packet_size) {
        return Err(ConfigError::PacketSizeMismatch {
            host: flow.host.to_owned(),
            port: flow.port,
            expected: packet_size,
            found,
        });
    }

    let backlog = flow
        .patterns
        .iter()
        .map(TrafficPattern::max_burst_size)
        .fold(0_u64, u64::saturating_add);

    Ok(SenderPlan {
        host: flow.host.to_owned(),
        port: flow.port,
        destination: resolve(flow.host, flow.port)?,
        packet_size,
        backlog,
        patterns: flow.patterns.to_vec(),
    })
}

/// First address `host:port` resolves to.
///
/// # Errors
///
/// Returns an error when resolution fails or yields nothing.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ConfigError::ResolveHost {
            host: host.to_owned(),
            port,
            source,
        })?;
    addrs.next().ok_or_else(|| ConfigError::NoAddressesResolved {
        host: host.to_owned(),
        port,
    })
}
