use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pattern::TrafficPattern;

/// Which halves of a command a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Send,
    Receive,
    SendReceive,
}

impl RunMode {
    #[must_use]
    pub const fn sends(self) -> bool {
        matches!(self, Self::Send | Self::SendReceive)
    }

    #[must_use]
    pub const fn receives(self) -> bool {
        matches!(self, Self::Receive | Self::SendReceive)
    }
}

/// A flow that could not start. The run continues without it.
#[derive(Debug)]
pub struct FlowError {
    pub flow: String,
    pub error: ConfigError,
}

impl FlowError {
    #[must_use]
    pub fn new(host: &str, port: impl fmt::Display, error: ConfigError) -> Self {
        Self {
            flow: format!("{}:{}", host, port),
            error,
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.flow, self.error)
    }
}

/// All patterns sent to one destination port.
#[derive(Debug, Clone, Copy)]
pub struct Flow<'cmd> {
    pub host: &'cmd str,
    pub port: u16,
    pub patterns: &'cmd [TrafficPattern],
}

/// Destination host -> port -> patterns, immutable once a run starts.
#[derive(Debug, Clone, Default)]
pub struct Command {
    flows: BTreeMap<String, BTreeMap<u16, Vec<TrafficPattern>>>,
}

impl Command {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds patterns to the `(host, port)` flow.
    pub fn insert(&mut self, host: &str, port: u16, patterns: Vec<TrafficPattern>) {
        self.flows
            .entry(host.to_owned())
            .or_default()
            .entry(port)
            .or_default()
            .extend(patterns);
    }

    #[must_use]
    pub fn with_flow(mut self, host: &str, port: u16, patterns: Vec<TrafficPattern>) -> Self {
        self.insert(host, port, patterns);
        self
    }

    pub fn flows(&self) -> impl Iterator<Item = Flow<'_>> {
        self.flows.iter().flat_map(|(host, ports)| {
            ports.iter().map(move |(port, patterns)| Flow {
                host: host.as_str(),
                port: *port,
                patterns: patterns.as_slice(),
            })
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.values().all(BTreeMap::is_empty)
    }

    /// Every destination port referenced by the command.
    #[must_use]
    pub fn ports(&self) -> BTreeSet<u16> {
        self.flows().map(|flow| flow.port).collect()
    }

    /// Latest pattern end, ignoring unbounded patterns.
    #[must_use]
    pub fn max_end(&self) -> Option<Duration> {
        self.flows()
            .flat_map(|flow| flow.patterns.iter())
            .filter_map(TrafficPattern::end)
            .max()
    }
}
