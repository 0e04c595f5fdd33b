use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// One packet observed at the moment it left or arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataTraceEvent {
    pub tag: i64,
    pub time: Instant,
    /// On-wire size in bytes, simulated header included.
    pub size: u64,
}

impl DataTraceEvent {
    pub const SENTINEL_TAG: i64 = -1;

    #[must_use]
    pub const fn new(tag: i64, time: Instant, size: u64) -> Self {
        Self { tag, time, size }
    }

    /// End-of-stream marker written once by every worker.
    #[must_use]
    pub const fn sentinel(time: Instant) -> Self {
        Self::new(Self::SENTINEL_TAG, time, 0)
    }

    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.tag == Self::SENTINEL_TAG
    }
}

/// `Input` is traffic this process sent, `Output` traffic it received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub port: u16,
    pub direction: Direction,
}

impl SeriesKey {
    #[must_use]
    pub const fn new(port: u16, direction: Direction) -> Self {
        Self { port, direction }
    }
}

/// A finalized binned series sent by one worker.
#[derive(Clone, Debug)]
pub struct SeriesReport {
    pub key: SeriesKey,
    pub interval: Duration,
    pub sizes: Vec<u64>,
}

/// All reports for one key summed bin by bin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedSeries {
    pub key: SeriesKey,
    pub interval: Duration,
    pub sizes: Vec<u64>,
    pub flows: usize,
}

impl AggregatedSeries {
    #[must_use]
    pub const fn new(key: SeriesKey, interval: Duration) -> Self {
        Self {
            key,
            interval,
            sizes: Vec::new(),
            flows: 0,
        }
    }

    pub fn absorb(&mut self, sizes: &[u64]) {
        if self.sizes.len() < sizes.len() {
            self.sizes.resize(sizes.len(), 0);
        }
        for (total, size) in self.sizes.iter_mut().zip(sizes) {
            *total = total.saturating_add(*size);
        }
        self.flows = self.flows.saturating_add(1);
    }
}

/// Mean rate in bits per second and its coefficient of variation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateSummary {
    pub rate: f64,
    pub cv: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortStats {
    pub input: Option<RateSummary>,
    pub output: Option<RateSummary>,
}

impl PortStats {
    pub fn set(&mut self, direction: Direction, summary: RateSummary) {
        match direction {
            Direction::Input => self.input = Some(summary),
            Direction::Output => self.output = Some(summary),
        }
    }

    #[must_use]
    pub const fn get(&self, direction: Direction) -> Option<RateSummary> {
        match direction {
            Direction::Input => self.input,
            Direction::Output => self.output,
        }
    }
}

pub type StatsMap = BTreeMap<u16, PortStats>;
