//! Traffic pattern models and the flow merger.
//!
//! Every pattern turns into a lazy, non-decreasing-in-time iterator of
//! [`Event`]s measured from the flow start. The merger combines the patterns
//! of one flow into a single chronological sequence.
mod cbr;
mod merge;
mod poisson;
mod trace;

#[cfg(test)]
mod tests;

use std::time::Duration;

pub use cbr::CbrEvents;
pub use merge::{MergeEvents, Merged, merge};
pub use poisson::PoissonEvents;
pub use trace::{CustomTrace, TraceEvents};

use crate::error::ConfigError;

/// One burst of `size` bytes due `offset` after the flow start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub offset: Duration,
    pub size: u64,
}

impl Event {
    #[must_use]
    pub const fn new(offset: Duration, size: u64) -> Self {
        Self { offset, size }
    }
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Fixed spacing, rate in bytes per second.
    Cbr { rate: f64 },
    /// Exponential gaps, rate in bytes per second.
    Poisson { rate: f64 },
    /// Literal rows replayed as-is.
    Trace { trace: CustomTrace },
}

/// Declarative description of one traffic source inside a flow.
#[derive(Debug, Clone)]
pub struct TrafficPattern {
    kind: PatternKind,
    size: u64,
    start: Duration,
    end: Option<Duration>,
    packet_size: Option<usize>,
}

impl TrafficPattern {
    /// Constant bit rate bursts of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the rate, size or window is invalid.
    pub fn cbr(
        rate: f64,
        size: u64,
        start: Duration,
        end: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        validate_rate(rate)?;
        Self::with_kind(PatternKind::Cbr { rate }, size, start, end)
    }

    /// Poisson-arrival bursts of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the rate, size or window is invalid.
    pub fn poisson(
        rate: f64,
        size: u64,
        start: Duration,
        end: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        validate_rate(rate)?;
        Self::with_kind(PatternKind::Poisson { rate }, size, start, end)
    }

    /// Replays a literal trace shifted by `start` and clipped at `end`.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is invalid.
    pub fn trace(
        trace: CustomTrace,
        start: Duration,
        end: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        let size = trace.max_size().max(1);
        Self::with_kind(PatternKind::Trace { trace }, size, start, end)
    }

    fn with_kind(
        kind: PatternKind,
        size: u64,
        start: Duration,
        end: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        if end.is_some_and(|end| end <= start) {
            return Err(ConfigError::InvalidWindow {
                start: start.as_secs_f64(),
                end: end.map(|end| end.as_secs_f64()),
            });
        }
        Ok(Self {
            kind,
            size,
            start,
            end,
            packet_size: None,
        })
    }

    #[must_use]
    pub const fn with_packet_size(mut self, packet_size: Option<usize>) -> Self {
        self.packet_size = packet_size;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> &PatternKind {
        &self.kind
    }

    #[must_use]
    pub const fn start(&self) -> Duration {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<Duration> {
        self.end
    }

    #[must_use]
    pub const fn packet_size(&self) -> Option<usize> {
        self.packet_size
    }

    /// Largest single event this pattern can produce, in bytes.
    #[must_use]
    pub const fn max_burst_size(&self) -> u64 {
        self.size
    }

    /// Builds the event iterator. `seed` only matters for Poisson patterns.
    #[must_use]
    pub fn events(&self, seed: Option<u64>) -> PatternEvents {
        match &self.kind {
            PatternKind::Cbr { rate } => {
                PatternEvents::Cbr(CbrEvents::new(*rate, self.size, self.start, self.end))
            }
            PatternKind::Poisson { rate } => PatternEvents::Poisson(PoissonEvents::new(
                *rate, self.size, self.start, self.end, seed,
            )),
            PatternKind::Trace { trace } => {
                PatternEvents::Trace(trace.events(self.start, self.end))
            }
        }
    }
}

fn validate_rate(rate: f64) -> Result<(), ConfigError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate { rate })
    }
}

/// Static dispatch over the three pattern iterators.
#[derive(Debug, Clone)]
pub enum PatternEvents {
    Cbr(CbrEvents),
    Poisson(PoissonEvents),
    Trace(TraceEvents),
}

impl Iterator for PatternEvents {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Cbr(events) => events.next(),
            Self::Poisson(events) => events.next(),
            Self::Trace(events) => events.next(),
        }
    }
}
