use std::time::Duration;

use super::Event;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Evenly spaced bursts. Offsets are `start + k * interval`, computed by
/// multiplication so rounding never accumulates.
#[derive(Debug, Clone)]
pub struct CbrEvents {
    start_ns: u128,
    interval_ns: u64,
    end: Option<Duration>,
    size: u64,
    index: u64,
}

impl CbrEvents {
    #[must_use]
    pub fn new(rate: f64, size: u64, start: Duration, end: Option<Duration>) -> Self {
        Self {
            start_ns: start.as_nanos(),
            interval_ns: interval_nanos(rate, size),
            end,
            size,
            index: 0,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval_ns)
    }
}

/// `size / rate` seconds rounded to whole nanoseconds, never below 1 ns.
#[must_use]
pub(super) fn interval_nanos(rate: f64, size: u64) -> u64 {
    let nanos = ((size as f64) / rate * NANOS_PER_SEC).round() as u64;
    nanos.max(1)
}

impl Iterator for CbrEvents {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        let step = u128::from(self.index).checked_mul(u128::from(self.interval_ns))?;
        let offset_ns = self.start_ns.checked_add(step)?;
        let offset = Duration::from_nanos(u64::try_from(offset_ns).ok()?);
        if self.end.is_some_and(|end| offset >= end) {
            return None;
        }
        self.index = self.index.saturating_add(1);
        Some(Event::new(offset, self.size))
    }
}
