use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::metrics::{DataTraceEvent, SeriesKey, SeriesReport};

/// Sums on-wire bytes into fixed-width bins counted from the flow start.
#[derive(Debug)]
pub struct BinnedAccumulator {
    key: SeriesKey,
    start: Instant,
    interval: Duration,
    sizes: Vec<u64>,
    report_tx: mpsc::UnboundedSender<SeriesReport>,
}

impl BinnedAccumulator {
    #[must_use]
    pub fn new(
        key: SeriesKey,
        start: Instant,
        interval: Duration,
        report_tx: mpsc::UnboundedSender<SeriesReport>,
    ) -> Self {
        Self {
            key,
            start,
            interval: interval.max(Duration::from_nanos(1)),
            sizes: Vec::new(),
            report_tx,
        }
    }

    /// Events before the start land in bin 0.
    #[must_use]
    pub fn bin_index(&self, time: Instant) -> usize {
        let elapsed = time.saturating_duration_since(self.start).as_nanos();
        let bin = elapsed.checked_div(self.interval.as_nanos()).unwrap_or(0);
        usize::try_from(bin).unwrap_or(usize::MAX)
    }

    pub fn write(&mut self, event: &DataTraceEvent) {
        let bin = self.bin_index(event.time);
        if self.sizes.len() <= bin {
            self.sizes.resize(bin.saturating_add(1), 0);
        }
        if let Some(total) = self.sizes.get_mut(bin) {
            *total = total.saturating_add(event.size);
        }
    }

    #[must_use]
    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    /// Hands the series to the collector.
    pub fn finalize(self) {
        let report = SeriesReport {
            key: self.key,
            interval: self.interval,
            sizes: self.sizes,
        };
        if self.report_tx.send(report).is_err() {
            tracing::warn!(
                "Statistics collector closed before {}:{} reported.",
                self.key.port,
                self.key.direction
            );
        }
    }
}
