use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{AggregatedSeries, SeriesKey, SeriesReport, StatsMap, rate_summary};
use crate::error::SinkError;

/// Receives every aggregated series once all flows have finalized.
pub trait SeriesObserver: Send {
    /// Handle one aggregated series.
    ///
    /// # Errors
    ///
    /// Returns an error when the observer cannot persist the series.
    fn observe(&mut self, series: &AggregatedSeries) -> Result<(), SinkError>;
}

#[derive(Debug, Default)]
pub struct CollectedStats {
    pub stats: StatsMap,
    pub series: BTreeMap<SeriesKey, AggregatedSeries>,
    /// Number of reports received, one per finalized sink.
    pub reports: usize,
}

impl CollectedStats {
    fn absorb(&mut self, report: &SeriesReport) {
        let entry = self
            .series
            .entry(report.key)
            .or_insert_with(|| AggregatedSeries::new(report.key, report.interval));
        if entry.interval != report.interval {
            tracing::warn!(
                "Series {}:{} reported with bin {:?}, expected {:?}; summing anyway.",
                report.key.port,
                report.key.direction,
                report.interval,
                entry.interval
            );
        }
        entry.absorb(&report.sizes);
        self.reports = self.reports.saturating_add(1);
    }

    fn finish(&mut self) {
        for series in self.series.values() {
            let summary = rate_summary(&series.sizes, series.interval);
            self.stats
                .entry(series.key.port)
                .or_default()
                .set(series.key.direction, summary);
        }
    }
}

/// Spawns the task that owns the statistics map.
///
/// The task runs until every sender clone is dropped, then derives the
/// statistics and hands each aggregated series to the observers on the
/// blocking pool.
#[must_use]
pub fn setup_stats_collector(
    mut observers: Vec<Box<dyn SeriesObserver>>,
) -> (mpsc::UnboundedSender<SeriesReport>, JoinHandle<CollectedStats>) {
    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<SeriesReport>();

    let handle = tokio::spawn(async move {
        let mut collected = CollectedStats::default();
        while let Some(report) = report_rx.recv().await {
            tracing::debug!(
                "Collected {} bins for {}:{}",
                report.sizes.len(),
                report.key.port,
                report.key.direction
            );
            collected.absorb(&report);
        }
        collected.finish();

        if !observers.is_empty() {
            // Observers do blocking file IO.
            let series = collected.series.clone();
            let notified = tokio::task::spawn_blocking(move || {
                for aggregated in series.values() {
                    for observer in &mut observers {
                        if let Err(err) = observer.observe(aggregated) {
                            tracing::warn!("Series observer failed: {}", err);
                        }
                    }
                }
            })
            .await;
            if let Err(err) = notified {
                tracing::warn!("Series observers did not finish: {}", err);
            }
        }
        collected
    });

    (report_tx, handle)
}
