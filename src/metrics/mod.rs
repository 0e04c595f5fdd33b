//! Trace events, rate statistics and the statistics collector.
mod collector;
mod stats;
mod types;


pub use collector::{CollectedStats, SeriesObserver, setup_stats_collector};
pub use stats::{RatePoint, rate_points, rate_summary};
pub use types::{
    AggregatedSeries, DataTraceEvent, Direction, PortStats, RateSummary, SeriesKey, SeriesReport,
    StatsMap,
};
