use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::Instant;

use crate::domain::{Command, FlowError, RunMode};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::metrics::{
    AggregatedSeries, Direction, RatePoint, SeriesKey, SeriesObserver, StatsMap, rate_points,
    setup_stats_collector,
};
use crate::pattern::merge;
use crate::shutdown::ShutdownSender;
use crate::sinks::{SinkOptions, SinkSet};
use crate::transport::{
    DEFAULT_READ_TIMEOUT, ListenerConfig, ListenerOutcome, SenderConfig, SenderOutcome, bind_for,
    bind_port, spawn_listener, spawn_sender,
};

use super::plan::plan_run;

pub const DEFAULT_PACKET_SIZE: usize = 1000;
pub const DEFAULT_START_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: RunMode,
    pub duration: Duration,
    pub packet_size: usize,
    /// Gap between setup and the shared flow start.
    pub start_delay: Duration,
    pub read_timeout: Duration,
    pub sinks: SinkOptions,
    /// Makes Poisson arrivals reproducible.
    pub seed: Option<u64>,
}

impl RunSettings {
    #[must_use]
    pub fn new(mode: RunMode, duration: Duration) -> Self {
        Self {
            mode,
            duration,
            packet_size: DEFAULT_PACKET_SIZE,
            start_delay: DEFAULT_START_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
            sinks: SinkOptions::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub stats: StatsMap,
    pub series: BTreeMap<SeriesKey, AggregatedSeries>,
    pub errors: Vec<FlowError>,
    pub senders: Vec<SenderOutcome>,
    pub listeners: Vec<ListenerOutcome>,
}

impl RunReport {
    /// Per-bin rates of the aggregated series for `port` and `direction`.
    #[must_use]
    pub fn rate_points(&self, port: u16, direction: Direction) -> Vec<RatePoint> {
        self.series
            .get(&SeriesKey::new(port, direction))
            .map(|series| rate_points(&series.sizes, series.interval))
            .unwrap_or_default()
    }
}

/// Runs every flow of `command` concurrently and waits for all of them.
///
/// Flows that fail to plan or bind are reported in [`RunReport::errors`]
/// while the rest run. Observers see every aggregated series once all
/// workers have finalized.
///
/// # Errors
///
/// Returns an error when the command holds no flows, when the start delay
/// or duration overflows the clock, or when the statistics collector fails.
pub async fn run(
    command: &Command,
    settings: &RunSettings,
    shutdown_tx: &ShutdownSender,
    observers: Vec<Box<dyn SeriesObserver>>,
) -> AppResult<RunReport> {
    if command.is_empty() {
        return Err(AppError::validation(ValidationError::EmptyCommand));
    }
    if settings.duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }

    let plan = plan_run(command, settings.mode, settings.packet_size);
    let mut errors = plan.errors;
    for error in &errors {
        tracing::warn!("Flow rejected: {}", error);
    }

    let flow_start = Instant::now()
        .checked_add(settings.start_delay)
        .ok_or(ValidationError::DurationOverflow)?;
    let flow_end = flow_start
        .checked_add(settings.duration)
        .ok_or(ValidationError::DurationOverflow)?;
    let (report_tx, collector) = setup_stats_collector(observers);

    let mut listener_handles = Vec::with_capacity(plan.listeners.len());
    for listener in plan.listeners {
        let socket = match bind_port(listener.port).await {
            Ok(socket) => socket,
            Err(source) => {
                let error = FlowError {
                    flow: format!("listen:{}", listener.port),
                    error: ConfigError::Bind {
                        addr: format!("0.0.0.0:{}", listener.port),
                        source,
                    },
                };
                tracing::warn!("Flow rejected: {}", error);
                errors.push(error);
                continue;
            }
        };
        let key = SeriesKey::new(listener.port, Direction::Output);
        listener_handles.push(spawn_listener(
            socket,
            ListenerConfig {
                port: listener.port,
                packet_size: listener.packet_size,
                flow_end,
                read_timeout: settings.read_timeout,
            },
            SinkSet::new(key, flow_start, &settings.sinks, report_tx.clone()),
            shutdown_tx.subscribe(),
        ));
    }

    let mut pattern_index: u64 = 0;
    let mut sender_handles = Vec::with_capacity(plan.senders.len());
    for sender in plan.senders {
        let socket = match bind_for(sender.destination).await {
            Ok(socket) => socket,
            Err(source) => {
                let error = FlowError {
                    flow: format!("{}:{}", sender.host, sender.port),
                    error: ConfigError::Bind {
                        addr: "ephemeral".to_owned(),
                        source,
                    },
                };
                tracing::warn!("Flow rejected: {}", error);
                errors.push(error);
                continue;
            }
        };
        let inputs: Vec<_> = sender
            .patterns
            .iter()
            .map(|pattern| {
                let seed = settings.seed.map(|seed| seed.wrapping_add(pattern_index));
                pattern_index = pattern_index.wrapping_add(1);
                pattern.events(seed)
            })
            .collect();
        let key = SeriesKey::new(sender.port, Direction::Input);
        tracing::info!(
            "Sending {} pattern(s) to {} ({}:{}), packet size {}.",
            sender.patterns.len(),
            sender.destination,
            sender.host,
            sender.port,
            sender.packet_size
        );
        sender_handles.push(spawn_sender(
            socket,
            merge(inputs, Some(settings.duration)),
            SenderConfig {
                destination: sender.destination,
                flow_start,
                flow_end,
                packet_size: sender.packet_size,
                backlog: sender.backlog,
            },
            SinkSet::new(key, flow_start, &settings.sinks, report_tx.clone()),
            shutdown_tx.subscribe(),
        ));
    }
    drop(report_tx);

    let senders: Vec<SenderOutcome> = join_all(sender_handles)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::error!("Sender task failed: {}", err);
                None
            }
        })
        .collect();
    let listeners: Vec<ListenerOutcome> = join_all(listener_handles)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::error!("Listener task failed: {}", err);
                None
            }
        })
        .collect();

    let collected = collector.await?;
    Ok(RunReport {
        stats: collected.stats,
        series: collected.series,
        errors,
        senders,
        listeners,
    })
}
