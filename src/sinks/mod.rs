//! Per-worker consumers of send and receive events.
//!
//! Every worker owns one [`SinkSet`]: the binned accumulator that feeds the
//! statistics collector plus the optional raw trace file and console echo.
mod binned;
mod config;
mod writers;


pub use binned::BinnedAccumulator;
pub use config::{DEFAULT_BIN, SinkOptions};
pub use writers::{ConsoleWriter, RawTraceWriter, TraceRecord, setup_trace_logger};

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::SinkError;
use crate::metrics::{DataTraceEvent, SeriesKey, SeriesReport};

#[derive(Debug)]
pub enum TraceSink {
    Binned(BinnedAccumulator),
    Raw(RawTraceWriter),
    Console(ConsoleWriter),
}

impl TraceSink {
    pub fn write(&mut self, event: &DataTraceEvent) {
        match self {
            Self::Binned(sink) => sink.write(event),
            Self::Raw(sink) => sink.write(event),
            Self::Console(sink) => sink.write(event),
        }
    }

    /// Flushes and closes the sink. Consuming `self` makes a second call
    /// impossible.
    ///
    /// # Errors
    ///
    /// Returns an error when the raw trace file could not be written.
    pub async fn finalize(self) -> Result<(), SinkError> {
        match self {
            Self::Binned(sink) => {
                sink.finalize();
                Ok(())
            }
            Self::Raw(sink) => sink.finalize().await,
            Self::Console(sink) => {
                sink.finalize();
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
pub struct SinkSet {
    sinks: Vec<TraceSink>,
}

impl SinkSet {
    /// Builds the sinks selected by `options` for one worker.
    #[must_use]
    pub fn new(
        key: SeriesKey,
        flow_start: Instant,
        options: &SinkOptions,
        report_tx: mpsc::UnboundedSender<SeriesReport>,
    ) -> Self {
        let mut sinks = vec![TraceSink::Binned(BinnedAccumulator::new(
            key,
            flow_start,
            options.bin,
            report_tx,
        ))];
        if let Some(path) = options.trace_path(key) {
            sinks.push(TraceSink::Raw(RawTraceWriter::create(path, flow_start)));
        }
        if options.echo {
            sinks.push(TraceSink::Console(ConsoleWriter::new(key, flow_start)));
        }
        Self { sinks }
    }

    pub fn write(&mut self, event: &DataTraceEvent) {
        for sink in &mut self.sinks {
            sink.write(event);
        }
    }

    /// Finalizes every sink, reporting the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error when any sink failed to flush.
    pub async fn finalize(self) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in self.sinks {
            if let Err(err) = sink.finalize().await
                && first_error.is_none()
            {
                first_error = Some(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
