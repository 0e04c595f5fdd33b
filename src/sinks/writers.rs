use std::path::PathBuf;
use std::time::Duration;

use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
    sync::mpsc,
    task::JoinHandle,
};
use tokio::time::Instant;

use crate::error::SinkError;
use crate::metrics::{DataTraceEvent, SeriesKey};

const TRACE_BUFFER_SIZE: usize = 64 * 1024;
const TRACE_HEADER: &[u8] = b"tag,time,bits\n";

/// One raw trace row relative to the flow start.
#[derive(Debug, Clone, Copy)]
pub struct TraceRecord {
    pub tag: i64,
    pub elapsed: Duration,
    pub bits: u64,
}

impl TraceRecord {
    fn from_event(event: &DataTraceEvent, flow_start: Instant) -> Self {
        Self {
            tag: event.tag,
            elapsed: event.time.saturating_duration_since(flow_start),
            bits: event.size.saturating_mul(8),
        }
    }
}

/// Spawns the task that writes trace rows as CSV until the channel closes.
/// Resolves to the number of rows written.
#[must_use]
pub fn setup_trace_logger(
    path: PathBuf,
    mut record_rx: mpsc::UnboundedReceiver<TraceRecord>,
) -> JoinHandle<Result<u64, SinkError>> {
    tokio::spawn(async move {
        let write_error = |source| SinkError::WriteTrace {
            path: path.clone(),
            source,
        };
        let file = File::create(&path)
            .await
            .map_err(|source| SinkError::CreateTrace {
                path: path.clone(),
                source,
            })?;
        let mut writer = BufWriter::with_capacity(TRACE_BUFFER_SIZE, file);
        writer.write_all(TRACE_HEADER).await.map_err(write_error)?;

        let mut written: u64 = 0;
        while let Some(record) = record_rx.recv().await {
            let line = format!(
                "{},{:.9},{}\n",
                record.tag,
                record.elapsed.as_secs_f64(),
                record.bits
            );
            writer
                .write_all(line.as_bytes())
                .await
                .map_err(write_error)?;
            written = written.saturating_add(1);
        }

        writer.flush().await.map_err(write_error)?;
        writer.into_inner().sync_all().await.map_err(write_error)?;
        Ok(written)
    })
}

/// Forwards events to a [`setup_trace_logger`] task.
#[derive(Debug)]
pub struct RawTraceWriter {
    flow_start: Instant,
    record_tx: mpsc::UnboundedSender<TraceRecord>,
    handle: JoinHandle<Result<u64, SinkError>>,
}

impl RawTraceWriter {
    #[must_use]
    pub fn create(path: PathBuf, flow_start: Instant) -> Self {
        let (record_tx, record_rx) = mpsc::unbounded_channel();
        let handle = setup_trace_logger(path, record_rx);
        Self {
            flow_start,
            record_tx,
            handle,
        }
    }

    pub fn write(&mut self, event: &DataTraceEvent) {
        // A closed channel means the logger already failed; finalize reports it.
        if self
            .record_tx
            .send(TraceRecord::from_event(event, self.flow_start))
            .is_err()
        {
            tracing::trace!("Trace logger closed; dropping record.");
        }
    }

    /// Closes the channel and waits for the file to be synced.
    ///
    /// # Errors
    ///
    /// Returns an error when the trace file could not be created or written.
    pub async fn finalize(self) -> Result<(), SinkError> {
        let Self {
            record_tx, handle, ..
        } = self;
        drop(record_tx);
        match handle.await {
            Ok(result) => result.map(|written| {
                tracing::debug!("Trace logger wrote {} rows.", written);
            }),
            Err(err) => {
                tracing::warn!("Trace logger task failed: {}", err);
                Ok(())
            }
        }
    }
}

/// Echoes events to stdout as they happen.
#[derive(Debug)]
pub struct ConsoleWriter {
    key: SeriesKey,
    flow_start: Instant,
}

impl ConsoleWriter {
    #[must_use]
    pub const fn new(key: SeriesKey, flow_start: Instant) -> Self {
        Self { key, flow_start }
    }

    pub fn write(&mut self, event: &DataTraceEvent) {
        println!(
            "{}.{} {} {:.6} {}",
            self.key.port,
            self.key.direction,
            event.tag,
            event.time.saturating_duration_since(self.flow_start).as_secs_f64(),
            event.size
        );
    }

    pub fn finalize(self) {}
}
