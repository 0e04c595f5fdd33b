use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::SinkError;
use crate::metrics::{AggregatedSeries, RateSummary, SeriesObserver, StatsMap, rate_points};

use super::RunReport;

const SUMMARY_HEADER: &str = "name,port,inputRate,inputCV,outputRate,outputCV\n";
const PLOT_HEADER: &str = "id,time,rate\n";

/// Console table: one line per port plus one per rejected flow.
#[must_use]
pub fn summary_lines(name: &str, report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        format!("Experiment: {}", name),
        format!(
            "{:>6}  {:>14}  {:>8}  {:>14}  {:>8}",
            "Port", "Input bit/s", "Input CV", "Output bit/s", "Output CV"
        ),
    ];
    for (port, stats) in &report.stats {
        let (input_rate, input_cv) = format_summary(stats.input);
        let (output_rate, output_cv) = format_summary(stats.output);
        lines.push(format!(
            "{:>6}  {:>14}  {:>8}  {:>14}  {:>8}",
            port, input_rate, input_cv, output_rate, output_cv
        ));
    }
    let sent: u64 = report.senders.iter().map(|sender| sender.packets_sent).sum();
    let received: u64 = report
        .listeners
        .iter()
        .map(|listener| listener.packets_received)
        .sum();
    lines.push(format!("Packets sent: {}, received: {}", sent, received));
    for error in &report.errors {
        lines.push(format!("Skipped {}", error));
    }
    lines
}

fn format_summary(summary: Option<RateSummary>) -> (String, String) {
    summary.map_or_else(
        || ("-".to_owned(), "-".to_owned()),
        |summary| (format!("{:.1}", summary.rate), format!("{:.4}", summary.cv)),
    )
}

fn csv_fields(summary: Option<RateSummary>) -> (String, String) {
    summary.map_or_else(
        || (String::new(), String::new()),
        |summary| (summary.rate.to_string(), summary.cv.to_string()),
    )
}

/// Appends one row per port to the summary CSV. The header is written only
/// when the file does not exist yet.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or written.
pub async fn append_summary(path: &Path, name: &str, stats: &StatsMap) -> Result<(), SinkError> {
    let write_error = |source| SinkError::WriteSummary {
        path: path.to_path_buf(),
        source,
    };
    let is_new = !tokio::fs::try_exists(path).await.map_err(write_error)?;
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(write_error)?;
    let mut writer = BufWriter::new(file);

    let mut output = String::new();
    if is_new {
        output.push_str(SUMMARY_HEADER);
    }
    for (port, port_stats) in stats {
        let (input_rate, input_cv) = csv_fields(port_stats.input);
        let (output_rate, output_cv) = csv_fields(port_stats.output);
        if writeln!(
            output,
            "{},{},{},{},{},{}",
            name, port, input_rate, input_cv, output_rate, output_cv
        )
        .is_err()
        {
            return Err(write_error(std::io::Error::other("summary formatting failed")));
        }
    }

    writer
        .write_all(output.as_bytes())
        .await
        .map_err(write_error)?;
    writer.flush().await.map_err(write_error)?;
    Ok(())
}

/// Writes `<dir>/<port>.<in|out>` with one `id,time,rate` row per bin.
#[derive(Debug)]
pub struct PlotWriter {
    dir: PathBuf,
}

impl PlotWriter {
    /// Creates the plot directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when `dir` exists but is not a directory or cannot be
    /// created.
    pub fn create(dir: PathBuf) -> Result<Self, SinkError> {
        if dir.exists() && !dir.is_dir() {
            return Err(SinkError::WritePlot {
                source: std::io::Error::other("plotting path is not a directory"),
                path: dir,
            });
        }
        std::fs::create_dir_all(&dir).map_err(|source| SinkError::WritePlot {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path_for(&self, series: &AggregatedSeries) -> PathBuf {
        self.dir
            .join(format!("{}.{}", series.key.port, series.key.direction))
    }
}

impl SeriesObserver for PlotWriter {
    fn observe(&mut self, series: &AggregatedSeries) -> Result<(), SinkError> {
        let path = self.path_for(series);
        let mut output = String::from(PLOT_HEADER);
        for point in rate_points(&series.sizes, series.interval) {
            if writeln!(output, "{},{},{}", point.index, point.time, point.rate).is_err() {
                break;
            }
        }
        std::fs::write(&path, output).map_err(|source| SinkError::WritePlot { path, source })
    }
}
