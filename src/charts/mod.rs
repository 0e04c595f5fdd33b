//! PNG rate charts rendered with plotters.
mod rate;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info};

use crate::app::RunReport;
use crate::error::AppResult;
use crate::metrics::Direction;

pub use rate::{ChartBounds, chart_bounds, plot_port_rates};

/// Renders `<dir>/port_<port>.png` for every port in the report.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or a chart fails
/// to render.
pub async fn plot_rate_charts(report: &RunReport, dir: &Path) -> AppResult<Vec<PathBuf>> {
    if let Err(err) = fs::create_dir_all(dir).await {
        error!("Failed to create chart directory '{}': {}", dir.display(), err);
        return Err(err.into());
    }

    let mut written = Vec::with_capacity(report.stats.len());
    for port in report.stats.keys() {
        let input = report.rate_points(*port, Direction::Input);
        let output = report.rate_points(*port, Direction::Output);
        if input.is_empty() && output.is_empty() {
            continue;
        }
        let path = dir.join(format!("port_{}.png", port));
        info!("Plotting rates for port {}...", port);
        plot_port_rates(*port, &input, &output, &path)?;
        written.push(path);
    }
    Ok(written)
}
