use std::path::Path;

use plotters::prelude::*;

use crate::error::AppResult;
use crate::metrics::RatePoint;

/// Axis extents shared by the input and output lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub max_time: f64,
    pub max_rate: f64,
}

#[must_use]
pub fn chart_bounds(input: &[RatePoint], output: &[RatePoint]) -> ChartBounds {
    let points = input.iter().chain(output);
    let max_time = points
        .clone()
        .map(|point| point.time)
        .fold(0.0_f64, f64::max);
    let max_rate = points.map(|point| point.rate).fold(0.0_f64, f64::max);
    ChartBounds {
        max_time: if max_time > 0.0 { max_time } else { 1.0 },
        max_rate: if max_rate > 0.0 { max_rate * 1.1 } else { 1.0 },
    }
}

/// Line chart of sent (input) and received (output) bits per second.
///
/// # Errors
///
/// Returns an error when the chart cannot be drawn or written.
pub fn plot_port_rates(
    port: u16,
    input: &[RatePoint],
    output: &[RatePoint],
    path: &Path,
) -> AppResult<()> {
    let bounds = chart_bounds(input, output);

    let root = BitMapBackend::new(path, (1600, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Port {} Rate", port),
            ("sans-serif", 30).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..bounds.max_time, 0.0..bounds.max_rate)?;

    chart
        .configure_mesh()
        .x_desc("Elapsed Time (seconds)")
        .y_desc("Rate (bits/s)")
        .draw()?;

    if !input.is_empty() {
        chart
            .draw_series(LineSeries::new(
                input.iter().map(|point| (point.time, point.rate)),
                &BLUE,
            ))?
            .label("Sent")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    }
    if !output.is_empty() {
        chart
            .draw_series(LineSeries::new(
                output.iter().map(|point| (point.time, point.rate)),
                &RED,
            ))?
            .label("Received")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
