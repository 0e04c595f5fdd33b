use super::chart_bounds;
use crate::metrics::RatePoint;

fn point(index: usize, time: f64, rate: f64) -> RatePoint {
    RatePoint { index, time, rate }
}

#[test]
fn chart_bounds_cover_both_series() -> Result<(), String> {
    let input = [point(0, 0.0, 8000.0), point(1, 0.2, 4000.0)];
    let output = [point(0, 0.0, 1000.0), point(1, 0.2, 2000.0), point(2, 0.4, 10_000.0)];
    let bounds = chart_bounds(&input, &output);
    if (bounds.max_time - 0.4).abs() > 1e-9 {
        return Err(format!("Unexpected max time: {}", bounds.max_time));
    }
    if (bounds.max_rate - 11_000.0).abs() > 1e-6 {
        return Err(format!("Unexpected max rate: {}", bounds.max_rate));
    }
    Ok(())
}

#[test]
fn chart_bounds_never_collapse() -> Result<(), String> {
    let bounds = chart_bounds(&[], &[point(0, 0.0, 0.0)]);
    if (bounds.max_time - 1.0).abs() > 1e-9 || (bounds.max_rate - 1.0).abs() > 1e-9 {
        return Err(format!("Degenerate bounds: {:?}", bounds));
    }
    Ok(())
}
