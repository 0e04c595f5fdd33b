use std::time::Duration;

use super::{CbrEvents, CustomTrace, Event, Merged, PoissonEvents, TrafficPattern, merge};
use crate::error::TraceError;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn cbr_spacing_and_count() -> Result<(), String> {
    let events: Vec<Event> = CbrEvents::new(800.0, 100, Duration::ZERO, Some(ms(1000))).collect();
    if events.len() != 8 {
        return Err(format!("Expected 8 events, got {}", events.len()));
    }
    for (index, event) in events.iter().enumerate() {
        let expected = ms(125 * index as u64);
        if event.offset != expected || event.size != 100 {
            return Err(format!("Unexpected event {}: {:?}", index, event));
        }
    }
    Ok(())
}

#[test]
fn cbr_count_rounds_up_partial_interval() -> Result<(), String> {
    // 300ms interval inside a 1s window: 0, 300, 600, 900.
    let count = CbrEvents::new(1000.0, 300, Duration::ZERO, Some(ms(1000))).count();
    if count != 4 {
        return Err(format!("Expected 4 events, got {}", count));
    }
    Ok(())
}

#[test]
fn cbr_honors_start_offset() -> Result<(), String> {
    let first = CbrEvents::new(1000.0, 100, ms(250), None)
        .next()
        .ok_or_else(|| "Expected an event".to_owned())?;
    if first.offset != ms(250) {
        return Err(format!("Unexpected first offset: {:?}", first.offset));
    }
    Ok(())
}

#[test]
fn cbr_without_end_keeps_producing() -> Result<(), String> {
    let events = CbrEvents::new(1_000_000.0, 1, Duration::ZERO, None);
    if events.take(10_000).count() != 10_000 {
        return Err("Unbounded CBR stopped early".to_owned());
    }
    Ok(())
}

#[test]
fn poisson_gaps_are_non_negative_until_end() -> Result<(), String> {
    let end = ms(5000);
    let events: Vec<Event> =
        PoissonEvents::new(10_000.0, 100, ms(100), Some(end), Some(7)).collect();
    let first = events
        .first()
        .ok_or_else(|| "Expected Poisson events".to_owned())?;
    if first.offset != ms(100) {
        return Err(format!("Poisson must start at start, got {:?}", first.offset));
    }
    for pair in events.windows(2) {
        if let [previous, next] = pair
            && next.offset < previous.offset
        {
            return Err(format!("Offsets went backwards: {:?}", pair));
        }
    }
    if events.iter().any(|event| event.offset >= end) {
        return Err("Poisson event at or beyond end".to_owned());
    }
    // lambda = 100 events/s over 4.9s.
    if events.len() < 300 || events.len() > 700 {
        return Err(format!("Implausible Poisson count: {}", events.len()));
    }
    Ok(())
}

#[test]
fn poisson_same_seed_replays() -> Result<(), String> {
    let first: Vec<Event> = PoissonEvents::new(5000.0, 50, Duration::ZERO, Some(ms(2000)), Some(42))
        .collect();
    let second: Vec<Event> =
        PoissonEvents::new(5000.0, 50, Duration::ZERO, Some(ms(2000)), Some(42)).collect();
    if first != second {
        return Err("Seeded Poisson sequences differ".to_owned());
    }
    Ok(())
}

#[test]
fn trace_parses_whitespace_and_commas() -> Result<(), String> {
    let trace = CustomTrace::parse("# tag time size\n0 0.0 100\n1,0.5,200\n\n2\t1.25  300 # late\n")
        .map_err(|err| err.to_string())?;
    let events: Vec<Event> = trace.events(ms(1000), None).collect();
    let expected = vec![
        Event::new(ms(1000), 100),
        Event::new(ms(1500), 200),
        Event::new(ms(2250), 300),
    ];
    if events != expected {
        return Err(format!("Unexpected trace events: {:?}", events));
    }
    if trace.max_size() != 300 {
        return Err(format!("Unexpected max size: {}", trace.max_size()));
    }
    Ok(())
}

#[test]
fn trace_clips_at_end() -> Result<(), String> {
    let trace = CustomTrace::parse("0 0 10\n1 1 10\n2 2 10\n").map_err(|err| err.to_string())?;
    let count = trace.events(Duration::ZERO, Some(ms(2000))).count();
    if count != 2 {
        return Err(format!("Expected 2 events, got {}", count));
    }
    Ok(())
}

#[test]
fn trace_rejects_malformed_input() -> Result<(), String> {
    match CustomTrace::parse("\n# only comments\n") {
        Err(TraceError::Empty) => {}
        other => return Err(format!("Expected Empty, got {:?}", other)),
    }
    match CustomTrace::parse("0 0.0\n") {
        Err(TraceError::MalformedRow { line: 1, .. }) => {}
        other => return Err(format!("Expected MalformedRow, got {:?}", other)),
    }
    match CustomTrace::parse("0 0.0 10\n1 -1.0 10\n") {
        Err(TraceError::InvalidTime { line: 2, .. }) => {}
        other => return Err(format!("Expected InvalidTime, got {:?}", other)),
    }
    match CustomTrace::parse("0 0.0 10.5\n") {
        Err(TraceError::InvalidSize { line: 1, .. }) => {}
        other => return Err(format!("Expected InvalidSize, got {:?}", other)),
    }
    match CustomTrace::parse("0 1.0 10\n1 0.5 10\n") {
        Err(TraceError::OutOfOrder { line: 2 }) => {}
        other => return Err(format!("Expected OutOfOrder, got {:?}", other)),
    }
    Ok(())
}

#[test]
fn merge_coalesces_aligned_cbr() -> Result<(), String> {
    let fast = CbrEvents::new(500.0, 50, Duration::ZERO, None);
    let slow = CbrEvents::new(350.0, 70, Duration::ZERO, None);
    let merged: Vec<Event> = merge(vec![fast, slow], Some(ms(500))).collect();
    let expected = vec![
        Event::new(ms(0), 120),
        Event::new(ms(100), 50),
        Event::new(ms(200), 120),
        Event::new(ms(300), 50),
        Event::new(ms(400), 120),
    ];
    if merged != expected {
        return Err(format!("Unexpected merge: {:?}", merged));
    }
    Ok(())
}

#[test]
fn merge_is_monotonic_and_conserves_size() -> Result<(), String> {
    let inputs = vec![
        TrafficPattern::cbr(1000.0, 30, Duration::ZERO, Some(ms(3000)))
            .map_err(|err| err.to_string())?
            .events(None),
        TrafficPattern::poisson(2000.0, 20, ms(10), Some(ms(3000)))
            .map_err(|err| err.to_string())?
            .events(Some(3)),
        TrafficPattern::cbr(700.0, 70, ms(5), Some(ms(2000)))
            .map_err(|err| err.to_string())?
            .events(None),
    ];
    let expected_total: u64 = inputs
        .iter()
        .map(|input| {
            input
                .clone()
                .map(|event| event.size)
                .sum::<u64>()
        })
        .sum();
    let merged: Vec<Event> = merge(inputs, None).collect();
    for pair in merged.windows(2) {
        if let [previous, next] = pair
            && next.offset <= previous.offset
        {
            return Err(format!("Merged offsets not strictly increasing: {:?}", pair));
        }
    }
    let total: u64 = merged.iter().map(|event| event.size).sum();
    if total != expected_total {
        return Err(format!("Size not conserved: {} vs {}", total, expected_total));
    }
    Ok(())
}

#[test]
fn merge_single_input_passes_through() -> Result<(), String> {
    let input = CbrEvents::new(1000.0, 100, Duration::ZERO, Some(ms(1000)));
    let merged = merge(vec![input], Some(ms(200)));
    let Merged::Single(inner) = merged else {
        return Err("Expected a pass-through merge".to_owned());
    };
    if inner.count() != 10 {
        return Err("Single input must ignore the cutoff".to_owned());
    }
    let empty: Vec<CbrEvents> = Vec::new();
    if merge(empty, None).next().is_some() {
        return Err("Empty merge produced events".to_owned());
    }
    Ok(())
}

#[test]
fn merge_drops_exhausted_inputs() -> Result<(), String> {
    let short = CbrEvents::new(1000.0, 100, Duration::ZERO, Some(ms(250)));
    let long = CbrEvents::new(1000.0, 1000, Duration::ZERO, Some(ms(3000)));
    let merged: Vec<Event> = merge(vec![short, long], None).collect();
    let expected = vec![
        Event::new(ms(0), 1100),
        Event::new(ms(100), 100),
        Event::new(ms(200), 100),
        Event::new(ms(1000), 1000),
        Event::new(ms(2000), 1000),
    ];
    if merged != expected {
        return Err(format!("Unexpected merge: {:?}", merged));
    }
    Ok(())
}

#[test]
fn pattern_rejects_invalid_parameters() -> Result<(), String> {
    if TrafficPattern::cbr(0.0, 10, Duration::ZERO, None).is_ok() {
        return Err("Zero rate accepted".to_owned());
    }
    if TrafficPattern::poisson(f64::NAN, 10, Duration::ZERO, None).is_ok() {
        return Err("NaN rate accepted".to_owned());
    }
    if TrafficPattern::cbr(10.0, 0, Duration::ZERO, None).is_ok() {
        return Err("Zero size accepted".to_owned());
    }
    if TrafficPattern::cbr(10.0, 10, ms(500), Some(ms(500))).is_ok() {
        return Err("Empty window accepted".to_owned());
    }
    Ok(())
}
