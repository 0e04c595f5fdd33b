use std::path::Path;
use std::time::Duration;

use crate::domain::{Command, FlowError};
use crate::error::{ConfigError, ValidationError};
use crate::pattern::{CustomTrace, TrafficPattern};

use super::types::{CommandConfig, PatternConfig, SourceConfig};

const BITS_PER_BYTE: f64 = 8.0;

#[derive(Debug)]
pub struct BuiltCommand {
    pub command: Command,
    pub rejected: Vec<FlowError>,
}

/// Converts a decoded command into patterns. Trace paths resolve against
/// `base_dir`; an invalid pattern rejects its whole flow.
#[must_use]
pub fn build_command(config: &CommandConfig, base_dir: &Path) -> BuiltCommand {
    let mut command = Command::new();
    let mut rejected = Vec::new();

    for (host, ports) in config {
        for (port_key, patterns) in ports {
            let built = parse_port(host, port_key).and_then(|port| {
                patterns
                    .iter()
                    .map(|pattern| build_pattern(pattern, base_dir))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|patterns| (port, patterns))
            });
            match built {
                Ok((port, patterns)) => command.insert(host, port, patterns),
                Err(error) => {
                    tracing::warn!("Skipping flow {}:{}: {}", host, port_key, error);
                    rejected.push(FlowError::new(host, port_key, error));
                }
            }
        }
    }

    BuiltCommand { command, rejected }
}

fn parse_port(host: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_err| ConfigError::InvalidPort {
            host: host.to_owned(),
            value: value.to_owned(),
        })
}

fn build_pattern(config: &PatternConfig, base_dir: &Path) -> Result<TrafficPattern, ConfigError> {
    let start = seconds(config.start_time).ok_or(ConfigError::InvalidWindow {
        start: config.start_time,
        end: config.end_time,
    })?;
    let end = match config.end_time {
        Some(end) => Some(seconds(end).ok_or(ConfigError::InvalidWindow {
            start: config.start_time,
            end: config.end_time,
        })?),
        None => None,
    };

    let pattern = match &config.source {
        SourceConfig::Cbr { rate, size } => {
            TrafficPattern::cbr(rate / BITS_PER_BYTE, *size, start, end)?
        }
        SourceConfig::Poisson { rate, size } => {
            TrafficPattern::poisson(rate / BITS_PER_BYTE, *size, start, end)?
        }
        SourceConfig::File { path } => {
            let trace = CustomTrace::load(&base_dir.join(path))?;
            TrafficPattern::trace(trace, start, end)?
        }
    };
    Ok(pattern.with_packet_size(config.packet_size))
}

fn seconds(value: f64) -> Option<Duration> {
    if value.is_finite() && value >= 0.0 {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}

/// The explicit duration, else the latest pattern end.
///
/// # Errors
///
/// Returns an error when no duration is given and every pattern is
/// unbounded.
pub fn default_duration(
    explicit: Option<Duration>,
    command: &Command,
) -> Result<Duration, ValidationError> {
    explicit
        .or_else(|| command.max_end())
        .ok_or(ValidationError::MissingDuration)
}

/// `<file stem>-<id>` with the id padded to three digits.
#[must_use]
pub fn experiment_name(command_path: &Path, id: usize) -> String {
    let stem = command_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("command");
    format!("{}-{:03}", stem, id)
}
