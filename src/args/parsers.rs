use std::time::Duration;

use super::types::{PositiveU64, PositiveUsize};
use crate::error::ValidationError;
use crate::transport::MIN_WIRE_PACKET;

pub(super) fn parse_positive_u64(s: &str) -> Result<PositiveU64, ValidationError> {
    s.parse::<PositiveU64>()
}

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

/// Wire size of a full packet, at least one header plus a tag.
pub(super) fn parse_packet_size(s: &str) -> Result<usize, ValidationError> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber { source: err })?;
    if value < MIN_WIRE_PACKET {
        return Err(ValidationError::ValueTooSmall {
            min: MIN_WIRE_PACKET as u64,
        });
    }
    Ok(value)
}

/// Parses `10`, `2.5s`, `750ms`, `3m` or `1h`. Bare numbers are seconds.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let number_len = value
        .chars()
        .take_while(|ch| ch.is_ascii_digit() || *ch == '.')
        .count();
    if number_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(number_len);
    let number: f64 = num_part
        .parse()
        .map_err(|_err| ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let seconds = match unit {
        "ms" => number / 1000.0,
        "s" => number,
        "m" => number * 60.0,
        "h" => number * 3600.0,
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    let duration =
        Duration::try_from_secs_f64(seconds).map_err(|_err| ValidationError::DurationOverflow)?;
    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
