use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::Event;
use crate::error::{ConfigError, TraceError};

/// A parsed literal trace. Cloning shares the rows.
#[derive(Debug, Clone)]
pub struct CustomTrace {
    rows: Arc<[Event]>,
}

impl CustomTrace {
    /// Parses `tag time size` rows separated by whitespace or commas.
    /// Blank lines and `#` comments are skipped; the tag column is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error when the trace is empty, a row is malformed or
    /// times go backwards.
    pub fn parse(source: &str) -> Result<Self, TraceError> {
        let mut rows: Vec<Event> = Vec::new();
        for (index, raw) in source.lines().enumerate() {
            let line = index.saturating_add(1);
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            let fields: Vec<&str> = content
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|field| !field.is_empty())
                .collect();
            let [_, time, size] = fields.as_slice() else {
                return Err(TraceError::MalformedRow {
                    line,
                    content: content.to_owned(),
                });
            };
            let offset = parse_time(line, time)?;
            let size = size.parse::<u64>().map_err(|_err| TraceError::InvalidSize {
                line,
                value: (*size).to_owned(),
            })?;
            if rows.last().is_some_and(|previous| offset < previous.offset) {
                return Err(TraceError::OutOfOrder { line });
            }
            rows.push(Event::new(offset, size));
        }
        if rows.is_empty() {
            return Err(TraceError::Empty);
        }
        Ok(Self { rows: rows.into() })
    }

    /// Reads and parses a trace file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadTrace {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source).map_err(|source| ConfigError::MalformedTrace {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.rows.iter().map(|row| row.size).max().unwrap_or_default()
    }

    #[must_use]
    pub fn events(&self, start: Duration, end: Option<Duration>) -> TraceEvents {
        TraceEvents {
            rows: Arc::clone(&self.rows),
            index: 0,
            start,
            end,
        }
    }
}

fn parse_time(line: usize, value: &str) -> Result<Duration, TraceError> {
    let invalid = || TraceError::InvalidTime {
        line,
        value: value.to_owned(),
    };
    let seconds = value.parse::<f64>().map_err(|_err| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_err| invalid())
}

/// Replays trace rows shifted by the pattern start.
#[derive(Debug, Clone)]
pub struct TraceEvents {
    rows: Arc<[Event]>,
    index: usize,
    start: Duration,
    end: Option<Duration>,
}

impl Iterator for TraceEvents {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.index)?;
        let offset = self.start.checked_add(row.offset)?;
        if self.end.is_some_and(|end| offset >= end) {
            self.index = self.rows.len();
            return None;
        }
        self.index = self.index.saturating_add(1);
        Some(Event::new(offset, row.size))
    }
}
