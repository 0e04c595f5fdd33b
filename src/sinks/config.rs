use std::path::PathBuf;
use std::time::Duration;

use crate::metrics::SeriesKey;

pub const DEFAULT_BIN: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Width of one accumulator bin.
    pub bin: Duration,
    /// Directory for raw `<port>.<in|out>.trace` files.
    pub trace_dir: Option<PathBuf>,
    /// Print every event to stdout.
    pub echo: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            bin: DEFAULT_BIN,
            trace_dir: None,
            echo: false,
        }
    }
}

impl SinkOptions {
    #[must_use]
    pub fn trace_path(&self, key: SeriesKey) -> Option<PathBuf> {
        self.trace_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.{}.trace", key.port, key.direction)))
    }
}
