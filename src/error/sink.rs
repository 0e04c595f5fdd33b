use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create trace file '{path}': {source}")]
    CreateTrace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write trace file '{path}': {source}")]
    WriteTrace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write plot file '{path}': {source}")]
    WritePlot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write summary '{path}': {source}")]
    WriteSummary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
