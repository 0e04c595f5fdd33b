use std::path::PathBuf;

use thiserror::Error;

use super::TraceError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read command file '{path}': {source}")]
    ReadCommand {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML command file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON command file '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported command file extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Command file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Experiment id {id} out of range (file holds {len} commands).")]
    CommandIndexOutOfRange { id: usize, len: usize },
    #[error("Invalid port '{value}' for host '{host}'.")]
    InvalidPort { host: String, value: String },
    #[error("Pattern rate must be a positive finite number, got {rate}.")]
    InvalidRate { rate: f64 },
    #[error("Pattern size must be >= 1 byte.")]
    InvalidSize,
    #[error("Pattern window is invalid: start={start}, end={end:?}.")]
    InvalidWindow { start: f64, end: Option<f64> },
    #[error("Patterns for {host}:{port} disagree on packet size ({expected} vs {found}).")]
    PacketSizeMismatch {
        host: String,
        port: u16,
        expected: usize,
        found: usize,
    },
    #[error("Failed to resolve host {host}:{port}: {source}")]
    ResolveHost {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("No addresses resolved for {host}:{port}.")]
    NoAddressesResolved { host: String, port: u16 },
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read trace file '{path}': {source}")]
    ReadTrace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed trace file '{path}': {source}")]
    MalformedTrace {
        path: PathBuf,
        #[source]
        source: TraceError,
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
