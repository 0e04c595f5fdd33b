use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Host -> port (string key) -> patterns merged into that flow.
pub type CommandConfig = BTreeMap<String, BTreeMap<String, Vec<PatternConfig>>>;

/// A command file: a bare list (JSON) or a `commands` table (TOML).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommandFile {
    List(Vec<CommandConfig>),
    Table { commands: Vec<CommandConfig> },
}

impl CommandFile {
    #[must_use]
    pub fn into_commands(self) -> Vec<CommandConfig> {
        match self {
            Self::List(commands) | Self::Table { commands } => commands,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternConfig {
    #[serde(flatten)]
    pub source: SourceConfig,
    /// Seconds after the flow start.
    #[serde(default)]
    pub start_time: f64,
    pub end_time: Option<f64>,
    /// Wire packet size for this flow, overriding `--packet-size`.
    pub packet_size: Option<usize>,
}

/// `rate` is given in bits per second.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Cbr {
        rate: f64,
        #[serde(alias = "burstSize")]
        size: u64,
    },
    Poisson {
        rate: f64,
        #[serde(alias = "burstSize")]
        size: u64,
    },
    #[serde(alias = "trace")]
    File { path: PathBuf },
}
