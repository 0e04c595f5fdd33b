use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::app::{DEFAULT_PACKET_SIZE, RunSettings};
use crate::domain::RunMode;
use crate::sinks::SinkOptions;

use super::parsers::{
    parse_duration_arg, parse_packet_size, parse_positive_u64, parse_positive_usize,
};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Synthetic UDP traffic generator - CBR, Poisson and trace replay flows with per-port rate and burstiness statistics."
)]
pub struct ProbeArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (set TPROBE_LOG or RUST_LOG for finer control)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Send the experiment's flows without listening
    Send(RunArgs),
    /// Listen on the experiment's ports without sending
    Receive(RunArgs),
    /// Send and listen at the same time
    SendReceive(RunArgs),
    /// Relay datagrams from local ports to a remote host
    Forward(ForwardArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Command file (.json or .toml) holding a list of experiments
    pub command_path: PathBuf,

    /// Index of the experiment to run
    pub experiment_id: usize,

    /// Run length (supports ms/s/m/h); defaults to the latest pattern end
    #[arg(long, short = 'd', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Wire size of a full packet in bytes, for patterns that set none
    #[arg(long = "packet-size", default_value_t = DEFAULT_PACKET_SIZE, value_parser = parse_packet_size)]
    pub packet_size: usize,

    /// Delay between socket setup and the shared flow start (ms)
    #[arg(long = "start-delay-ms", default_value_t = 500)]
    pub start_delay_ms: u64,

    /// Statistics bin width (ms)
    #[arg(long = "bin-ms", default_value = "200", value_parser = parse_positive_u64)]
    pub bin_ms: PositiveU64,

    /// Listener read timeout (ms)
    #[arg(long = "read-timeout-ms", default_value = "100", value_parser = parse_positive_u64)]
    pub read_timeout_ms: PositiveU64,

    /// Seed for Poisson arrivals
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append per-port statistics to the summary CSV
    #[arg(long, short = 's')]
    pub summary: bool,

    /// Summary CSV path (implies --summary; defaults to the command file with a .csv extension)
    #[arg(long = "summary-path")]
    pub summary_path: Option<PathBuf>,

    /// Write per-bin rate CSVs for every port
    #[arg(long, short = 'p')]
    pub plot: bool,

    /// Directory for rate CSVs (implies --plot; defaults to <command file stem>/<id>)
    #[arg(long = "plotting-path", short = 'P')]
    pub plotting_path: Option<PathBuf>,

    /// Render PNG rate charts into this directory
    #[arg(long = "charts-path")]
    pub charts_path: Option<PathBuf>,

    /// Write raw per-event traces into this directory
    #[arg(long = "trace-dir")]
    pub trace_dir: Option<PathBuf>,

    /// Print every event to stdout
    #[arg(long)]
    pub echo: bool,
}

impl RunArgs {
    #[must_use]
    pub fn run_settings(&self, mode: RunMode, duration: Duration) -> RunSettings {
        let mut settings = RunSettings::new(mode, duration);
        settings.packet_size = self.packet_size;
        settings.start_delay = Duration::from_millis(self.start_delay_ms);
        settings.read_timeout = Duration::from_millis(self.read_timeout_ms.get());
        settings.seed = self.seed;
        settings.sinks = SinkOptions {
            bin: Duration::from_millis(self.bin_ms.get()),
            trace_dir: self.trace_dir.clone(),
            echo: self.echo,
        };
        settings
    }

    /// Where rate CSVs go, if plotting is enabled.
    #[must_use]
    pub fn plot_dir(&self) -> Option<PathBuf> {
        match (&self.plotting_path, self.plot) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(
                self.command_path
                    .with_extension("")
                    .join(self.experiment_id.to_string()),
            ),
            (None, false) => None,
        }
    }

    /// Where the summary row goes, if summaries are enabled.
    #[must_use]
    pub fn summary_file(&self) -> Option<PathBuf> {
        match (&self.summary_path, self.summary) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(self.command_path.with_extension("csv")),
            (None, false) => None,
        }
    }

    /// Directory trace files in the command resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.command_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

#[derive(Debug, Args, Clone)]
pub struct ForwardArgs {
    /// Host to relay to
    pub host: String,

    /// Port on the remote host
    pub destination_port: u16,

    /// Local ports to listen on
    #[arg(required = true)]
    pub listening_ports: Vec<u16>,

    /// Largest datagram relayed in bytes
    #[arg(long = "packet-size", default_value = "5000", value_parser = parse_positive_usize)]
    pub packet_size: PositiveUsize,

    /// Stop after this long (supports ms/s/m/h); runs until interrupted otherwise
    #[arg(long, short = 'd', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Read timeout between shutdown checks (ms)
    #[arg(long = "read-timeout-ms", default_value = "1000", value_parser = parse_positive_u64)]
    pub read_timeout_ms: PositiveU64,
}
