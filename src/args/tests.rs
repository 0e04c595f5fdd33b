use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use super::parsers::{parse_duration_arg, parse_packet_size};
use super::*;
use crate::app::{DEFAULT_PACKET_SIZE, DEFAULT_START_DELAY};
use crate::domain::RunMode;
use crate::error::{AppError, AppResult, ValidationError};
use crate::sinks::DEFAULT_BIN;
use crate::transport::{DEFAULT_FORWARD_PACKET_SIZE, DEFAULT_READ_TIMEOUT};

fn parse_run<I>(args: I) -> AppResult<(Command, RunArgs)>
where
    I: IntoIterator<Item = &'static str>,
{
    let parsed = ProbeArgs::try_parse_from(args)?;
    let run = match &parsed.command {
        Command::Send(run) | Command::Receive(run) | Command::SendReceive(run) => run.clone(),
        Command::Forward(_) => return Err(AppError::validation("Expected a run subcommand")),
    };
    Ok((parsed.command, run))
}

#[test]
fn send_receive_defaults() -> AppResult<()> {
    let (command, run) = parse_run(["tprobe", "send-receive", "cmd.json", "3"])?;
    if !matches!(command, Command::SendReceive(_)) {
        return Err(AppError::validation("Expected send-receive subcommand"));
    }
    if run.command_path != PathBuf::from("cmd.json") || run.experiment_id != 3 {
        return Err(AppError::validation("Unexpected positional arguments"));
    }
    if run.duration.is_some() || run.summary_file().is_some() || run.plot_dir().is_some() {
        return Err(AppError::validation("Unexpected optional outputs"));
    }

    let settings = run.run_settings(RunMode::SendReceive, Duration::from_secs(2));
    if settings.packet_size != DEFAULT_PACKET_SIZE
        || settings.start_delay != DEFAULT_START_DELAY
        || settings.read_timeout != DEFAULT_READ_TIMEOUT
        || settings.sinks.bin != DEFAULT_BIN
        || settings.sinks.echo
        || settings.seed.is_some()
    {
        return Err(AppError::validation(format!(
            "Unexpected default settings: {:?}",
            settings
        )));
    }
    Ok(())
}

#[test]
fn run_options_flow_into_settings() -> AppResult<()> {
    let (command, run) = parse_run([
        "tprobe",
        "send",
        "exp/cmd.toml",
        "0",
        "--duration",
        "1500ms",
        "--packet-size",
        "512",
        "--bin-ms",
        "50",
        "--read-timeout-ms",
        "20",
        "--start-delay-ms",
        "0",
        "--seed",
        "9",
        "--trace-dir",
        "traces",
        "--echo",
    ])?;
    if !matches!(command, Command::Send(_)) {
        return Err(AppError::validation("Expected send subcommand"));
    }
    if run.duration != Some(Duration::from_millis(1500)) {
        return Err(AppError::validation("Unexpected duration"));
    }
    let settings = run.run_settings(RunMode::Send, Duration::from_millis(1500));
    if settings.packet_size != 512
        || settings.sinks.bin != Duration::from_millis(50)
        || settings.read_timeout != Duration::from_millis(20)
        || !settings.start_delay.is_zero()
        || settings.seed != Some(9)
        || settings.sinks.trace_dir != Some(PathBuf::from("traces"))
        || !settings.sinks.echo
    {
        return Err(AppError::validation(format!(
            "Unexpected settings: {:?}",
            settings
        )));
    }
    if run.base_dir() != Path::new("exp") {
        return Err(AppError::validation("Unexpected base dir"));
    }
    Ok(())
}

#[test]
fn output_flags_pick_default_paths() -> AppResult<()> {
    let (_, run) = parse_run(["tprobe", "receive", "exp/cmd.json", "7", "-s", "-p"])?;
    if run.summary_file() != Some(PathBuf::from("exp/cmd.csv")) {
        return Err(AppError::validation(format!(
            "Unexpected summary path: {:?}",
            run.summary_file()
        )));
    }
    if run.plot_dir() != Some(PathBuf::from("exp/cmd/7")) {
        return Err(AppError::validation(format!(
            "Unexpected plot dir: {:?}",
            run.plot_dir()
        )));
    }

    let (_, explicit) = parse_run([
        "tprobe",
        "receive",
        "exp/cmd.json",
        "7",
        "--summary-path",
        "out.csv",
        "-P",
        "plots",
    ])?;
    if explicit.summary_file() != Some(PathBuf::from("out.csv"))
        || explicit.plot_dir() != Some(PathBuf::from("plots"))
    {
        return Err(AppError::validation("Explicit paths were not used"));
    }
    Ok(())
}

#[test]
fn forward_subcommand_parses_ports() -> AppResult<()> {
    let args = ProbeArgs::try_parse_from([
        "tprobe",
        "forward",
        "example.org",
        "9000",
        "10001",
        "10002",
        "--duration",
        "2m",
    ])?;
    let Command::Forward(forward) = args.command else {
        return Err(AppError::validation("Expected forward subcommand"));
    };
    if forward.host != "example.org"
        || forward.destination_port != 9000
        || forward.listening_ports != [10001, 10002]
    {
        return Err(AppError::validation("Unexpected forward positionals"));
    }
    if forward.packet_size.get() != DEFAULT_FORWARD_PACKET_SIZE
        || forward.read_timeout_ms.get() != 1000
        || forward.duration != Some(Duration::from_secs(120))
    {
        return Err(AppError::validation("Unexpected forward options"));
    }
    Ok(())
}

#[test]
fn forward_requires_a_port() -> AppResult<()> {
    if ProbeArgs::try_parse_from(["tprobe", "forward", "example.org", "9000"]).is_ok() {
        return Err(AppError::validation("Expected missing ports to fail"));
    }
    Ok(())
}

#[test]
fn global_flags_after_subcommand() -> AppResult<()> {
    let args =
        ProbeArgs::try_parse_from(["tprobe", "send", "cmd.json", "0", "-v", "--no-color"])?;
    if !args.verbose || !args.no_color {
        return Err(AppError::validation("Global flags not parsed"));
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("10", Duration::from_secs(10)),
        ("2.5", Duration::from_millis(2500)),
        ("250ms", Duration::from_millis(250)),
        ("3s", Duration::from_secs(3)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "Unexpected duration for {}: {:?}",
                input, parsed
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_rejects_bad_input() -> AppResult<()> {
    if !matches!(parse_duration_arg(""), Err(ValidationError::DurationEmpty)) {
        return Err(AppError::validation("Expected empty duration error"));
    }
    if !matches!(
        parse_duration_arg("fast"),
        Err(ValidationError::InvalidDurationFormat { .. })
    ) {
        return Err(AppError::validation("Expected format error"));
    }
    if !matches!(
        parse_duration_arg("1.2.3"),
        Err(ValidationError::InvalidDurationFormat { .. })
    ) {
        return Err(AppError::validation("Expected format error for two dots"));
    }
    if !matches!(
        parse_duration_arg("5d"),
        Err(ValidationError::InvalidDurationUnit { .. })
    ) {
        return Err(AppError::validation("Expected unit error"));
    }
    if !matches!(parse_duration_arg("0ms"), Err(ValidationError::DurationZero)) {
        return Err(AppError::validation("Expected zero duration error"));
    }
    Ok(())
}

#[test]
fn packet_size_must_fit_a_tag() -> AppResult<()> {
    if !matches!(
        parse_packet_size("45"),
        Err(ValidationError::ValueTooSmall { min: 46 })
    ) {
        return Err(AppError::validation("Expected too-small error"));
    }
    if parse_packet_size("46")? != 46 {
        return Err(AppError::validation("Unexpected packet size"));
    }
    if ProbeArgs::try_parse_from(["tprobe", "send", "cmd.json", "0", "--bin-ms", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero bin to fail"));
    }
    Ok(())
}
