use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches};
use futures_util::future::join_all;
use tokio::time::Instant;

use crate::app::{self, PlotWriter, RunReport, resolve};
use crate::args::{Command, ForwardArgs, ProbeArgs, RunArgs};
use crate::charts::plot_rate_charts;
use crate::config::{build_command, default_duration, experiment_name, load_command};
use crate::domain::RunMode;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::metrics::SeriesObserver;
use crate::shutdown::ShutdownSender;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};
use crate::transport::{ForwardConfig, WorkerExit, bind_port, spawn_forwarder};

/// Parses the command line, installs logging and drives the chosen
/// subcommand on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when arguments are invalid, the command file cannot be
/// used, or no flow could run.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| AppError::validation(ValidationError::RuntimeBuildFailed { source }))?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<ProbeArgs>> {
    let mut cmd = ProbeArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if matches!(raw_args.as_slice(), [] | [_]) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    Ok(Some(ProbeArgs::from_arg_matches(&matches)?))
}

async fn run_async(args: ProbeArgs) -> AppResult<()> {
    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let result = match args.command {
        Command::Send(run_args) => run_experiment(RunMode::Send, &run_args, &shutdown_tx).await,
        Command::Receive(run_args) => {
            run_experiment(RunMode::Receive, &run_args, &shutdown_tx).await
        }
        Command::SendReceive(run_args) => {
            run_experiment(RunMode::SendReceive, &run_args, &shutdown_tx).await
        }
        Command::Forward(forward_args) => run_forward(&forward_args, &shutdown_tx).await,
    };

    drop(shutdown_tx.send(()));
    if let Err(err) = signal_handle.await {
        tracing::warn!("Signal handler task failed: {}", err);
    }
    result
}

async fn run_experiment(
    mode: RunMode,
    args: &RunArgs,
    shutdown_tx: &ShutdownSender,
) -> AppResult<()> {
    let config = load_command(&args.command_path, args.experiment_id)?;
    let built = build_command(&config, args.base_dir());
    let name = experiment_name(&args.command_path, args.experiment_id);
    let duration = default_duration(args.duration, &built.command)?;
    let settings = args.run_settings(mode, duration);

    let mut observers: Vec<Box<dyn SeriesObserver>> = Vec::new();
    if let Some(dir) = args.plot_dir() {
        observers.push(Box::new(PlotWriter::create(dir)?));
    }
    if let Some(dir) = &settings.sinks.trace_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    tracing::info!("Running experiment {} for {:?}.", name, duration);
    let mut report = app::run(&built.command, &settings, shutdown_tx, observers).await?;
    let mut errors = built.rejected;
    errors.append(&mut report.errors);
    report.errors = errors;

    for line in app::summary_lines(&name, &report) {
        println!("{}", line);
    }
    if let Some(path) = args.summary_file() {
        app::append_summary(&path, &name, &report.stats).await?;
        tracing::info!("Summary appended to {}.", path.display());
    }
    if let Some(dir) = &args.charts_path {
        let written = plot_rate_charts(&report, dir).await?;
        tracing::info!("Wrote {} chart(s) to {}.", written.len(), dir.display());
    }

    ensure_something_ran(&report)
}

fn ensure_something_ran(report: &RunReport) -> AppResult<()> {
    if report.senders.is_empty() && report.listeners.is_empty() {
        tracing::error!("No flow could run.");
        return Err(AppError::validation(ValidationError::RuntimeErrors));
    }
    Ok(())
}

async fn run_forward(args: &ForwardArgs, shutdown_tx: &ShutdownSender) -> AppResult<()> {
    let destination = resolve(&args.host, args.destination_port)?;
    let deadline = args
        .duration
        .map(|duration| {
            Instant::now()
                .checked_add(duration)
                .ok_or(ValidationError::DurationOverflow)
        })
        .transpose()?;
    let read_timeout = std::time::Duration::from_millis(args.read_timeout_ms.get());

    let mut handles = Vec::with_capacity(args.listening_ports.len());
    for port in &args.listening_ports {
        let socket = bind_port(*port)
            .await
            .map_err(|source| ConfigError::Bind {
                addr: format!("0.0.0.0:{}", port),
                source,
            })?;
        handles.push(spawn_forwarder(
            socket,
            ForwardConfig {
                port: *port,
                destination,
                packet_size: args.packet_size.get(),
                read_timeout,
                deadline,
            },
            shutdown_tx.subscribe(),
        ));
    }
    tracing::info!(
        "Forwarding ports {:?} to {}.",
        args.listening_ports,
        destination
    );

    for result in join_all(handles).await {
        let outcome = result?;
        let reason = match outcome.exit {
            WorkerExit::Cancelled => "interrupted",
            WorkerExit::Deadline | WorkerExit::Exhausted => "finished",
        };
        tracing::info!(
            "Port {} {}: {} datagram(s) forwarded, {} error(s).",
            outcome.port,
            reason,
            outcome.forwarded,
            outcome.errors
        );
    }
    Ok(())
}
