//! Core library for the `tprobe` CLI.
//!
//! `tprobe` replays synthetic UDP traffic described in a command file. Each
//! destination port carries a merged schedule of constant-bit-rate, Poisson
//! or trace-driven patterns; every sent and received packet is binned into
//! a per-port series that yields an average bit rate and a coefficient of
//! variation. The binary is the primary interface; library APIs may evolve
//! with it.
pub mod app;
pub mod args;
pub mod charts;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod pattern;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod sinks;
pub mod transport;
