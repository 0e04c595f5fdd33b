//! Command file loading and conversion into a runnable [`Command`].
//!
//! [`Command`]: crate::domain::Command
mod build;
mod loader;
pub mod types;


pub use build::{BuiltCommand, build_command, default_duration, experiment_name};
pub use loader::{load_command, load_command_file};
