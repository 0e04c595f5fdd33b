//! Run-level domain types shared by the planner and the CLI.
mod command;

pub use command::{Command, Flow, FlowError, RunMode};
