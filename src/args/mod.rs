//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Command, ForwardArgs, ProbeArgs, RunArgs};
pub use types::{PositiveU64, PositiveUsize};
