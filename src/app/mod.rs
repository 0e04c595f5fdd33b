//! Run coordination: flow planning, worker orchestration and reporting.
mod plan;
mod report;
mod runner;


pub use plan::{ListenerPlan, RunPlan, SenderPlan, plan_run, resolve};
pub use report::{PlotWriter, append_summary, summary_lines};
pub use runner::{DEFAULT_PACKET_SIZE, DEFAULT_START_DELAY, RunReport, RunSettings, run};
