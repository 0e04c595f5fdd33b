mod app;
mod config;
mod sink;
mod trace;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use sink::SinkError;
pub use trace::TraceError;
pub use validation::ValidationError;
