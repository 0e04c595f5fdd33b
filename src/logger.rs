use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "TPROBE_LOG";

fn level_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Filter from `TPROBE_LOG`, then `RUST_LOG`, then the verbosity flag.
fn resolve_filter(verbose: bool, directive: Option<&str>) -> EnvFilter {
    directive.map_or_else(
        || level_filter(verbose),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_err| level_filter(verbose)),
    )
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free
/// for the summary table and echoed events.
pub fn init_logging(verbose: bool, no_color: bool) {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_err| std::env::var("RUST_LOG"))
        .ok();
    let filter = resolve_filter(verbose, directive.as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false, true);
        init_logging(true, true);
    }

    #[test]
    fn explicit_directive_wins_over_verbosity() -> Result<(), String> {
        let filter = resolve_filter(true, Some("warn"));
        if filter.to_string() != "warn" {
            return Err(format!("Unexpected filter: {}", filter));
        }
        Ok(())
    }

    #[test]
    fn invalid_directive_falls_back_to_verbosity() -> Result<(), String> {
        let filter = resolve_filter(true, Some("tprobe=loudest"));
        if filter.to_string() != "debug" {
            return Err(format!("Unexpected filter: {}", filter));
        }
        let quiet = resolve_filter(false, None);
        if quiet.to_string() != "info" {
            return Err(format!("Unexpected filter: {}", quiet));
        }
        Ok(())
    }
}
