use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// Verbosity comes from `RUST_LOG` (default `warn`). Output goes to stderr so
/// it never mixes with the report on stdout.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
