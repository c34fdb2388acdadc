//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the given verbosity.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "retiresim=debug"
    } else {
        "retiresim=info"
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
