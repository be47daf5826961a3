//! Subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `verbosity`;
/// otherwise one `-v` enables `info` and two or more enable `debug`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => DEFAULT_FILTER,
        1 => "algoscope=info",
        _ => "algoscope=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
