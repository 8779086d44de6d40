//! Tracing setup for the CLI.
//!
//! Logs go to stderr so they never mix with command output. With `--timing`,
//! every `#[instrument]`ed span reports its duration when it closes.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Initialize the tracing subscriber.
///
/// `verbose` enables debug output, `timing` logs span close events with
/// their duration.
pub fn init_tracing(verbose: bool, timing: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else if timing {
        // Span close events are logged at INFO level
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let span_events = if timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_level(true)
                .with_span_events(span_events)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
