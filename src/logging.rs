//! Logging setup for the CLI. Filtered via `RUST_LOG`, e.g.
//! `RUST_LOG=jsondiag=debug`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub(crate) fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}
