//! costsim: article cost and margin simulator
//!
//! Estimates the batch cost, margin and break-even price of a manufactured
//! article from its materials and routing. Scenarios are plain JSON files
//! that can be exported and re-imported; material and operation lines can be
//! loaded from an ERP exposing `/api/bom` and `/api/routing`.

pub mod cli;
pub mod core;
pub mod entities;
pub mod erp;
pub mod json;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging on stderr
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
/// Calling it more than once is a no-op.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
