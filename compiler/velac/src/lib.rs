//! Vela code generator CLI.
//!
//! The binary is a thin argument parser over [`commands`]; the command
//! bodies live in this library so integration tests can drive them.

pub mod commands;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the tree-shaped span logger, once per process.
///
/// Silent unless `RUST_LOG` holds a filter, e.g. `vela_codegen=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_indent_lines(true),
            )
            .init();
    });
}
