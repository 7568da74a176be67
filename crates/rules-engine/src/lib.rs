//! Public SDK surface for the rules engine.
//!
//! Re-exports the building blocks and wires configured sources into the
//! server state so the binary and embedders share one setup path.

mod error;
mod setup;

/// Re-export for convenience.
pub use rules_engine_config as config;
pub use rules_engine_core as core;
/// Re-export for convenience.
pub use rules_engine_protocol as protocol;
pub use rules_engine_server as server;
/// Re-export for convenience.
pub use rules_engine_source as source;

pub use error::SetupError;
pub use setup::{Sources, build_state, open_sources, sheets_options};

#[inline]
/// Initialize `env_logger` with millisecond timestamps and `RUST_LOG` filters.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
