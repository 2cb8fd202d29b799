//! Process-wide tracing setup shared by the Nexium binaries.

/// Log output setup (filters, format).
pub mod tracing;

pub use crate::tracing::{LogFormat, init_with};

/// Initialize tracing with the format named by `NEXIUM_LOG_FORMAT`
/// (`json` by default, `pretty` for local development).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let format = std::env::var("NEXIUM_LOG_FORMAT")
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    init_with(format);
}
