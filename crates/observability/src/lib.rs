//! Process-wide tracing setup shared by the binaries.

/// Initialize tracing with the format selected by `LOG_FORMAT`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

pub mod tracing;
