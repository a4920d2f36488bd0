/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default database location.
pub const DEFAULT_DB_PATH: &str = "ottometer.db";

/// Seconds to wait for in-flight requests after a shutdown signal.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 15;

/// Upper bound for a single storage operation, in milliseconds.
pub const DEFAULT_OP_TIMEOUT_MS: u64 = 5_000;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "ottometer_server=info,ottometer_storage=info";
