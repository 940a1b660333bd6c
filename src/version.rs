// Build-time identity, sent as the console client's User-Agent

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name (from Cargo.toml); also the binary name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
