//! Hawaii Climate Core Library
//!
//! Shared utilities for the climate API service:
//! - Configuration loading (XDG-compliant)
//! - Dataset file checks

mod config;
pub mod fs;

pub use config::{find_config_file, get_xdg_config_path, load_config, ConfigSource};
pub use fs::require_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "hawaii-climate";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default location of the measurement/station SQLite file
pub const DEFAULT_DATABASE_PATH: &str = "./Resources/hawaii.sqlite";

/// Default size of the read-only connection pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
