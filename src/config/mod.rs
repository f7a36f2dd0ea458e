//! Configuration for Maintboard.
//!
//! Settings live in KDL files with the same schema at two levels:
//!
//! - System: `~/.config/maintboard/config.kdl` (or `$MB_CONFIG_DIR/config.kdl`)
//! - Project: `./maintboard.kdl` in the working directory
//!
//! Contains:
//! - `source` - Path of the spreadsheet to load
//! - `refresh-interval` - Seconds between periodic refreshes
//! - `recent-limit` - Rows in the recent-items listing
//! - `output-format` - "json" or "human"
//!
//! ## Precedence
//!
//! CLI flag > env var > project config > system config > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, ConfigPaths, Resolved, ResolvedConfig, ValueSource, read_config_file,
    resolve_config, resolve_config_with_env,
};
pub use schema::{MaintboardConfig, OutputFormat};
