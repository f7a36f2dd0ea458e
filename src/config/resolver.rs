//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`MB_SOURCE`, `MB_REFRESH_INTERVAL`, ...)
//! 3. Project config (`./maintboard.kdl`)
//! 4. System config (`~/.config/maintboard/config.kdl`, or `$MB_CONFIG_DIR/config.kdl`)
//! 5. Built-in defaults

use kdl::KdlDocument;
use std::path::{Path, PathBuf};

use crate::config::{MaintboardConfig, OutputFormat};
use crate::{Error, Result};

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "MB_CONFIG_DIR";
/// Environment variable naming the source spreadsheet.
pub const SOURCE_ENV: &str = "MB_SOURCE";
/// Environment variable holding the refresh interval in seconds.
pub const REFRESH_INTERVAL_ENV: &str = "MB_REFRESH_INTERVAL";
/// Environment variable holding the recent-items limit.
pub const RECENT_LIMIT_ENV: &str = "MB_RECENT_LIMIT";

/// File name of the project-level config, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "maintboard.kdl";
/// File name of the system-level config inside the config directory.
pub const SYSTEM_CONFIG_FILE: &str = "config.kdl";

pub const DEFAULT_SOURCE: &str = "demo.xlsx";
pub const DEFAULT_REFRESH_INTERVAL: u64 = 300;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from the project config file
    Project,
    /// Value from the system config file
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub source: Resolved<PathBuf>,
    pub refresh_interval: Resolved<u64>,
    pub recent_limit: Resolved<usize>,
    pub output_format: Resolved<OutputFormat>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            source: Resolved::new(PathBuf::from(DEFAULT_SOURCE), ValueSource::Default),
            refresh_interval: Resolved::new(DEFAULT_REFRESH_INTERVAL, ValueSource::Default),
            recent_limit: Resolved::new(DEFAULT_RECENT_LIMIT, ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn source(&self) -> &Path {
        &self.source.value
    }

    pub fn refresh_interval(&self) -> u64 {
        self.refresh_interval.value
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub refresh_interval: Option<u64>,
    pub recent_limit: Option<usize>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval = Some(secs);
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = Some(limit);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Locations of the two config files.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub system: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    /// Standard locations for a working directory.
    pub fn discover(cwd: &Path) -> Self {
        let system_dir = std::env::var_os(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("maintboard")));
        Self {
            system: system_dir.map(|d| d.join(SYSTEM_CONFIG_FILE)),
            project: Some(cwd.join(PROJECT_CONFIG_FILE)),
        }
    }
}

/// Read and validate one config file. A missing file is an empty config.
pub fn read_config_file(path: &Path) -> Result<MaintboardConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MaintboardConfig::new()),
        Err(e) => return Err(e.into()),
    };
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = MaintboardConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Resolve configuration using the process environment.
pub fn resolve_config(paths: &ConfigPaths, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    resolve_config_with_env(paths, overrides, |name| std::env::var(name).ok())
}

fn pick<T: Clone>(
    cli: Option<T>,
    env: Option<(T, &str)>,
    project: Option<T>,
    system: Option<T>,
    default: Resolved<T>,
) -> Resolved<T> {
    if let Some(v) = cli {
        Resolved::new(v, ValueSource::CliFlag)
    } else if let Some((v, name)) = env {
        Resolved::new(v, ValueSource::EnvVar(name.to_string()))
    } else if let Some(v) = project {
        Resolved::new(v, ValueSource::Project)
    } else if let Some(v) = system {
        Resolved::new(v, ValueSource::System)
    } else {
        default
    }
}

/// Resolve configuration with an explicit environment lookup.
pub fn resolve_config_with_env<E>(
    paths: &ConfigPaths,
    overrides: &ConfigOverrides,
    env: E,
) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let system = match &paths.system {
        Some(p) => read_config_file(p)?,
        None => MaintboardConfig::new(),
    };
    let project = match &paths.project {
        Some(p) => read_config_file(p)?,
        None => MaintboardConfig::new(),
    };

    let env_source = env(SOURCE_ENV)
        .filter(|s| !s.trim().is_empty())
        .map(|s| (PathBuf::from(s), SOURCE_ENV));
    let env_interval = match env(REFRESH_INTERVAL_ENV) {
        Some(raw) => Some((parse_positive(&raw, REFRESH_INTERVAL_ENV)?, REFRESH_INTERVAL_ENV)),
        None => None,
    };
    let env_limit = match env(RECENT_LIMIT_ENV) {
        Some(raw) => Some((
            parse_positive(&raw, RECENT_LIMIT_ENV)? as usize,
            RECENT_LIMIT_ENV,
        )),
        None => None,
    };

    if overrides.refresh_interval == Some(0) {
        return Err(Error::InvalidInput(
            "refresh interval must be at least 1 second".to_string(),
        ));
    }
    if overrides.recent_limit == Some(0) {
        return Err(Error::InvalidInput("limit must be at least 1".to_string()));
    }

    let defaults = ResolvedConfig::default();
    Ok(ResolvedConfig {
        source: pick(
            overrides.source.clone(),
            env_source,
            project.source,
            system.source,
            defaults.source,
        ),
        refresh_interval: pick(
            overrides.refresh_interval,
            env_interval,
            project.refresh_interval,
            system.refresh_interval,
            defaults.refresh_interval,
        ),
        recent_limit: pick(
            overrides.recent_limit,
            env_limit,
            project.recent_limit,
            system.recent_limit,
            defaults.recent_limit,
        ),
        output_format: pick(
            overrides.output_format,
            None,
            project.output_format,
            system.output_format,
            defaults.output_format,
        ),
    })
}

fn parse_positive(raw: &str, name: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Config(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        paths: ConfigPaths,
    }

    fn fixture(system: Option<&str>, project: Option<&str>) -> Fixture {
        let dir = TempDir::new().unwrap();
        let system_path = dir.path().join("system").join(SYSTEM_CONFIG_FILE);
        let project_path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::create_dir_all(system_path.parent().unwrap()).unwrap();
        if let Some(content) = system {
            fs::write(&system_path, content).unwrap();
        }
        if let Some(content) = project {
            fs::write(&project_path, content).unwrap();
        }
        Fixture {
            _dir: dir,
            paths: ConfigPaths {
                system: Some(system_path),
                project: Some(project_path),
            },
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    // ==================== ValueSource Tests ====================

    #[test]
    fn test_value_source_display() {
        assert_eq!(format!("{}", ValueSource::CliFlag), "cli");
        assert_eq!(format!("{}", ValueSource::EnvVar("MB_SOURCE".into())), "env:MB_SOURCE");
        assert_eq!(format!("{}", ValueSource::Project), "project");
        assert_eq!(format!("{}", ValueSource::System), "system");
        assert_eq!(format!("{}", ValueSource::Default), "default");
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_resolve_defaults() {
        let fx = fixture(None, None);
        let config = resolve_config_with_env(&fx.paths, &ConfigOverrides::new(), no_env).unwrap();

        assert_eq!(config.source(), Path::new(DEFAULT_SOURCE));
        assert_eq!(config.source.source, ValueSource::Default);
        assert_eq!(config.refresh_interval(), 300);
        assert_eq!(config.recent_limit(), 10);
        assert_eq!(config.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_project_overrides_system() {
        let fx = fixture(
            Some("source \"system.xlsx\"\nrefresh-interval 60\n"),
            Some("source \"project.csv\"\n"),
        );
        let config = resolve_config_with_env(&fx.paths, &ConfigOverrides::new(), no_env).unwrap();

        assert_eq!(config.source(), Path::new("project.csv"));
        assert_eq!(config.source.source, ValueSource::Project);
        assert_eq!(config.refresh_interval(), 60);
        assert_eq!(config.refresh_interval.source, ValueSource::System);
    }

    #[test]
    fn test_env_overrides_files_and_cli_overrides_env() {
        let fx = fixture(None, Some("source \"project.csv\"\nrecent-limit 4\n"));
        let env: HashMap<&str, &str> = [(SOURCE_ENV, "env.xlsx"), (RECENT_LIMIT_ENV, "7")].into();
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());

        let config = resolve_config_with_env(&fx.paths, &ConfigOverrides::new(), lookup).unwrap();
        assert_eq!(config.source(), Path::new("env.xlsx"));
        assert_eq!(config.source.source, ValueSource::EnvVar(SOURCE_ENV.to_string()));
        assert_eq!(config.recent_limit(), 7);

        let overrides = ConfigOverrides::new()
            .with_source("cli.csv")
            .with_output_format(OutputFormat::Human);
        let config = resolve_config_with_env(&fx.paths, &overrides, lookup).unwrap();
        assert_eq!(config.source(), Path::new("cli.csv"));
        assert_eq!(config.source.source, ValueSource::CliFlag);
        assert_eq!(config.output_format(), OutputFormat::Human);
    }

    #[test]
    fn test_invalid_env_value_is_an_error() {
        let fx = fixture(None, None);
        let lookup = |name: &str| (name == REFRESH_INTERVAL_ENV).then(|| "0".to_string());
        let err = resolve_config_with_env(&fx.paths, &ConfigOverrides::new(), lookup).unwrap_err();
        assert!(err.to_string().contains(REFRESH_INTERVAL_ENV));
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let fx = fixture(None, Some("recent-limit 0\n"));
        let err = resolve_config_with_env(&fx.paths, &ConfigOverrides::new(), no_env).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("recent-limit")));

        let fx = fixture(Some("source \"unterminated\n"), None);
        assert!(resolve_config_with_env(&fx.paths, &ConfigOverrides::new(), no_env).is_err());
    }

    #[test]
    fn test_zero_cli_limit_rejected() {
        let fx = fixture(None, None);
        let overrides = ConfigOverrides::new().with_recent_limit(0);
        assert!(matches!(
            resolve_config_with_env(&fx.paths, &overrides, no_env),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    #[serial]
    fn test_discover_uses_config_dir_env() {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialized with other env-mutating tests; test code only.
        unsafe {
            std::env::set_var(CONFIG_DIR_ENV, dir.path());
        }
        let paths = ConfigPaths::discover(Path::new("/work"));
        unsafe {
            std::env::remove_var(CONFIG_DIR_ENV);
        }

        assert_eq!(paths.system, Some(dir.path().join(SYSTEM_CONFIG_FILE)));
        assert_eq!(paths.project, Some(PathBuf::from("/work").join(PROJECT_CONFIG_FILE)));
    }
}
