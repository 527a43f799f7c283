//! Configuration management for netstage
//!
//! Settings are loaded from environment variables with defaults that match
//! the hosting platform's staging conventions.
//!
//! # Environment Variables
//!
//! - `NETSTAGE_APP_HOME`: Deployed app root, exported as `HOME` - default: "/app"
//! - `NETSTAGE_PUBLISH_DIR`: Publish output, relative to the app root - default: ".cloudfoundry/dotnet_publish"
//! - `NETSTAGE_PORT_VAR`: Platform-injected port variable - default: "PORT"
//! - `NETSTAGE_PROFILE_SCRIPT`: Bootstrap script, relative to the app root - default: ".profile.d/startup.sh"
//! - `NETSTAGE_RELEASE_FILE`: Process manifest, relative to the app root - default: ".cloudfoundry/release.yml"
//! - `NETSTAGE_DOTNET_DIR`: Installed toolchain, relative to `HOME` - default: ".dotnet"
//! - `NETSTAGE_MAX_DEPTH`: Source walk depth bound - default: "10"
//! - `NETSTAGE_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use netstage::StagerConfig;
//!
//! let config = StagerConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use std::env;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

const DEFAULT_APP_HOME: &str = "/app";
const DEFAULT_PUBLISH_DIR: &str = ".cloudfoundry/dotnet_publish";
const DEFAULT_PORT_VAR: &str = "PORT";
const DEFAULT_PROFILE_SCRIPT: &str = ".profile.d/startup.sh";
const DEFAULT_RELEASE_FILE: &str = ".cloudfoundry/release.yml";
const DEFAULT_DOTNET_DIR: &str = ".dotnet";
const DEFAULT_MAX_DEPTH: usize = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Directories never searched for project markers.
const EXCLUDED_DIRS: &[&str] = &["bin", "obj", "node_modules", ".git", ".nuget"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct StagerConfig {
    pub app_home: String,
    pub publish_dir: PathBuf,
    pub port_var: String,
    pub profile_script: PathBuf,
    pub release_file: PathBuf,
    pub dotnet_dir: String,
    pub max_depth: usize,
    pub log_level: String,
}

impl Default for StagerConfig {
    fn default() -> Self {
        let app_home = env::var("NETSTAGE_APP_HOME").unwrap_or_else(|_| DEFAULT_APP_HOME.to_string());

        let publish_dir = env::var("NETSTAGE_PUBLISH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PUBLISH_DIR));

        let port_var = env::var("NETSTAGE_PORT_VAR").unwrap_or_else(|_| DEFAULT_PORT_VAR.to_string());

        let profile_script = env::var("NETSTAGE_PROFILE_SCRIPT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_SCRIPT));

        let release_file = env::var("NETSTAGE_RELEASE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RELEASE_FILE));

        let dotnet_dir =
            env::var("NETSTAGE_DOTNET_DIR").unwrap_or_else(|_| DEFAULT_DOTNET_DIR.to_string());

        let max_depth = env::var("NETSTAGE_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH);

        let log_level = env::var("NETSTAGE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            app_home,
            publish_dir,
            port_var,
            profile_script,
            release_file,
            dotnet_dir,
            max_depth,
            log_level,
        }
    }
}

impl StagerConfig {
    /// Defaults without consulting the environment
    pub fn builtin() -> Self {
        Self {
            app_home: DEFAULT_APP_HOME.to_string(),
            publish_dir: PathBuf::from(DEFAULT_PUBLISH_DIR),
            port_var: DEFAULT_PORT_VAR.to_string(),
            profile_script: PathBuf::from(DEFAULT_PROFILE_SCRIPT),
            release_file: PathBuf::from(DEFAULT_RELEASE_FILE),
            dotnet_dir: DEFAULT_DOTNET_DIR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_home.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "app_home cannot be empty".to_string(),
            ));
        }

        for (field, path) in [
            ("publish_dir", &self.publish_dir),
            ("profile_script", &self.profile_script),
            ("release_file", &self.release_file),
        ] {
            validate_relative(field, path)?;
        }

        validate_relative("dotnet_dir", Path::new(&self.dotnet_dir))?;

        if self.port_var.is_empty()
            || !self
                .port_var
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::ParseError {
                field: "port_var".to_string(),
                error: format!("'{}' is not a valid shell variable name", self.port_var),
            });
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_depth must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Directory names skipped while searching for project markers,
    /// including the top of the publish directory.
    pub fn excluded_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect();
        if let Some(Component::Normal(first)) = self.publish_dir.components().next() {
            let first = first.to_string_lossy().to_string();
            if !dirs.contains(&first) {
                dirs.push(first);
            }
        }
        dirs
    }
}

fn validate_relative(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(format!(
            "{} cannot be empty",
            field
        )));
    }
    if path.is_absolute() {
        return Err(ConfigError::ValidationFailed(format!(
            "{} must be relative to the app root, got {}",
            field,
            path.display()
        )));
    }
    Ok(())
}

impl fmt::Display for StagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "netstage configuration:")?;
        writeln!(f, "  App home: {}", self.app_home)?;
        writeln!(f, "  Publish dir: {}", self.publish_dir.display())?;
        writeln!(f, "  Port variable: {}", self.port_var)?;
        writeln!(f, "  Profile script: {}", self.profile_script.display())?;
        writeln!(f, "  Release file: {}", self.release_file.display())?;
        writeln!(f, "  Toolchain dir: {}", self.dotnet_dir)?;
        writeln!(f, "  Max depth: {}", self.max_depth)?;
        write!(f, "  Log level: {}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "NETSTAGE_APP_HOME",
        "NETSTAGE_PUBLISH_DIR",
        "NETSTAGE_PORT_VAR",
        "NETSTAGE_PROFILE_SCRIPT",
        "NETSTAGE_RELEASE_FILE",
        "NETSTAGE_DOTNET_DIR",
        "NETSTAGE_MAX_DEPTH",
        "NETSTAGE_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();
        let config = StagerConfig::default();

        assert_eq!(config.app_home, "/app");
        assert_eq!(config.publish_dir, PathBuf::from(".cloudfoundry/dotnet_publish"));
        assert_eq!(config.port_var, "PORT");
        assert_eq!(config.profile_script, PathBuf::from(".profile.d/startup.sh"));
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        env::set_var("NETSTAGE_APP_HOME", "/home/vcap/app");
        env::set_var("NETSTAGE_PUBLISH_DIR", "out/publish");
        env::set_var("NETSTAGE_MAX_DEPTH", "4");
        env::set_var("NETSTAGE_LOG_LEVEL", "DEBUG");

        let config = StagerConfig::default();
        assert_eq!(config.app_home, "/home/vcap/app");
        assert_eq!(config.publish_dir, PathBuf::from("out/publish"));
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.log_level, "debug");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_depth_falls_back() {
        clear_env();
        env::set_var("NETSTAGE_MAX_DEPTH", "deep");

        let config = StagerConfig::default();
        assert_eq!(config.max_depth, 10);

        clear_env();
    }

    #[test]
    fn test_validate_rejects_absolute_publish_dir() {
        let mut config = StagerConfig::builtin();
        config.publish_dir = PathBuf::from("/tmp/publish");

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("publish_dir"));
    }

    #[test]
    fn test_validate_rejects_bad_port_var() {
        let mut config = StagerConfig::builtin();
        config.port_var = "PORT}; rm".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let mut config = StagerConfig::builtin();
        config.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_excluded_dirs_include_publish_root() {
        let config = StagerConfig::builtin();
        let dirs = config.excluded_dirs();

        assert!(dirs.contains(&"bin".to_string()));
        assert!(dirs.contains(&"obj".to_string()));
        assert!(dirs.contains(&".cloudfoundry".to_string()));
    }

    #[test]
    fn test_display() {
        let display = StagerConfig::builtin().to_string();
        assert!(display.contains("App home: /app"));
        assert!(display.contains("Publish dir: .cloudfoundry/dotnet_publish"));
    }
}
