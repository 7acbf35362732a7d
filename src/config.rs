//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_LOG_LEVEL, DEFAULT_SANDBOX_CPUS,
    DEFAULT_SANDBOX_MAX_CONCURRENCY, DEFAULT_SANDBOX_MEMORY_MB, DEFAULT_SANDBOX_PIDS_LIMIT,
    DEFAULT_SANDBOX_TIMEOUT_MS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};
use crate::judge::languages::{LanguageRegistry, LanguageRuntime};
use crate::models::Language;

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sandbox: SandboxConfig,
    pub languages: LanguageRegistry,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
}

/// Database configuration
///
/// When `url` is unset the service runs against the in-memory store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub seed_demo_problems: bool,
}

/// Sandbox execution configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Wall-clock limit per run
    pub timeout_ms: u64,
    pub memory_limit_mb: u64,
    /// Fraction of a core, e.g. 0.5
    pub cpu_limit: f64,
    pub max_concurrency: usize,
    pub pids_limit: i64,
    /// Host directory for per-execution temp dirs
    pub work_dir: PathBuf,
    pub docker_socket: Option<String>,
    /// Pull every runtime image at startup
    pub pull_images: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            sandbox: SandboxConfig::from_env()?,
            languages: languages_from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
            seed_demo_problems: parse_var("SEED_DEMO_PROBLEMS", false)?,
        })
    }
}

impl SandboxConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            timeout_ms: parse_var("SANDBOX_TIMEOUT_MS", DEFAULT_SANDBOX_TIMEOUT_MS)?,
            memory_limit_mb: parse_var("SANDBOX_MEMORY_MB", DEFAULT_SANDBOX_MEMORY_MB)?,
            cpu_limit: parse_var("SANDBOX_CPUS", DEFAULT_SANDBOX_CPUS)?,
            max_concurrency: parse_var("SANDBOX_MAX_CONCURRENCY", DEFAULT_SANDBOX_MAX_CONCURRENCY)?,
            pids_limit: parse_var("SANDBOX_PIDS_LIMIT", DEFAULT_SANDBOX_PIDS_LIMIT)?,
            work_dir: env::var("SANDBOX_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            docker_socket: env::var("DOCKER_SOCKET").ok(),
            pull_images: parse_var("SANDBOX_PULL_IMAGES", false)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("SANDBOX_TIMEOUT_MS".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue("SANDBOX_MAX_CONCURRENCY".to_string()));
        }
        if !(self.cpu_limit > 0.0) {
            return Err(ConfigError::InvalidValue("SANDBOX_CPUS".to_string()));
        }
        Ok(())
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_SANDBOX_TIMEOUT_MS,
            memory_limit_mb: DEFAULT_SANDBOX_MEMORY_MB,
            cpu_limit: DEFAULT_SANDBOX_CPUS,
            max_concurrency: DEFAULT_SANDBOX_MAX_CONCURRENCY,
            pids_limit: DEFAULT_SANDBOX_PIDS_LIMIT,
            work_dir: env::temp_dir(),
            docker_socket: None,
            pull_images: false,
        }
    }
}

fn languages_from_env() -> Result<LanguageRegistry, ConfigError> {
    languages_from(|name| env::var(name).ok())
}

/// Build the runtime table, applying `SANDBOX_<LANG>_{IMAGE,EXTENSION,COMMAND}` overrides
fn languages_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LanguageRegistry, ConfigError> {
    let mut registry = LanguageRegistry::defaults();

    for language in Language::ALL {
        let prefix = format!("SANDBOX_{}", language.as_str().to_uppercase());
        let current = registry.runtime(language).clone();

        let runtime = LanguageRuntime {
            image: lookup(&format!("{prefix}_IMAGE")).unwrap_or(current.image),
            extension: lookup(&format!("{prefix}_EXTENSION")).unwrap_or(current.extension),
            command: lookup(&format!("{prefix}_COMMAND")).unwrap_or(current.command),
        };
        runtime.validate().map_err(|e| ConfigError::InvalidRuntime {
            variable: format!("{prefix}_{}", e.field()),
            reason: e.to_string(),
        })?;

        registry.set(language, runtime);
    }

    Ok(registry)
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),

    #[error("Invalid value for environment variable {variable}: {reason}")]
    InvalidRuntime { variable: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            json_logs: false,
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);

        let sandbox = SandboxConfig::default();
        assert_eq!(sandbox.memory_limit_mb, 256);
        assert_eq!(sandbox.cpu_limit, 0.5);
        assert!(sandbox.validate().is_ok());
    }

    #[test]
    fn test_sandbox_validation() {
        let zero_timeout = SandboxConfig {
            timeout_ms: 0,
            ..SandboxConfig::default()
        };
        assert!(zero_timeout.validate().is_err());

        let no_workers = SandboxConfig {
            max_concurrency: 0,
            ..SandboxConfig::default()
        };
        assert!(no_workers.validate().is_err());

        let no_cpu = SandboxConfig {
            cpu_limit: 0.0,
            ..SandboxConfig::default()
        };
        assert!(no_cpu.validate().is_err());
    }

    #[test]
    fn test_runtime_override_errors_name_the_variable() {
        let err = languages_from(|name| (name == "SANDBOX_JAVA_IMAGE").then(String::new))
            .unwrap_err();
        match err {
            ConfigError::InvalidRuntime { variable, reason } => {
                assert_eq!(variable, "SANDBOX_JAVA_IMAGE");
                assert_eq!(reason, "image must not be empty");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = languages_from(|name| {
            (name == "SANDBOX_PYTHON_COMMAND").then(|| "python3 main.py".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("SANDBOX_PYTHON_COMMAND"));
        assert!(err.to_string().contains("{file}"));
    }

    #[test]
    fn test_runtime_overrides_apply() {
        let registry = languages_from(|name| {
            (name == "SANDBOX_PYTHON_IMAGE").then(|| "python:3.12-slim".to_string())
        })
        .unwrap();
        assert_eq!(registry.runtime(Language::Python).image, "python:3.12-slim");
        assert_eq!(
            registry.runtime(Language::Java),
            LanguageRegistry::defaults().runtime(Language::Java)
        );
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("CODEGRADE_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
