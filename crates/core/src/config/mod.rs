//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELLCACHE_*)
/// 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// App name, used as the namespace prefix.
    ///
    /// Set via SHELLCACHE_APP_NAME environment variable.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Cache version; bumping it supersedes every older namespace.
    ///
    /// Set via SHELLCACHE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Origin the app shell is served from.
    ///
    /// Set via SHELLCACHE_ORIGIN environment variable. Manifest paths are
    /// resolved against it, and only responses from it are ever persisted.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SHELLCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SHELLCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SHELLCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    ///
    /// Set via SHELLCACHE_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Root-relative paths of the app shell, pre-cached on install.
    ///
    /// Set via SHELLCACHE_SHELL_ASSETS environment variable as a TOML
    /// array, e.g. `["/", "/index.html"]`. Must be kept in sync with what
    /// the build produces.
    #[serde(default = "default_shell_assets")]
    pub shell_assets: Vec<String>,

    /// Optional root-relative path served when the network fails and the
    /// requested resource is not cached.
    ///
    /// Set via SHELLCACHE_FALLBACK_PATH environment variable. Disabled by
    /// default.
    #[serde(default)]
    pub fallback_path: Option<String>,
}

fn default_app_name() -> String {
    "shellcache".into()
}

fn default_cache_version() -> u32 {
    2
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_shell_assets() -> Vec<String> {
    vec![
        "/".into(),
        "/index.html".into(),
        "/manifest.json".into(),
        "/icons/icon-192.png".into(),
        "/icons/icon-512.png".into(),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            cache_version: default_cache_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            shell_assets: default_shell_assets(),
            fallback_path: None,
        }
    }
}

impl AppConfig {
    /// The current namespace name, e.g. `"shellcache-cache-v2"`.
    pub fn namespace(&self) -> String {
        format!("{}-cache-v{}", self.app_name, self.cache_version)
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELLCACHE_`
    /// 2. TOML file from `SHELLCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "shellcache");
        assert_eq!(config.cache_version, 2);
        assert_eq!(config.origin, "http://localhost:8080");
        assert_eq!(config.db_path, PathBuf::from("./shellcache.sqlite"));
        assert_eq!(config.user_agent, "shellcache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.shell_assets.len(), 5);
        assert!(config.fallback_path.is_none());
    }

    #[test]
    fn test_namespace_name() {
        let config = AppConfig::default();
        assert_eq!(config.namespace(), "shellcache-cache-v2");

        let config = AppConfig { app_name: "tracker".into(), cache_version: 7, ..Default::default() };
        assert_eq!(config.namespace(), "tracker-cache-v7");
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_shell_assets_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SHELLCACHE_SHELL_ASSETS", r#"["/", "/app.js"]"#);
            let config = AppConfig::load().unwrap();
            assert_eq!(config.shell_assets, vec!["/", "/app.js"]);
            Ok(())
        });
    }

    #[test]
    fn test_load_scalar_overrides_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SHELLCACHE_APP_NAME", "tracker");
            jail.set_env("SHELLCACHE_CACHE_VERSION", "3");
            let config = AppConfig::load().unwrap();
            assert_eq!(config.namespace(), "tracker-cache-v3");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SHELLCACHE_SHELL_ASSETS", r#"["relative.html"]"#);
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
