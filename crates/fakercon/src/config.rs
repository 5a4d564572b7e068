//! Plugin configuration: file locations, `config.json`, and the shared secret.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use fakercon_auth::AuthConfig;
use fakercon_sweep::SweepConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Host};

/// Launch parameter that carries the shared secret.
pub const SECRET_FLAG: &str = "-fakercon";

/// Value reported for a missing secret. Never accepted as a password.
pub const UNKNOWN_SECRET: &str = "unknown";

/// Placeholder written into a fresh `config.json`. Never accepted either.
pub const DEFAULT_CONFIG_PASSWORD: &str = "changeme";

// ---------------------------------------------------------------------------
// PluginPaths
// ---------------------------------------------------------------------------

/// Where the plugin keeps its files, relative to the host's data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginPaths {
    /// `<data_dir>/configs/plugins/fakercon`
    pub dir: PathBuf,
    /// `<dir>/config.json`
    pub config: PathBuf,
    /// `<dir>/cache.ini`
    pub cache: PathBuf,
}

impl PluginPaths {
    /// Derives all paths from the host's data directory.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir
            .as_ref()
            .join("configs")
            .join("plugins")
            .join("fakercon");
        Self {
            config: dir.join("config.json"),
            cache: dir.join("cache.ini"),
            dir,
        }
    }
}

// ---------------------------------------------------------------------------
// PluginConfig
// ---------------------------------------------------------------------------

/// Contents of `config.json`.
///
/// ```json
/// { "RconPassword": "changeme" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Alternate secret, used only with [`SecretSource::ConfigFile`].
    #[serde(rename = "RconPassword")]
    pub rcon_password: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            rcon_password: DEFAULT_CONFIG_PASSWORD.to_string(),
        }
    }
}

impl PluginConfig {
    /// Reads `path`, writing the default config there first if it is absent.
    ///
    /// # Errors
    /// - [`ConfigError::Io`]: the directory or file can't be created or read
    /// - [`ConfigError::Parse`]: the file isn't a valid config document
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if !path.exists() {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(io_err)?;
            }
            let default = serde_json::to_string_pretty(&Self::default())
                .map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            fs::write(path, default).map_err(io_err)?;
            tracing::info!(path = %path.display(), "wrote default config");
        }

        let text = fs::read_to_string(path).map_err(io_err)?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// Where the shared secret comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretSource {
    /// The `-fakercon` launch parameter.
    #[default]
    StartupParam,
    /// The `RconPassword` field of `config.json`.
    ConfigFile,
}

/// The shared secret clients must submit.
///
/// An unset secret fails closed: every submission is rejected, including
/// the literal sentinel and placeholder strings.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// A usable secret.
    Configured(String),
    /// Missing, empty, or a sentinel/placeholder value.
    Unset,
}

/// Result of comparing a submission against the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretCheck {
    /// The submission equals the configured secret.
    Match,
    /// A secret is configured and the submission differs.
    Mismatch,
    /// No secret is configured; nothing can match.
    Unset,
}

impl Secret {
    /// Builds a secret from a raw value.
    ///
    /// `None`, the empty string and [`UNKNOWN_SECRET`] all mean
    /// "not configured".
    pub fn from_value(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() && v != UNKNOWN_SECRET => Self::Configured(v),
            _ => Self::Unset,
        }
    }

    /// Resolves the secret from the configured source.
    pub fn resolve(
        source: SecretSource,
        host: &impl Host,
        config: Option<&PluginConfig>,
    ) -> Self {
        let secret = match source {
            SecretSource::StartupParam => Self::from_value(host.command_param(SECRET_FLAG)),
            // The placeholder from a freshly written config never unlocks.
            SecretSource::ConfigFile => Self::from_value(
                config
                    .map(|c| c.rcon_password.clone())
                    .filter(|p| p != DEFAULT_CONFIG_PASSWORD),
            ),
        };
        if !secret.is_configured() {
            tracing::warn!(?source, "no RCON password configured, all logins will be rejected");
        }
        secret
    }

    /// Returns `true` if logins can succeed.
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Compares a submitted password.
    pub fn check(&self, candidate: &str) -> SecretCheck {
        match self {
            Self::Configured(secret) if secret == candidate => SecretCheck::Match,
            Self::Configured(_) => SecretCheck::Mismatch,
            Self::Unset => SecretCheck::Unset,
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(_) => f.write_str("Secret::Configured(<redacted>)"),
            Self::Unset => f.write_str("Secret::Unset"),
        }
    }
}

// ---------------------------------------------------------------------------
// PluginOptions
// ---------------------------------------------------------------------------

/// Everything [`FakeRcon::load`](crate::FakeRcon::load) needs from the host.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// The host's data directory; plugin files go under
    /// [`PluginPaths::under`] this.
    pub data_dir: PathBuf,
    /// Which secret to trust.
    pub secret_source: SecretSource,
    /// Expiry policy.
    pub auth: AuthConfig,
    /// Sweep cadence.
    pub sweep: SweepConfig,
}

impl PluginOptions {
    /// Default options rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            secret_source: SecretSource::default(),
            auth: AuthConfig::default(),
            sweep: SweepConfig::default(),
        }
    }

    /// Uses `source` for the shared secret.
    pub fn secret_source(mut self, source: SecretSource) -> Self {
        self.secret_source = source;
        self
    }

    /// Overrides the expiry policy.
    pub fn auth_config(mut self, config: AuthConfig) -> Self {
        self.auth = config;
        self
    }

    /// Overrides the sweep cadence.
    pub fn sweep_config(mut self, config: SweepConfig) -> Self {
        self.sweep = config;
        self
    }

    /// File locations derived from `data_dir`.
    pub fn paths(&self) -> PluginPaths {
        PluginPaths::under(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_under_data_dir() {
        let paths = PluginPaths::under("/srv/game");
        assert_eq!(paths.dir, PathBuf::from("/srv/game/configs/plugins/fakercon"));
        assert_eq!(paths.config, paths.dir.join("config.json"));
        assert_eq!(paths.cache, paths.dir.join("cache.ini"));
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = PluginPaths::under(dir.path()).config;

        let config = PluginConfig::load_or_create(&path).unwrap();

        assert_eq!(config, PluginConfig::default());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"RconPassword\": \"changeme\""));
    }

    #[test]
    fn test_load_or_create_reads_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "RconPassword": "hunter2" }"#).unwrap();

        let config = PluginConfig::load_or_create(&path).unwrap();

        assert_eq!(config.rcon_password, "hunter2");
    }

    #[test]
    fn test_load_or_create_rejects_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();

        let err = PluginConfig::load_or_create(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_secret_from_value_fails_closed() {
        assert_eq!(Secret::from_value(None), Secret::Unset);
        assert_eq!(Secret::from_value(Some(String::new())), Secret::Unset);
        assert_eq!(Secret::from_value(Some("unknown".into())), Secret::Unset);
        assert!(Secret::from_value(Some("letmein".into())).is_configured());
    }

    struct ParamHost(Option<&'static str>);

    impl Host for ParamHost {
        fn command_param(&self, flag: &str) -> Option<String> {
            assert_eq!(flag, SECRET_FLAG);
            self.0.map(str::to_string)
        }
        fn print_to_console(&self, _: &crate::Caller, _: &str) {}
        fn print_to_chat(&self, _: &crate::Caller, _: &str) {}
        fn execute_command(&self, _: &str) {}
        fn log_to_server_console(&self, _: &str) {}
    }

    #[test]
    fn test_resolve_startup_param() {
        let secret = Secret::resolve(SecretSource::StartupParam, &ParamHost(Some("letmein")), None);
        assert_eq!(secret, Secret::Configured("letmein".into()));

        let secret = Secret::resolve(SecretSource::StartupParam, &ParamHost(None), None);
        assert_eq!(secret, Secret::Unset);
    }

    #[test]
    fn test_resolve_config_file_rejects_placeholder() {
        let host = ParamHost(Some("ignored"));
        let placeholder = PluginConfig::default();
        let real = PluginConfig {
            rcon_password: "hunter2".into(),
        };

        assert_eq!(
            Secret::resolve(SecretSource::ConfigFile, &host, Some(&placeholder)),
            Secret::Unset
        );
        assert_eq!(
            Secret::resolve(SecretSource::ConfigFile, &host, None),
            Secret::Unset
        );
        assert_eq!(
            Secret::resolve(SecretSource::ConfigFile, &host, Some(&real)),
            Secret::Configured("hunter2".into())
        );
    }

    #[test]
    fn test_secret_check() {
        let secret = Secret::Configured("letmein".into());
        assert_eq!(secret.check("letmein"), SecretCheck::Match);
        assert_eq!(secret.check("LETMEIN"), SecretCheck::Mismatch);
        assert_eq!(Secret::Unset.check("unknown"), SecretCheck::Unset);
        assert_eq!(Secret::Unset.check(""), SecretCheck::Unset);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::Configured("letmein".into());
        assert!(!format!("{secret:?}").contains("letmein"));
    }
}
