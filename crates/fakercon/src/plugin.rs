//! Plugin lifecycle: what the host calls on load, connect, disconnect,
//! command dispatch, and unload.

use std::sync::Arc;

use fakercon_auth::{AuthCache, Clock, Identity, SystemClock};
use fakercon_store::CacheFile;
use fakercon_sweep::{SweepHandle, SweepMetrics};

use crate::{
    Caller, Command, CommandOutcome, ConfigError, FakeRconError, Gateway, Host, PluginConfig,
    PluginOptions, PluginPaths, Secret,
};

/// Name reported to the host's plugin listing.
pub const MODULE_NAME: &str = "Fake RCON";
/// Plugin version.
pub const MODULE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Plugin author line.
pub const MODULE_AUTHOR: &str = "fakercon contributors";
/// One-line description.
pub const MODULE_DESCRIPTION: &str = "Like the real RCON but it's not the real RCON";

/// A loaded Fake RCON plugin.
///
/// ```text
/// load() ──→ [running: commands + sweep every minute] ──→ unload()
///               ↑                    │
///               └── reload_cache() ──┘
/// ```
pub struct FakeRcon<H: Host, C: Clock = SystemClock> {
    gateway: Gateway<H, C>,
    sweeper: SweepHandle,
    paths: PluginPaths,
    config: Option<PluginConfig>,
}

impl<H: Host> FakeRcon<H, SystemClock> {
    /// Loads the plugin using the system clock.
    ///
    /// See [`load_with_clock`](Self::load_with_clock).
    pub fn load(host: H, options: PluginOptions) -> Result<Self, FakeRconError> {
        Self::load_with_clock(host, SystemClock, options)
    }
}

impl<H: Host, C: Clock> FakeRcon<H, C> {
    /// Loads the plugin:
    ///
    /// 1. Creates the plugin directory, `config.json`, and `cache.ini` if
    ///    missing
    /// 2. Resolves the shared secret (fails closed if unset)
    /// 3. Loads still-valid authorizations from `cache.ini`
    /// 4. Starts the background sweep
    ///
    /// # Errors
    /// Returns an error if the plugin directory, config file, or cache file
    /// cannot be created. A config file that exists but doesn't parse is
    /// logged and treated as absent.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime (the sweep is a Tokio task).
    pub fn load_with_clock(
        host: H,
        clock: C,
        options: PluginOptions,
    ) -> Result<Self, FakeRconError> {
        let paths = options.paths();

        let config = match PluginConfig::load_or_create(&paths.config) {
            Ok(config) => Some(config),
            Err(e @ ConfigError::Parse { .. }) => {
                tracing::warn!(error = %e, "ignoring unreadable config");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let store = CacheFile::open(&paths.cache)?;
        let secret = Secret::resolve(options.secret_source, &host, config.as_ref());

        let mut cache = AuthCache::new(options.auth.clone());
        match store.load(clock.now(), cache.config().expiry_delta()) {
            Ok(records) => cache.replace_all(records),
            Err(e) => {
                tracing::warn!(error = %e, "could not read authorization cache, starting empty")
            }
        }
        let loaded = cache.len();

        let gateway = Gateway::new(Arc::new(host), Arc::new(clock), secret, cache, store);

        let sweep_gateway = gateway.clone();
        let sweeper = fakercon_sweep::spawn(options.sweep.clone(), move || {
            let gateway = sweep_gateway.clone();
            async move { gateway.sweep().await }
        });

        tracing::info!(
            version = MODULE_VERSION,
            dir = %paths.dir.display(),
            loaded,
            "{MODULE_NAME} loaded"
        );

        Ok(Self {
            gateway,
            sweeper,
            paths,
            config,
        })
    }

    /// Names and descriptions to register with the host's command dispatch.
    pub fn commands() -> impl Iterator<Item = (&'static str, &'static str)> {
        Command::ALL.into_iter().map(|c| (c.name(), c.description()))
    }

    /// Dispatches a command by console name.
    ///
    /// Unknown names are ignored.
    pub async fn handle_command(
        &self,
        caller: Option<&Caller>,
        name: &str,
        args: &[String],
    ) -> CommandOutcome {
        match Command::from_name(name) {
            Some(command) => self.gateway.handle(caller, command, args).await,
            None => CommandOutcome::Ignored,
        }
    }

    /// Host hot-reload hook: re-reads the cache file.
    pub async fn reload_cache(&self) -> usize {
        self.gateway.reload().await
    }

    /// Client-connect hook.
    ///
    /// Deliberately leaves the cache alone: only a correct password creates
    /// an authorization.
    pub fn on_client_connected(&self, identity: &Identity) {
        tracing::debug!(%identity, "client connected");
    }

    /// Client-disconnect hook. Authorization stays until it expires.
    pub fn on_client_disconnect(&self, identity: &Identity) {
        tracing::debug!(%identity, "client disconnected, authorization kept until expiry");
    }

    /// Read-only authorization check for `identity`.
    pub async fn is_authorized(&self, identity: &Identity) -> bool {
        self.gateway.is_authorized(identity).await
    }

    /// The gateway, for hosts that dispatch typed [`Command`]s directly.
    pub fn gateway(&self) -> &Gateway<H, C> {
        &self.gateway
    }

    /// File locations in use.
    pub fn paths(&self) -> &PluginPaths {
        &self.paths
    }

    /// The parsed `config.json`, if it was readable.
    pub fn config(&self) -> Option<&PluginConfig> {
        self.config.as_ref()
    }

    /// Unloads the plugin: stops the sweep, then saves the cache one last
    /// time.
    ///
    /// # Errors
    /// Returns [`FakeRconError::Store`] if the final save fails; the sweep
    /// is stopped either way.
    pub async fn unload(self) -> Result<SweepMetrics, FakeRconError> {
        let metrics = self.sweeper.stop().await;
        self.gateway.flush().await?;
        tracing::info!(
            sweeps = metrics.total_sweeps,
            purged = metrics.total_removed,
            "{MODULE_NAME} unloaded"
        );
        Ok(metrics)
    }
}
