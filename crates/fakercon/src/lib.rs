//! # Fake RCON
//!
//! Password-gated remote console for game servers that don't expose a real
//! one. A client submits a shared secret; on a match its identity is
//! authorized for two hours, during which it may forward commands to the
//! server console.
//!
//! ## Layers
//!
//! ```text
//! Host (game server) ── Host trait ──→ FakeRcon (lifecycle)
//!                                         │
//!                                         ├── Gateway ──→ AuthCache (fakercon-auth)
//!                                         │       └─────→ CacheFile (fakercon-store)
//!                                         └── sweep task (fakercon-sweep)
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use fakercon::prelude::*;
//!
//! let plugin = FakeRcon::load(my_host, PluginOptions::new("/srv/game"))?;
//! for (name, description) in FakeRcon::<MyHost>::commands() {
//!     // register `name` with the host's command dispatch
//! }
//! // on every dispatched command:
//! plugin.handle_command(Some(&caller), "fake_rcon", &args).await;
//! // at shutdown:
//! plugin.unload().await?;
//! ```

mod command;
mod config;
mod error;
mod gateway;
mod host;
mod logging;
mod plugin;

pub use command::{CHAT_PREFIX, Command, CommandOutcome, Rejection};
pub use config::{
    DEFAULT_CONFIG_PASSWORD, PluginConfig, PluginOptions, PluginPaths, SECRET_FLAG, Secret,
    SecretCheck, SecretSource, UNKNOWN_SECRET,
};
pub use error::{ConfigError, FakeRconError};
pub use gateway::Gateway;
pub use host::{Caller, Host};
pub use logging::init_tracing;
pub use plugin::{FakeRcon, MODULE_AUTHOR, MODULE_DESCRIPTION, MODULE_NAME, MODULE_VERSION};

pub use fakercon_auth as auth;
pub use fakercon_store as store;
pub use fakercon_sweep as sweep;

/// Everything a host integration usually needs.
pub mod prelude {
    pub use crate::{
        Caller, Command, CommandOutcome, FakeRcon, FakeRconError, Host, PluginOptions, Rejection,
        SecretSource,
    };
    pub use fakercon_auth::{AuthConfig, Clock, Identity, ManualClock, SystemClock};
    pub use fakercon_sweep::SweepConfig;
}
