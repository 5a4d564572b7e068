//! Command gateway: password checks, privileged forwarding, cache clearing.
//!
//! Each invocation runs in three steps:
//!   1. Validate the caller and arguments
//!   2. Under the cache lock: check/mutate the cache and persist it
//!   3. After the lock is released: print responses, forward the command
//!
//! The cache and its file sit behind ONE mutex, shared with the sweep task.
//! Any check that may evict, every mutation, and the save that follows it
//! happen inside a single critical section.

use std::sync::Arc;

use fakercon_auth::{AuthCache, AuthState, Clock, Identity};
use fakercon_store::{CacheFile, StoreError};
use tokio::sync::Mutex;

use crate::command::CHAT_PREFIX;
use crate::{Caller, Command, CommandOutcome, Host, Rejection, Secret, SecretCheck};

/// The cache together with the file that mirrors it.
///
/// Saves are blocking `std::fs` writes made while the async lock is held.
pub(crate) struct CacheState {
    pub(crate) cache: AuthCache,
    pub(crate) store: CacheFile,
}

impl CacheState {
    /// Writes the whole cache to disk.
    pub(crate) fn save(&self) -> Result<(), StoreError> {
        self.store.save(&self.cache.snapshot())
    }

    /// Writes the whole cache to disk, logging instead of failing.
    ///
    /// Losing the cache file only means clients log in again, so a failed
    /// save after a command must not take the host down.
    pub(crate) fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "failed to save authorization cache");
        }
    }
}

/// Mediates every password check and privileged command.
///
/// Cheap to clone: all state is behind `Arc`s, so the sweep task holds its
/// own clone.
pub struct Gateway<H: Host, C: Clock> {
    state: Arc<Mutex<CacheState>>,
    host: Arc<H>,
    clock: Arc<C>,
    secret: Arc<Secret>,
}

impl<H: Host, C: Clock> Clone for Gateway<H, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            host: Arc::clone(&self.host),
            clock: Arc::clone(&self.clock),
            secret: Arc::clone(&self.secret),
        }
    }
}

impl<H: Host, C: Clock> Gateway<H, C> {
    /// Creates a gateway over an already-populated cache.
    pub fn new(
        host: Arc<H>,
        clock: Arc<C>,
        secret: Secret,
        cache: AuthCache,
        store: CacheFile,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState { cache, store })),
            host,
            clock,
            secret: Arc::new(secret),
        }
    }

    /// The host this gateway prints to and forwards commands to.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The clock used for every expiry decision.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Dispatches one command invocation.
    ///
    /// `caller` is `None` when the command came from the server console
    /// rather than a client; such calls are ignored. `args` excludes the
    /// command name.
    pub async fn handle(
        &self,
        caller: Option<&Caller>,
        command: Command,
        args: &[String],
    ) -> CommandOutcome {
        let Some(caller) = caller else {
            tracing::debug!(%command, "ignoring command without a client caller");
            return CommandOutcome::Ignored;
        };

        match command {
            Command::Password => self.password(caller, args).await,
            Command::Rcon => self.rcon(caller, args).await,
            Command::CacheClean => self.cache_clean(caller).await,
        }
    }

    /// `fake_rcon_password <password>`
    async fn password(&self, caller: &Caller, args: &[String]) -> CommandOutcome {
        let Some(password) = args.first() else {
            self.host.print_to_console(caller, "Usage: fake_rcon_password <rconpass>");
            return CommandOutcome::Usage;
        };

        let identity = &caller.identity;
        match self.secret.check(password) {
            SecretCheck::Unset => {
                tracing::warn!(%identity, "login attempt while no RCON password is configured");
                self.reject(caller, Rejection::SecretNotConfigured)
            }
            SecretCheck::Match => {
                {
                    let mut state = self.state.lock().await;
                    state.cache.authorize(identity.clone(), self.clock.now());
                    state.persist();
                }
                self.host.print_to_console(caller, "RCON admin authentication successful.");
                self.host.print_to_console(caller, "Privileges granted.");
                self.chat(caller, "Authentication successful");
                CommandOutcome::Authenticated
            }
            SecretCheck::Mismatch => {
                {
                    let mut state = self.state.lock().await;
                    state.cache.revoke(identity);
                    state.persist();
                }
                tracing::info!(%identity, "bad RCON password");
                self.reject(caller, Rejection::BadPassword)
            }
        }
    }

    /// `fake_rcon <command...>`
    async fn rcon(&self, caller: &Caller, args: &[String]) -> CommandOutcome {
        if !self.check_and_evict(&caller.identity).await.is_authorized() {
            return self.reject(caller, Rejection::NotAuthenticated);
        }

        if args.is_empty() {
            return self.reject(caller, Rejection::NoCommand);
        }

        let command = args.join(" ");
        tracing::info!(identity = %caller.identity, %command, "forwarding RCON command");
        self.host.execute_command(&command);
        CommandOutcome::Forwarded(command)
    }

    /// `fake_rcon_cache_clean`
    async fn cache_clean(&self, caller: &Caller) -> CommandOutcome {
        let identity = &caller.identity;
        let removed = {
            let mut state = self.state.lock().await;
            let had_record = state.cache.get(identity).is_some();
            if !state.cache.check(identity, self.clock.now()).is_authorized() {
                if had_record {
                    state.persist();
                }
                drop(state);
                return self.reject(caller, Rejection::NotAuthenticated);
            }
            let removed = state.cache.clear_except(identity);
            state.persist();
            removed
        };

        self.host.print_to_console(caller, "Fake RCON authentication cache has been cleared.");
        self.host.print_to_console(caller, "All other users must re-authenticate.");
        self.chat(caller, "Authentication cache cleared");
        tracing::info!(%identity, name = %caller.name, removed, "authorization cache cleared");
        self.host.log_to_server_console(&format!(
            "Fake RCON cache cleared by {} ({})",
            caller.name, identity
        ));

        CommandOutcome::CacheCleared { removed }
    }

    /// Checks `identity`, evicting and persisting a stale record in the same
    /// critical section.
    async fn check_and_evict(&self, identity: &Identity) -> AuthState {
        let mut state = self.state.lock().await;
        let had_record = state.cache.get(identity).is_some();
        let auth = state.cache.check(identity, self.clock.now());
        if !auth.is_authorized() && had_record {
            state.persist();
        }
        auth
    }

    /// Read-only authorization check; never evicts.
    pub async fn is_authorized(&self, identity: &Identity) -> bool {
        self.state
            .lock()
            .await
            .cache
            .is_authorized(identity, self.clock.now())
    }

    /// Purges expired records and saves if anything was removed.
    ///
    /// Returns the number of records removed. This is the sweep task's body.
    pub async fn sweep(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.cache.purge_expired(self.clock.now());
        if removed > 0 {
            state.persist();
        }
        removed
    }

    /// Replaces the in-memory cache with the still-valid records on disk.
    ///
    /// Returns how many records were loaded. A read failure leaves the cache
    /// empty and is logged.
    pub async fn reload(&self) -> usize {
        let mut state = self.state.lock().await;
        let expiry = state.cache.config().expiry_delta();
        let records = match state.store.load(self.clock.now(), expiry) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "could not read authorization cache, starting empty");
                Vec::new()
            }
        };
        state.cache.replace_all(records);
        let loaded = state.cache.len();
        tracing::info!(loaded, "authorization cache loaded");
        loaded
    }

    /// Saves the cache, returning any I/O failure to the caller.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.state.lock().await.save()
    }

    /// Number of records currently held (valid or not yet swept).
    pub async fn cached_identities(&self) -> usize {
        self.state.lock().await.cache.len()
    }

    fn reject(&self, caller: &Caller, rejection: Rejection) -> CommandOutcome {
        self.host.print_to_console(caller, rejection.console_message());
        if let Some(line) = rejection.chat_message() {
            self.chat(caller, line);
        }
        CommandOutcome::Rejected(rejection)
    }

    fn chat(&self, caller: &Caller, line: &str) {
        self.host.print_to_chat(caller, &format!("{CHAT_PREFIX}{line}"));
    }
}
