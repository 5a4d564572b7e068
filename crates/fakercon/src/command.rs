//! The command surface registered with the host, and what each call did.

use std::fmt;

/// Prefix for chat lines: grey `[RCON]` tag, then default colour.
pub const CHAT_PREFIX: &str = " \x08[RCON]\x01 ";

/// The console commands this plugin registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `fake_rcon <command...>`: forward a command to the server console.
    Rcon,
    /// `fake_rcon_password <password>`: authenticate.
    Password,
    /// `fake_rcon_cache_clean`: log out everyone except the caller.
    CacheClean,
}

impl Command {
    /// Every command, in registration order.
    pub const ALL: [Command; 3] = [Command::Rcon, Command::Password, Command::CacheClean];

    /// The console name the host dispatches on.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rcon => "fake_rcon",
            Self::Password => "fake_rcon_password",
            Self::CacheClean => "fake_rcon_cache_clean",
        }
    }

    /// Help text shown by the host's command listing.
    pub fn description(self) -> &'static str {
        match self {
            Self::Rcon => "Execute fake RCON command",
            Self::Password => "Authenticate for fake RCON",
            Self::CacheClean => "Clean fake RCON authentication cache",
        }
    }

    /// Looks a command up by its console name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a command was turned down.
///
/// These are ordinary outcomes reported to the caller, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The server has no usable secret, so nobody can log in.
    SecretNotConfigured,
    /// The submitted password did not match.
    BadPassword,
    /// The caller has no valid authorization (never had one, or it expired).
    NotAuthenticated,
    /// `fake_rcon` was called without a command to forward.
    NoCommand,
}

impl Rejection {
    /// The line printed to the caller's console.
    pub fn console_message(self) -> &'static str {
        match self {
            Self::SecretNotConfigured => "Bad rcon_password. Try again",
            Self::BadPassword => "Bad rcon_password.",
            Self::NotAuthenticated => "You have not been authenticated.",
            Self::NoCommand => "No command specified.",
        }
    }

    /// The short chat summary, if this rejection is announced in chat.
    ///
    /// A wrong password stays console-only.
    pub fn chat_message(self) -> Option<&'static str> {
        match self {
            Self::SecretNotConfigured => Some("Bad rcon_password. Try again"),
            Self::BadPassword => None,
            Self::NotAuthenticated => Some("You are not logged in"),
            Self::NoCommand => Some("No command"),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.console_message())
    }
}

/// What handling a command invocation resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Not a client invocation (e.g. typed on the server console), or not
    /// one of our commands. Nothing happened.
    Ignored,
    /// A required argument was missing; usage was printed.
    Usage,
    /// The caller submitted the correct password and is now authorized.
    Authenticated,
    /// The command string handed to the host's executor.
    Forwarded(String),
    /// Every other identity was logged out; `removed` records were dropped.
    CacheCleared { removed: usize },
    /// The request was turned down.
    Rejected(Rejection),
}
