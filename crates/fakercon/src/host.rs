//! The seam between the plugin and the game server it runs inside.
//!
//! Fake RCON doesn't talk to players or run console commands itself. The
//! host (the server's plugin runtime) does that, and the plugin reaches it
//! through the [`Host`] trait. Production code implements it over the real
//! server API; tests implement it with a recorder.

use fakercon_auth::Identity;

use crate::FakeRconError;

/// A connected client invoking a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The client's persistent account identity.
    pub identity: Identity,
    /// Display name, used only for the audit line.
    pub name: String,
}

impl Caller {
    /// Creates a caller.
    pub fn new(identity: Identity, name: impl Into<String>) -> Self {
        Self {
            identity,
            name: name.into(),
        }
    }

    /// Creates a caller from the identity string the host reports.
    ///
    /// # Errors
    /// Returns [`FakeRconError::Auth`] if `raw` is not a usable identity.
    pub fn from_raw(raw: &str, name: impl Into<String>) -> Result<Self, FakeRconError> {
        Ok(Self::new(Identity::new(raw)?, name))
    }
}

/// Services the host process provides to the plugin.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the host is shared between command
/// handlers and the background sweep task for the plugin's whole lifetime.
/// Methods are synchronous: the host API is a set of plain function calls
/// into the server.
pub trait Host: Send + Sync + 'static {
    /// Looks up a launch parameter such as `-fakercon`.
    ///
    /// Returns `None` if the flag was not passed.
    fn command_param(&self, flag: &str) -> Option<String>;

    /// Prints a line to the caller's developer console.
    fn print_to_console(&self, caller: &Caller, line: &str);

    /// Prints a line to the caller's chat.
    fn print_to_chat(&self, caller: &Caller, line: &str);

    /// Runs a command on the server console, as if typed there.
    fn execute_command(&self, command: &str);

    /// Writes a line to the server's own console output.
    fn log_to_server_console(&self, line: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_accepts_account_number() {
        let caller = Caller::from_raw("76561198000000001", "alice").unwrap();
        assert_eq!(caller.identity, Identity::from(76561198000000001));
        assert_eq!(caller.name, "alice");
    }

    #[test]
    fn test_from_raw_rejects_unstorable_identity() {
        for raw in ["", "a=b", " 7", "7\n"] {
            let err = Caller::from_raw(raw, "mallory").unwrap_err();
            assert!(matches!(err, FakeRconError::Auth(_)), "{raw:?}");
        }
    }
}
