//! A stand-in game server that drives Fake RCON from stdin.
//!
//! ```text
//! FAKERCON_SECRET=letmein cargo run -p console-host
//! 7 fake_rcon_password letmein
//! 7 fake_rcon sv_cheats 1
//! connect 8
//! reload
//! ```
//!
//! Each line is `<identity> <command> [args...]`, or one of the host events
//! `connect <identity>`, `disconnect <identity>`, `reload`. EOF unloads.

use std::path::PathBuf;

use fakercon::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

struct ConsoleHost {
    secret: Option<String>,
}

impl Host for ConsoleHost {
    fn command_param(&self, flag: &str) -> Option<String> {
        (flag == fakercon::SECRET_FLAG)
            .then(|| self.secret.clone())
            .flatten()
    }

    fn print_to_console(&self, caller: &Caller, line: &str) {
        println!("[console {}] {line}", caller.identity);
    }

    fn print_to_chat(&self, caller: &Caller, line: &str) {
        println!("[chat {}] {}", caller.identity, line.trim_start());
    }

    fn execute_command(&self, command: &str) {
        println!("[server] > {command}");
    }

    fn log_to_server_console(&self, line: &str) {
        println!("[server] {line}");
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

enum Input {
    Command {
        caller: Caller,
        name: String,
        args: Vec<String>,
    },
    Connect(Identity),
    Disconnect(Identity),
    Reload,
}

fn parse(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let first = words.next().ok_or("empty line")?;
    let identity = |word: Option<&str>| -> Result<Identity, String> {
        word.ok_or("missing identity")?
            .parse()
            .map_err(|e| format!("{e}"))
    };

    match first {
        "reload" => Ok(Input::Reload),
        "connect" => Ok(Input::Connect(identity(words.next())?)),
        "disconnect" => Ok(Input::Disconnect(identity(words.next())?)),
        _ => {
            let caller =
                Caller::from_raw(first, format!("player{first}")).map_err(|e| e.to_string())?;
            let name = words.next().ok_or("missing command")?.to_string();
            Ok(Input::Command {
                caller,
                name,
                args: words.map(str::to_string).collect(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fakercon::init_tracing();

    let data_dir = std::env::var_os("FAKERCON_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let host = ConsoleHost {
        secret: std::env::var("FAKERCON_SECRET").ok(),
    };

    let plugin = FakeRcon::load(host, PluginOptions::new(data_dir))?;
    for (name, description) in FakeRcon::<ConsoleHost>::commands() {
        eprintln!("registered {name:<24} {description}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse(&line) {
            Ok(Input::Command { caller, name, args }) => {
                let outcome = plugin.handle_command(Some(&caller), &name, &args).await;
                tracing::debug!(?outcome, "command handled");
            }
            Ok(Input::Connect(identity)) => plugin.on_client_connected(&identity),
            Ok(Input::Disconnect(identity)) => plugin.on_client_disconnect(&identity),
            Ok(Input::Reload) => {
                let loaded = plugin.reload_cache().await;
                eprintln!("reloaded {loaded} authorization(s)");
            }
            Err(e) => eprintln!("ignored line: {e}"),
        }
    }

    let metrics = plugin.unload().await?;
    eprintln!(
        "unloaded after {} sweep(s), {} record(s) purged",
        metrics.total_sweeps, metrics.total_removed
    );
    Ok(())
}
