//! `askmate` — command-line shell over the AskMate store.
//!
//! Reads `askmate.toml` (or the path given with `--config`) layered with
//! `ASKMATE_*` environment variables, opens the SQLite store, and runs one
//! command.
//!
//! # Usage
//!
//! ```
//! askmate register ada ada@example.com Ada Lovelace < password.txt
//! askmate ask "How do lifetimes work?" "The borrow checker rejects..." --tag rust
//! askmate list --sort votes --order desc
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use askmate_store_sqlite::SqliteStore;
use clap::Parser;
use commands::Command;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askmate", version, about = "AskMate Q&A forum")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "askmate.toml")]
  config: PathBuf,

  /// Database file; overrides `store_path` from the configuration.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

/// Shape of the configuration file.
#[derive(Debug, Deserialize)]
struct CliConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("askmate.db") }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so command output on stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ASKMATE"))
    .build()
    .context("failed to read config file")?;

  let cli_cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(&cli_cfg.store_path));

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  commands::run(&store, cli.command).await
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expand_tilde_leaves_plain_paths() {
    assert_eq!(expand_tilde(Path::new("data/askmate.db")), PathBuf::from("data/askmate.db"));
  }

  #[test]
  fn cli_parses_vote_command() {
    let cli = Cli::try_parse_from(["askmate", "vote", "question", "3", "up", "--retract"]);
    assert!(cli.is_ok());
  }

  #[test]
  fn cli_rejects_unknown_sort_field() {
    let cli = Cli::try_parse_from(["askmate", "list", "--sort", "popularity"]);
    assert!(cli.is_err());
  }
}
