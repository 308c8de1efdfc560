use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use taskboard_core::config::Config;
use taskboard_core::core_board::storage::{migrations, BoardSqlStore};
use taskboard_core::core_board::token::{decode_unverified, generate_seed, InviteTokenSigner};
use taskboard_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about = "Operator tools for the task board service", long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Configuration file. Environment variables are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an invite signing key for `invites.signing_key`
    GenKey,

    /// Print the claims of an invite token without checking its signature
    InspectToken {
        token: String,
    },

    /// Check an invite token's signature and embedded expiry
    VerifyToken {
        token: String,

        /// Hex seed to verify with instead of the configured key
        #[arg(long)]
        key: Option<String>,
    },

    /// Create or upgrade the board database
    Migrate {
        /// Database file instead of the configured one
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(Config::from_env()?),
    }
}

fn run(command: Command, config_path: Option<&PathBuf>) -> Result<String> {
    match command {
        Command::GenKey => {
            let seed = generate_seed();
            let signer = InviteTokenSigner::from_seed(&seed, Config::default().invites.token_ttl);
            Ok(serde_json::to_string_pretty(&json!({
                "signing_key": hex::encode(seed),
                "verifying_key": signer.verifying_key_hex(),
            }))?)
        }
        Command::InspectToken { token } => {
            let claims = decode_unverified(&token).context("token is not well formed")?;
            Ok(serde_json::to_string_pretty(&claims)?)
        }
        Command::VerifyToken { token, key } => {
            let config = load_config(config_path)?;
            let seed = match key.or(config.invites.signing_key) {
                Some(seed) => seed,
                None => bail!("no signing key: pass --key or set invites.signing_key"),
            };
            let signer = InviteTokenSigner::from_hex_seed(&seed, config.invites.token_ttl)?;
            let claims = signer.verify(&token)?;
            Ok(serde_json::to_string_pretty(&claims)?)
        }
        Command::Migrate { database } => {
            let mut config = load_config(config_path)?;
            if let Some(database) = database {
                config.store.database_path = database;
            }
            if let Some(parent) = config.store.database_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            debug!(database = %config.store.database_path.display(), "running migrations");
            BoardSqlStore::open(&config.store).context("migrating board store")?;
            Ok(format!(
                "{} is at schema version {}",
                config.store.database_path.display(),
                migrations::get_latest_version()
            ))
        }
        Command::DefaultConfig => Ok(Config::default().to_toml()?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = LogLevel::parse(&args.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'warn'", args.log_level);
        LogLevel::Warn
    });
    init_logging_with_config(LogConfig::new(log_level).json_format(args.json_logs))?;

    info!(command = ?args.command, "taskboard CLI started");
    let output = run(args.command, args.config.as_ref())?;
    println!("{}", output);

    Ok(())
}
