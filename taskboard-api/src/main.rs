use anyhow::Result;
use taskboard_core::config::Config;
use taskboard_core::logging::{init_logging_with_config, LogConfig};
use tracing::info;

/// Optional path to a TOML configuration file
const CONFIG_PATH_VAR: &str = "TASKBOARD_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::from_env()?,
    };

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;
    taskboard_core::metrics::init_metrics();

    info!(database = %config.store.database_path.display(), "starting task board API");
    taskboard_api::server::run(config).await
}
