use super::{Config, RunMode};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub const ON_SERVER_ENV: &str = "SNAPSHOTTER_ON_SERVER";
pub const CONFIG_DIR_ENV: &str = "SNAPSHOTTER_CONFIG_DIR";
pub const VCS_TOKEN_ENV: &str = "SNAPSHOTTER_VCS_TOKEN";

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    /// Config directory from `SNAPSHOTTER_CONFIG_DIR`, falling back to `config`
    pub fn config_dir_from_env() -> String {
        std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string())
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

        let mut config = Self::parse(&main_config_content)?;

        config.run_mode = run_mode_from_env();
        config.vcs_token = std::env::var(VCS_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        debug!("Run mode from environment: {:?}", config.run_mode);

        info!(
            "Loaded config: rpc {}, {:?} account source, archive dir {}, concurrency {}",
            config.rpc_url,
            config.account_source,
            config.archive_dir().display(),
            config.fetch_concurrency
        );

        Ok(config)
    }

    /// Parse and validate the contents of `main.toml`
    pub fn parse(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse main config: {}", e))?;
        validate(&config)?;
        Ok(config)
    }
}

fn run_mode_from_env() -> RunMode {
    match std::env::var(ON_SERVER_ENV) {
        Ok(value) if is_truthy(&value) => RunMode::Server,
        _ => RunMode::Local,
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn validate(config: &Config) -> Result<()> {
    if config.rpc_url.trim().is_empty() {
        return Err(anyhow!("Missing required field: rpc_url"));
    }
    if config.fetch_concurrency == 0 {
        return Err(anyhow!("Invalid value for 'fetch_concurrency': must be at least 1"));
    }
    if config.progress_interval == 0 {
        return Err(anyhow!("Invalid value for 'progress_interval': must be at least 1"));
    }
    if config.poll_interval_seconds == 0 {
        return Err(anyhow!("Invalid value for 'poll_interval_seconds': must be at least 1"));
    }
    Ok(())
}
