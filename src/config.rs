use std::env;
use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Deployment stage, published as the `/<stage>` server prefix
    pub stage: Option<String>,
    pub service_port: u16,
    pub service_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stage: None,
            service_port: DEFAULT_PORT,
            service_host: DEFAULT_HOST.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment, after applying `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stage = lookup("STAGE").and_then(|raw| normalize_stage(&raw));

        let service_port = match lookup("SERVICE_PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| {
                format!("SERVICE_PORT must be a valid port number (0-65535), got '{}'", raw)
            })?,
            None => DEFAULT_PORT,
        };

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Config {
            stage,
            service_port,
            service_host,
        })
    }

    /// Externally visible root path: `/<stage>` when a stage is set, `/` otherwise.
    pub fn root_path(&self) -> String {
        match &self.stage {
            Some(stage) => format!("/{}", stage),
            None => "/".to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Stage: {}", self.stage.as_deref().unwrap_or("none"));
        tracing::info!("  Root path: {}", self.root_path());
        tracing::info!("  Service listening on: {}", self.bind_addr());
    }
}

fn normalize_stage(raw: &str) -> Option<String> {
    let stage = raw.trim().trim_matches('/');
    if stage.is_empty() {
        None
    } else {
        Some(stage.to_string())
    }
}
