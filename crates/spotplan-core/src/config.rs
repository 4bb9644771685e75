//! Configuration loaded from the environment (and an optional `.env` file).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PLAN_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Settings for the external plan generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanGeneratorConfig {
    /// Webhook endpoint. `None` disables plan generation.
    pub endpoint: Option<String>,
    /// Upper bound on a single generator call.
    pub timeout: Duration,
}

impl Default for PlanGeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(DEFAULT_PLAN_TIMEOUT_SECS),
        }
    }
}

/// Top-level SpotPlan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotPlanConfig {
    /// HTTP server port.
    pub port: u16,
    /// Directory holding `spots.db`.
    pub data_dir: PathBuf,
    pub plan: PlanGeneratorConfig,
}

impl SpotPlanConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::Config(format!(".env: {}", e))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_empty(lookup("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {:?}", raw)))?,
            None => DEFAULT_PORT,
        };

        let data_dir = non_empty(lookup("SPOTPLAN_DATA_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let timeout_secs = match non_empty(lookup("PLAN_TIMEOUT_SECS")) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) | Err(_) => {
                    return Err(Error::Config(format!(
                        "PLAN_TIMEOUT_SECS must be a positive integer, got {:?}",
                        raw
                    )))
                }
                Ok(secs) => secs,
            },
            None => DEFAULT_PLAN_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            data_dir,
            plan: PlanGeneratorConfig {
                endpoint: non_empty(lookup("PLAN_WEBHOOK_URL")),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }

    /// Override the data directory (CLI argument wins over the environment).
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
