//! Environment-driven configuration
//!
//! Two small structs, one per binary. Values come from the environment
//! (`.env` is honored by the binaries before this runs) with local-dev
//! defaults where a default makes sense. The upstream script endpoint has no
//! sensible default and is required.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Settings for the survey client.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Root of the forwarding proxy, e.g. `http://127.0.0.1:8788/api`.
    pub api_base: String,
    /// Directory holding the rotation counter and the trial journal.
    pub data_dir: PathBuf,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8788/api".to_string(),
            data_dir: PathBuf::from(".kansei"),
        }
    }
}

impl SurveyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: env::var("SURVEY_API_BASE").unwrap_or(defaults.api_base),
            data_dir: env::var("SURVEY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    pub fn rotation_file(&self) -> PathBuf {
        self.data_dir.join("rotation.json")
    }

    pub fn journal_file(&self) -> PathBuf {
        self.data_dir.join("trials.jsonl")
    }
}

/// Settings for the forwarding proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listen address, e.g. `0.0.0.0:8788`.
    pub bind_addr: String,
    /// Upstream script endpoint that rows and summary queries forward to.
    pub upstream: String,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        let upstream =
            env::var("GAS_ENDPOINT").context("GAS_ENDPOINT is not set (upstream script endpoint)")?;
        let bind_addr = env::var("PROXY_ADDR").unwrap_or_else(|_| "0.0.0.0:8788".to_string());
        Ok(Self { bind_addr, upstream })
    }
}
