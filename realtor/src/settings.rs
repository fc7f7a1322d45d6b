//! Runtime settings read from the environment.
//!
//! [`RealtorSettings::load`] first lets `.env` and the XDG `config.toml` fill in unset keys
//! (existing environment wins), then reads the keys below.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::DEFAULT_RECURSION_LIMIT;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("load config: {0}")]
    Load(#[from] env_config::LoadError),
    #[error("{key} must be a positive integer, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealtorSettings {
    /// `OPENAI_MODEL`.
    pub model: String,
    /// `OPENAI_BASE_URL`.
    pub base_url: Option<String>,
    /// `OPENAI_API_KEY`. The CLI refuses to start without one.
    pub api_key: Option<String>,
    /// `REALTOR_CHECKPOINT_DB`: SQLite checkpoint file; in-memory when unset.
    pub checkpoint_db: Option<PathBuf>,
    /// `REALTOR_LISTINGS_DB`: SQLite listings file; built-in sample listings when unset.
    pub listings_db: Option<PathBuf>,
    /// `REALTOR_RECURSION_LIMIT`.
    pub recursion_limit: usize,
}

impl Default for RealtorSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            api_key: None,
            checkpoint_db: None,
            listings_db: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl RealtorSettings {
    /// Applies `.env` / XDG config to the environment, then reads it.
    pub fn load() -> Result<Self, SettingsError> {
        let applied = env_config::load_and_apply("realtor", None)?;
        if !applied.is_empty() {
            tracing::debug!(
                from_dotenv = ?applied.from_dotenv,
                from_xdg = ?applied.from_xdg,
                "config applied to environment"
            );
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let recursion_limit = match get("REALTOR_RECURSION_LIMIT") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(SettingsError::InvalidNumber {
                    key: "REALTOR_RECURSION_LIMIT",
                    value: v,
                })?,
            None => DEFAULT_RECURSION_LIMIT,
        };
        Ok(Self {
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL"),
            api_key: get("OPENAI_API_KEY"),
            checkpoint_db: get("REALTOR_CHECKPOINT_DB").map(PathBuf::from),
            listings_db: get("REALTOR_LISTINGS_DB").map(PathBuf::from),
            recursion_limit,
        })
    }
}
