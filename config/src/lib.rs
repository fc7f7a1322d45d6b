//! Load configuration from XDG `config.toml` and project `.env`, then apply to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! With the `tracing-init` feature, [`init_tracing`] installs the shared subscriber used by
//! binaries (stderr plus an optional log file).

mod dotenv;
#[cfg(feature = "tracing-init")]
mod tracing_init;
mod xdg_toml;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(feature = "tracing-init")]
pub use tracing_init::{init_tracing, TracingGuard, LOG_FILE_ENV};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Where configuration is read from. `None` fields fall back to the process defaults
/// (`$XDG_CONFIG_HOME` or the platform config dir; the current directory for `.env`).
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub config_home: Option<PathBuf>,
    pub dotenv_dir: Option<PathBuf>,
}

/// Keys that were set by [`load_and_apply`], grouped by the source that won.
///
/// Keys already present in the process environment appear in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedConfig {
    pub from_dotenv: Vec<String>,
    pub from_xdg: Vec<String>,
}

impl AppliedConfig {
    pub fn is_empty(&self) -> bool {
        self.from_dotenv.is_empty() && self.from_xdg.is_empty()
    }
}

/// Loads config from XDG `config.toml` and optional project `.env`, then sets environment
/// variables only for keys that are **not** already set (so existing env has highest priority).
///
/// Order of precedence when a key is missing in the process environment:
/// 1. Value from project `.env` (current directory or `override_dir` if given)
/// 2. Value from `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` table
///
/// * `app_name`: e.g. `"realtor"`; used for XDG path `~/.config/<app_name>/config.toml`.
/// * `override_dir`: if `Some`, look for `.env` in this directory instead of `std::env::current_dir()`.
pub fn load_and_apply(
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<AppliedConfig, LoadError> {
    load_and_apply_from(
        app_name,
        &ConfigSources {
            config_home: None,
            dotenv_dir: override_dir.map(Path::to_path_buf),
        },
    )
}

/// Same as [`load_and_apply`] with explicit source locations.
pub fn load_and_apply_from(
    app_name: &str,
    sources: &ConfigSources,
) -> Result<AppliedConfig, LoadError> {
    let config_home = match &sources.config_home {
        Some(dir) => dir.clone(),
        None => xdg_toml::config_home()?,
    };
    let xdg_map = xdg_toml::load_env_map(&config_home, app_name)?;
    let dotenv_map =
        dotenv::load_env_map(sources.dotenv_dir.as_deref()).map_err(LoadError::DotenvRead)?;

    let mut keys: Vec<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut applied = AppliedConfig::default();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key) {
            std::env::set_var(key, v);
            applied.from_dotenv.push(key.clone());
        } else if let Some(v) = xdg_map.get(key) {
            std::env::set_var(key, v);
            applied.from_xdg.push(key.clone());
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn write_xdg(dir: &Path, app: &str, body: &str) {
        let app_dir = dir.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    fn sources(config_home: &Path, dotenv_dir: &Path) -> ConfigSources {
        ConfigSources {
            config_home: Some(config_home.to_path_buf()),
            dotenv_dir: Some(dotenv_dir.to_path_buf()),
        }
    }

    /// **Scenario**: A key already in the process environment is left alone and not reported.
    #[test]
    fn existing_env_wins() {
        let xdg = tempfile::tempdir().unwrap();
        let dotenv_dir = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "realtor", "[env]\nREALTOR_CFG_EXISTING = \"xdg\"\n");
        std::fs::write(dotenv_dir.path().join(".env"), "REALTOR_CFG_EXISTING=dotenv\n").unwrap();
        env::set_var("REALTOR_CFG_EXISTING", "from_env");

        let applied =
            load_and_apply_from("realtor", &sources(xdg.path(), dotenv_dir.path())).unwrap();
        assert_eq!(env::var("REALTOR_CFG_EXISTING").as_deref(), Ok("from_env"));
        assert!(!applied.from_dotenv.contains(&"REALTOR_CFG_EXISTING".to_string()));
        assert!(!applied.from_xdg.contains(&"REALTOR_CFG_EXISTING".to_string()));
        env::remove_var("REALTOR_CFG_EXISTING");
    }

    /// **Scenario**: No config file and no .env is not an error and applies nothing.
    #[test]
    fn no_sources_is_ok() {
        let xdg = tempfile::tempdir().unwrap();
        let empty = tempfile::tempdir().unwrap();
        let applied = load_and_apply_from("realtor", &sources(xdg.path(), empty.path())).unwrap();
        assert!(applied.is_empty());
    }

    /// **Scenario**: The same key in .env and XDG resolves to the .env value.
    #[test]
    fn dotenv_overrides_xdg() {
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "realtor", "[env]\nREALTOR_CFG_PRIORITY = \"from_xdg\"\n");
        let dotenv_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dotenv_dir.path().join(".env"),
            "REALTOR_CFG_PRIORITY=from_dotenv\n",
        )
        .unwrap();
        env::remove_var("REALTOR_CFG_PRIORITY");

        let applied =
            load_and_apply_from("realtor", &sources(xdg.path(), dotenv_dir.path())).unwrap();
        let val = env::var("REALTOR_CFG_PRIORITY").unwrap();
        env::remove_var("REALTOR_CFG_PRIORITY");

        assert_eq!(val, "from_dotenv");
        assert_eq!(applied.from_dotenv, vec!["REALTOR_CFG_PRIORITY".to_string()]);
        assert!(applied.from_xdg.is_empty());
    }

    /// **Scenario**: Keys only present in config.toml are applied and reported as XDG keys.
    #[test]
    fn xdg_applied_when_no_dotenv() {
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(
            xdg.path(),
            "realtor",
            "[env]\nREALTOR_CFG_XDG_ONLY = \"from_xdg\"\n",
        );
        let empty = tempfile::tempdir().unwrap();
        env::remove_var("REALTOR_CFG_XDG_ONLY");

        let applied = load_and_apply_from("realtor", &sources(xdg.path(), empty.path())).unwrap();
        let val = env::var("REALTOR_CFG_XDG_ONLY").unwrap();
        env::remove_var("REALTOR_CFG_XDG_ONLY");

        assert_eq!(val, "from_xdg");
        assert_eq!(applied.from_xdg, vec!["REALTOR_CFG_XDG_ONLY".to_string()]);
    }

    /// **Scenario**: The config file of another app name is not read.
    #[test]
    fn other_app_config_ignored() {
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "someone-else", "[env]\nREALTOR_CFG_OTHER_APP = \"x\"\n");
        let empty = tempfile::tempdir().unwrap();
        env::remove_var("REALTOR_CFG_OTHER_APP");

        let applied = load_and_apply_from("realtor", &sources(xdg.path(), empty.path())).unwrap();
        assert!(env::var("REALTOR_CFG_OTHER_APP").is_err());
        assert!(applied.is_empty());
    }

    /// **Scenario**: A malformed config.toml surfaces as XdgParse.
    #[test]
    fn invalid_xdg_toml_fails_with_xdg_parse_error() {
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "realtor", "invalid [[[\n");
        let empty = tempfile::tempdir().unwrap();

        let result = load_and_apply_from("realtor", &sources(xdg.path(), empty.path()));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
