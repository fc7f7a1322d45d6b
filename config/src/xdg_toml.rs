//! Load `[env]` table from `<config_home>/<app>/config.toml`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set and absolute, else the platform config directory.
pub fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        if dir.is_absolute() {
            return Ok(dir);
        }
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Returns env key-value pairs from `[env]` section. Missing file or empty section returns empty map.
pub fn load_env_map(config_home: &Path, app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_home.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, app: &str, body: &str) {
        let app_dir = dir.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let map = load_env_map(dir.path(), "realtor").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn load_env_map_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "realtor",
            r#"
[env]
OPENAI_MODEL = "gpt-4o-mini"
REALTOR_CHECKPOINT_DB = "/var/lib/realtor/checkpoints.db"
"#,
        );

        let map = load_env_map(dir.path(), "realtor").unwrap();
        assert_eq!(map.get("OPENAI_MODEL").map(String::as_str), Some("gpt-4o-mini"));
        assert_eq!(
            map.get("REALTOR_CHECKPOINT_DB").map(String::as_str),
            Some("/var/lib/realtor/checkpoints.db")
        );
    }

    #[test]
    fn config_without_env_section_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "realtor", "[other]\nkey = \"ignored\"\n");
        let map = load_env_map(dir.path(), "realtor").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "realtor", "not valid toml [[[\n");
        let result = load_env_map(dir.path(), "realtor");
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }

    #[test]
    fn non_string_env_value_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "realtor", "[env]\nREALTOR_RECURSION_LIMIT = 40\n");
        let result = load_env_map(dir.path(), "realtor");
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
