//! Parse a project `.env` file into a key-value map. Applying to the environment happens in lib.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Strips matching quotes. Double quotes honour `\"` and `\n`; single quotes are literal.
/// Unquoted values lose a trailing ` # comment`.
fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\n", "\n");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Lines are `KEY=VALUE` or `export KEY=VALUE`; blank lines and `#` lines are skipped,
/// as are lines without `=` or with an empty key. No multiline values.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (k, v) = line.split_once('=')?;
            let key = k.trim();
            (!key.is_empty()).then(|| (key.to_string(), parse_value(v)))
        })
        .collect()
}

/// Load `.env` from `override_dir` or the current directory. Missing file returns an empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_dotenv(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_realtor_env() {
        let m = parse_dotenv(
            "# model\nOPENAI_API_KEY=sk-test\nOPENAI_MODEL=\"gpt-4o-mini\"\n\nREALTOR_LISTINGS_DB='./listings.db'\n",
        );
        assert_eq!(m.len(), 3);
        assert_eq!(m["OPENAI_API_KEY"], "sk-test");
        assert_eq!(m["OPENAI_MODEL"], "gpt-4o-mini");
        assert_eq!(m["REALTOR_LISTINGS_DB"], "./listings.db");
    }

    #[test]
    fn export_prefix_is_accepted() {
        let m = parse_dotenv("export REALTOR_RECURSION_LIMIT=40");
        assert_eq!(m["REALTOR_RECURSION_LIMIT"], "40");
    }

    #[test]
    fn trailing_comment_stripped_only_when_unquoted() {
        let m = parse_dotenv("A=1 # one\nB=\"x # not a comment\"\nC=a#b\n");
        assert_eq!(m["A"], "1");
        assert_eq!(m["B"], "x # not a comment");
        assert_eq!(m["C"], "a#b");
    }

    #[test]
    fn escapes_in_double_quotes() {
        let m = parse_dotenv(r#"GREETING="say \"hi\"\nbye""#);
        assert_eq!(m["GREETING"], "say \"hi\"\nbye");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let m = parse_dotenv("NOT_KEY_VALUE\n=value_only\nKEY=\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m["KEY"], "");
    }

    #[test]
    fn load_env_map_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn load_env_map_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "A=1\nB=2\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m["A"], "1");
        assert_eq!(m["B"], "2");
    }
}
