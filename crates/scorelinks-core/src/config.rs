//! Configuration management for scorelinks.
//!
//! Loads configuration from ${SCORELINKS_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Server used when neither the environment nor the config names one.
pub const DEFAULT_BASE_URL: &str = "https://16score-vmix-server.vercel.app/";

/// Environment variable that overrides the configured base URL.
pub const API_URL_ENV: &str = "SCORELINKS_API_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments and sections from the template are always present,
/// while the user's values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for scorelinks configuration and session data.
    //!
    //! SCORELINKS_HOME resolution order:
    //! 1. SCORELINKS_HOME environment variable (if set)
    //! 2. ~/.config/scorelinks (default)

    use std::path::PathBuf;

    /// Environment variable that relocates every scorelinks file.
    pub const HOME_ENV: &str = "SCORELINKS_HOME";

    /// Returns the scorelinks home directory.
    pub fn scorelinks_home() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV) {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".scorelinks"),
            |h| h.join(".config").join("scorelinks"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        scorelinks_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        scorelinks_home().join("session.json")
    }

    /// Returns the directory that holds TUI log files.
    pub fn logs_dir() -> PathBuf {
        scorelinks_home().join("logs")
    }
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint is joined onto.
    pub base_url: String,
    /// Whether HTTP 401 on an authenticated call ends the session.
    pub logout_on_unauthorized: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            logout_on_unauthorized: true,
        }
    }
}

impl ApiConfig {
    /// Returns the configured base URL, treating empty/whitespace as unset.
    pub fn effective_base_url(&self) -> Option<&str> {
        let trimmed = self.base_url.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the base URL for this run.
    ///
    /// Precedence: explicit override, then `SCORELINKS_API_URL`, then the
    /// config file, then [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    /// Returns an error if the winning value is not an http(s) URL.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<String> {
        let env_value = std::env::var(API_URL_ENV).ok();
        resolve_base_url_from(cli_override, env_value.as_deref(), &self.api)
    }

    /// Saves only the API base URL to the config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or written.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the API base URL to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let normalized = parse_base_url(base_url)?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        doc["api"]["base_url"] = value(normalized);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with `Config::default()`.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Applies base URL precedence to already-collected inputs.
///
/// # Errors
/// Returns an error if the winning value is not an http(s) URL.
pub fn resolve_base_url_from(
    cli_override: Option<&str>,
    env_value: Option<&str>,
    api: &ApiConfig,
) -> Result<String> {
    let non_empty = |s: &&str| !s.trim().is_empty();

    let (source, raw) = if let Some(url) = cli_override.filter(non_empty) {
        ("--api-url", url)
    } else if let Some(url) = env_value.filter(non_empty) {
        (API_URL_ENV, url)
    } else if let Some(url) = api.effective_base_url() {
        ("config", url)
    } else {
        ("default", DEFAULT_BASE_URL)
    };

    parse_base_url(raw).with_context(|| format!("Invalid API base URL from {source}"))
}

fn parse_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed =
        url::Url::parse(trimmed).with_context(|| format!("'{trimmed}' is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("'{trimmed}' must use http or https");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.api.logout_on_unauthorized);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[log]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[api\nbase_url = ").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# scorelinks configuration"));
        assert!(contents.contains("base_url = \"https://16score-vmix-server.vercel.app/\""));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_generate_matches_defaults() {
        let generated = Config::generate().unwrap();
        let parsed: Config = toml::from_str(&generated).unwrap();

        assert_eq!(parsed, Config::default());
        assert!(generated.contains("# Treat HTTP 401"));
    }

    #[test]
    fn test_save_base_url_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[api]\nlogout_on_unauthorized = false\n\n[log]\nlevel = \"trace\"\n",
        )
        .unwrap();

        Config::save_base_url_to(&config_path, "http://localhost:4000/").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:4000/");
        assert!(!config.api.logout_on_unauthorized);
        assert_eq!(config.log.level, "trace");

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Base URL of the 16Score vMix server."));
    }

    #[test]
    fn test_save_base_url_rejects_non_http() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        assert!(Config::save_base_url_to(&config_path, "ftp://example.com").is_err());
        assert!(!config_path.exists());
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        let api = ApiConfig {
            base_url: "https://from-config.example.com/".to_string(),
            ..Default::default()
        };

        let url = resolve_base_url_from(
            Some("http://flag.example.com"),
            Some("http://env.example.com"),
            &api,
        )
        .unwrap();
        assert_eq!(url, "http://flag.example.com");

        let url = resolve_base_url_from(None, Some("http://env.example.com"), &api).unwrap();
        assert_eq!(url, "http://env.example.com");

        let url = resolve_base_url_from(None, Some("   "), &api).unwrap();
        assert_eq!(url, "https://from-config.example.com/");
    }

    #[test]
    fn test_resolve_base_url_empty_config_uses_default() {
        let api = ApiConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };

        assert_eq!(api.effective_base_url(), None);
        assert_eq!(
            resolve_base_url_from(None, None, &api).unwrap(),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_resolve_base_url_invalid_names_source() {
        let err = resolve_base_url_from(None, Some("not a url"), &ApiConfig::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains(API_URL_ENV));
    }
}
