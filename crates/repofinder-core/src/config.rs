use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from the config file; CLI flags and env vars are layered on top by the binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config as TOML, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Get the config file path
    /// Uses XDG on Linux, Application Support on macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("repofinder");

        Ok(config_dir.join("config.toml"))
    }

    /// Where the persisted result store lives
    pub fn cache_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }
        Ok(Self::data_dir()?.join("store.db"))
    }

    /// Log file used while the TUI owns the terminal
    pub fn log_path(&self) -> crate::Result<PathBuf> {
        Ok(Self::data_dir()?.join("repofinder.log"))
    }

    fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::cache_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find cache directory".into()))?
            .join("repofinder"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token, raises the search rate limit
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_github_url() -> String {
    repofinder_api::github::GITHUB_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Persist the last result set between runs
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Override for the SQLite file location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Cards revealed initially and per "load more"
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_true")]
    pub mouse_enabled: bool,

    /// Show the persisted results on startup instead of an empty page
    #[serde(default)]
    pub restore_last_results: bool,
}

fn default_page_size() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            mouse_enabled: true,
            restore_last_results: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ui.page_size, 3);
        assert!(config.cache.enabled);
        assert!(!config.ui.restore_last_results);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("page_size"));
        assert!(toml.contains("api_url"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\npage_size = 10\n\n[github]\ntoken = \"abc\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ui.page_size, 10);
        assert!(config.ui.mouse_enabled);
        assert_eq!(config.github.token.as_deref(), Some("abc"));
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ui.page_size, 3);
    }

    #[test]
    fn test_broken_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ui = [[[").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ui.page_size = 7;
        config.ui.restore_last_results = true;
        config.cache.enabled = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ui.page_size, 7);
        assert!(loaded.ui.restore_last_results);
        assert!(!loaded.cache.enabled);
    }

    #[test]
    fn test_explicit_cache_path_wins() {
        let mut config = Config::default();
        config.cache.path = Some(PathBuf::from("/tmp/elsewhere.db"));
        assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/elsewhere.db"));
    }
}
