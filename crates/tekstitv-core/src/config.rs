use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (settings file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Teletext API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API application id (query credential, if the instance requires one)
    #[serde(default)]
    pub app_id: Option<String>,
    /// API application key
    #[serde(default)]
    pub app_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_id: None,
            app_key: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

/// Swipe classification thresholds.
///
/// Units are backend-defined: terminal cells for the TUI, pixels for a
/// pointer backend. Only the state machine and the dominant-axis rule are
/// fixed; these two knobs are tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum travel on the dominant axis for a swipe to register
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    /// Gestures slower than this are discarded
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_duration_ms: default_max_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Seconds a transient notice (e.g. "page not found") stays visible
    #[serde(default = "default_notice_secs")]
    pub notice_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            notice_secs: default_notice_secs(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.local/share/tekstitv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://external.api.yle.fi/v1/teletext".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_min_distance() -> f32 {
    3.0
}

fn default_max_duration_ms() -> u64 {
    800
}

fn default_tick_rate() -> u64 {
    250
}

fn default_notice_secs() -> u64 {
    3
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/tekstitv/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tekstitv")
            .join("config.toml")
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir().join("settings.json")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

/// Expand a leading `~` to the user's home directory
fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source.request_timeout_secs, 15);
        assert_eq!(config.gesture.max_duration_ms, 800);
        assert!(config.source.app_id.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [source]
            base_url = "http://localhost:9999/teletext"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.base_url, "http://localhost:9999/teletext");
        assert_eq!(config.source.request_timeout_secs, 15);
        assert_eq!(config.ui.tick_rate_ms, 250);
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(&PathBuf::from("~/x"));
        assert!(!expanded.starts_with("~"));

        let absolute = expand_tilde(&PathBuf::from("/tmp/x"));
        assert_eq!(absolute, PathBuf::from("/tmp/x"));
    }
}
