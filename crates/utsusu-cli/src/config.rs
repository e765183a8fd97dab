//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use utsusu_core::{
    EmojiUsage, GateLimits, PipelineConfig, PostType, Tone,
    pipeline::{DEFAULT_PHASE_HOLD, DEFAULT_REGENERATE_HOLD},
};

/// Color scheme name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

/// Configuration for utsusu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default post type (learning, story, howto)
    pub post_type: Option<PostType>,
    /// Default tone (soft, normal, biz)
    pub tone: Option<Tone>,
    /// Default emoji usage (on, off)
    pub emoji: Option<EmojiUsage>,
    /// How long each generation phase stays on screen
    pub phase_delay_ms: Option<u64>,
    /// How long the regenerate phase stays on screen
    pub regenerate_delay_ms: Option<u64>,
    /// Free conversions before a plan is required
    pub free_limit: Option<u32>,
    /// Conversions shown as included in the plan
    pub monthly_limit: Option<u32>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    pub theme: Option<ThemeName>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("utsusu")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("UTSUSU_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            post_type: Some(PostType::default()),
            tone: Some(Tone::default()),
            emoji: Some(EmojiUsage::default()),
            phase_delay_ms: Some(DEFAULT_PHASE_HOLD.as_millis() as u64),
            regenerate_delay_ms: Some(DEFAULT_REGENERATE_HOLD.as_millis() as u64),
            free_limit: Some(utsusu_core::FREE_LIMIT),
            monthly_limit: Some(utsusu_core::MONTHLY_LIMIT),
            tui: Some(true),
            theme: Some(ThemeName::Dark),
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Gate limits with defaults filled in
    pub fn gate_limits(&self) -> GateLimits {
        let defaults = GateLimits::default();
        GateLimits {
            free_limit: self.free_limit.unwrap_or(defaults.free_limit),
            monthly_limit: self.monthly_limit.unwrap_or(defaults.monthly_limit),
        }
    }

    /// Pipeline timings; `phase_ms` from the command line wins over the file
    pub fn pipeline_config(&self, phase_ms: Option<u64>) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            phase_hold: phase_ms
                .or(self.phase_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.phase_hold),
            regenerate_hold: self
                .regenerate_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.regenerate_hold),
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# utsusu configuration file
# Place at ~/.config/utsusu/config.toml (Linux/Mac) or %APPDATA%\utsusu\config.toml (Windows)
# or point UTSUSU_CONFIG_PATH at it.

# Default post options
post_type = "learning"   # learning, story, howto
tone = "soft"            # soft, normal, biz
emoji = "off"            # on, off

# How long each generation phase is shown (milliseconds)
phase_delay_ms = 1200

# How long "regenerate" is shown (milliseconds)
regenerate_delay_ms = 1500

# Free conversions before a plan is required, and the plan's monthly allowance
free_limit = 1
monthly_limit = 30

# Whether to use TUI mode by default (true by default)
# Set to false for the line-mode shell
tui = true

# dark or light
theme = "dark"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.post_type, Some(PostType::Learning));
        assert_eq!(config.tone, Some(Tone::Soft));
        assert_eq!(config.emoji, Some(EmojiUsage::Off));
        assert_eq!(config.theme, Some(ThemeName::Dark));
        assert_eq!(config.gate_limits(), GateLimits::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("tone = \"biz\"").unwrap();
        assert_eq!(config.tone, Some(Tone::Biz));
        assert_eq!(config.post_type, None);
        assert_eq!(config.pipeline_config(None), PipelineConfig::default());
    }

    #[test]
    fn test_phase_flag_overrides_file() {
        let config: Config = toml::from_str("phase_delay_ms = 500").unwrap();
        assert_eq!(
            config.pipeline_config(None).phase_hold,
            Duration::from_millis(500)
        );
        assert_eq!(
            config.pipeline_config(Some(10)).phase_hold,
            Duration::from_millis(10)
        );
    }

    #[test]
    fn test_unknown_option_value_is_rejected() {
        assert!(toml::from_str::<Config>("tone = \"loud\"").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("utsusu-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let config = Config {
            emoji: Some(EmojiUsage::On),
            free_limit: Some(3),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/utsusu/config.toml"));
        assert_eq!(config, Config::default());
    }
}
