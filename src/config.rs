//! Configuration file support for the viewer.
//!
//! Settings are stored as versioned JSON so hosts can export, import and
//! persist them between sessions.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_SLICE, DEFAULT_SLICE, OVERLAY_COLORMAP, PERCENT_MAX, PERCENT_MIN,
};
use crate::model::{Colormap, ControlState, View};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }

    /// Convert to log crate's Level.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Viewer configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Control values applied on startup and by reset
    #[serde(default)]
    pub controls: ControlState,

    /// Palette for overlay volumes
    #[serde(default = "default_overlay_colormap")]
    pub overlay_colormap: String,

    /// Slice and view navigation
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Author identity stamped on new annotations
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_app_name() -> String {
    "NeuroView".to_string()
}

fn default_overlay_colormap() -> String {
    OVERLAY_COLORMAP.to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Slice navigation section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Slice shown on open and after a view reset
    #[serde(default = "default_slice")]
    pub default_slice: u32,

    /// Highest selectable slice
    #[serde(default = "default_max_slice")]
    pub max_slice: u32,

    /// View shown on open
    #[serde(default)]
    pub default_view: View,
}

fn default_slice() -> u32 {
    DEFAULT_SLICE
}

fn default_max_slice() -> u32 {
    DEFAULT_MAX_SLICE
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_slice: default_slice(),
            max_slice: default_max_slice(),
            default_view: View::default(),
        }
    }
}

/// Identity of the current user. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_author() -> String {
    "Current User".to_string()
}

fn default_role() -> String {
    "Doctor".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            role: default_role(),
        }
    }
}

impl ViewerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            controls: ControlState::default(),
            overlay_colormap: default_overlay_colormap(),
            navigation: NavigationConfig::default(),
            identity: IdentityConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let controls = &self.controls;
        let percentages = [
            ("brightness", controls.brightness),
            ("contrast", controls.contrast),
        ];
        for (name, value) in percentages {
            if !(PERCENT_MIN..=PERCENT_MAX).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between {} and {}, got {}",
                    name, PERCENT_MIN, PERCENT_MAX, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&controls.overlay_opacity) {
            return Err(ConfigError::Invalid(format!(
                "overlay opacity must be between 0 and 1, got {}",
                controls.overlay_opacity
            )));
        }
        if self.overlay_colormap.trim().is_empty() {
            return Err(ConfigError::Invalid("overlay colormap is empty".to_string()));
        }
        if self.overlay_colormap.parse::<Colormap>().is_ok() {
            return Err(ConfigError::Invalid(format!(
                "overlay colormap '{}' must differ from the base image palettes",
                self.overlay_colormap
            )));
        }
        if self.navigation.default_slice > self.navigation.max_slice {
            return Err(ConfigError::Invalid(format!(
                "default slice {} exceeds max slice {}",
                self.navigation.default_slice, self.navigation.max_slice
            )));
        }
        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "neuroview-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("neuroview").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("neuroview")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Try to load configuration from a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }

    /// Save configuration to a file, creating parent directories as needed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = ViewerConfig::new();
        config.controls.colormap = Colormap::Hot;
        config.navigation.default_view = View::Coronal;
        config.identity.author = "Dr. Rahma".to_string();

        let json = config.to_json().unwrap();
        let loaded = ViewerConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ViewerConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(config.controls, ControlState::default());
        assert_eq!(config.overlay_colormap, "warm");
        assert_eq!(config.navigation.default_slice, 45);
        assert_eq!(config.navigation.max_slice, 90);
        assert_eq!(config.identity.author, "Current User");
        assert_eq!(config.identity.role, "Doctor");
        assert_eq!(config.preferences.log_level, LogLevel::Info);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        let result = ViewerConfig::from_json(&json);
        assert!(matches!(result, Err(ConfigError::VersionTooNew { .. })));
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut config = ViewerConfig::new();
        config.controls.brightness = 120.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::new();
        config.navigation.default_slice = 100;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::new();
        config.controls.overlay_opacity = -0.2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::new();
        config.overlay_colormap = " ".to_string();
        let json = config.to_json().unwrap();
        assert!(matches!(ViewerConfig::from_json(&json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overlay_palette_must_differ_from_base() {
        let mut config = ViewerConfig::new();
        config.overlay_colormap = "gray".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.overlay_colormap = "Grayscale".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.overlay_colormap = "red".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ViewerConfig::from_json("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_log_level_serde() {
        let json = r#"{ "version": 1, "preferences": { "log_level": "debug" } }"#;
        let config = ViewerConfig::from_json(json).unwrap();
        assert_eq!(config.preferences.log_level, LogLevel::Debug);
        assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("neuroview-config-test-{}", std::process::id()))
            .join(ViewerConfig::default_filename());
        let mut config = ViewerConfig::new();
        config.navigation.max_slice = 120;

        config.save_to(&path).unwrap();
        let loaded = ViewerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.navigation.max_slice, 120);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
