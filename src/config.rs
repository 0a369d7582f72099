//! TOML configuration with environment overrides.

use crate::defaults;
use crate::error::{Result, SignError};
use crate::frame::FrameShape;
use crate::segment::SegmenterConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub frame: FrameConfig,
    pub classifiers: ClassifierConfig,
    pub output: OutputConfig,
}

/// Segmentation thresholds and driver cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Hold needed to confirm a letter
    pub confirm_hold_ms: u64,
    /// Blank hold needed to flush a word
    pub flush_blank_ms: u64,
    pub tick_ms: u64,
}

/// Preprocessed frame dimensions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Run the four classifiers of a frame on separate threads
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print a line whenever the per-frame symbol changes (text format only)
    pub show_symbol: bool,
}

/// Display format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(SignError::ConfigInvalidValue {
                key: "output.format".to_string(),
                message: format!("unknown format '{}', expected text or json", other),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            confirm_hold_ms: defaults::CONFIRM_HOLD_MS,
            flush_blank_ms: defaults::FLUSH_BLANK_MS,
            tick_ms: defaults::TICK_MS,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: defaults::FRAME_SIDE,
            height: defaults::FRAME_SIDE,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_symbol: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SignError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                SignError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(SignError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNSCRIBE_CONFIRM_HOLD_MS → timing.confirm_hold_ms
    /// - SIGNSCRIBE_FLUSH_BLANK_MS → timing.flush_blank_ms
    /// - SIGNSCRIBE_TICK_MS → timing.tick_ms
    /// - SIGNSCRIBE_OUTPUT → output.format
    ///
    /// Empty or unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = env_millis("SIGNSCRIBE_CONFIRM_HOLD_MS") {
            self.timing.confirm_hold_ms = ms;
        }

        if let Some(ms) = env_millis("SIGNSCRIBE_FLUSH_BLANK_MS") {
            self.timing.flush_blank_ms = ms;
        }

        if let Some(ms) = env_millis("SIGNSCRIBE_TICK_MS") {
            self.timing.tick_ms = ms;
        }

        if let Ok(format) = std::env::var("SIGNSCRIBE_OUTPUT")
            && let Ok(format) = format.parse::<OutputFormat>()
        {
            self.output.format = format;
        }

        self
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let zero = |key: &str| SignError::ConfigInvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        };

        if self.timing.confirm_hold_ms == 0 {
            return Err(zero("timing.confirm_hold_ms"));
        }
        if self.timing.flush_blank_ms == 0 {
            return Err(zero("timing.flush_blank_ms"));
        }
        if self.timing.tick_ms == 0 {
            return Err(zero("timing.tick_ms"));
        }
        if self.frame.width == 0 {
            return Err(zero("frame.width"));
        }
        if self.frame.height == 0 {
            return Err(zero("frame.height"));
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/signscribe/config.toml on Linux, `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(defaults::CONFIG_DIR_NAME)
                .join(defaults::CONFIG_FILE_NAME)
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SignError::ConfigParse {
            message: e.to_string(),
        })
    }

    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            confirm_hold: Duration::from_millis(self.timing.confirm_hold_ms),
            flush_blank: Duration::from_millis(self.timing.flush_blank_ms),
        }
    }

    pub fn frame_shape(&self) -> FrameShape {
        FrameShape::new(self.frame.width, self.frame.height)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.timing.tick_ms)
    }

    /// Whether ensembles built from this config fan out across threads.
    pub fn parallel_classifiers(&self) -> bool {
        self.classifiers.parallel
    }
}

fn env_millis(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse().ok()
}
