//! Configuration management for the engagement vision pipeline

use crate::{
    constants::{
        DEFAULT_DEBOUNCE_FRAMES, DEFAULT_GAZE_THRESHOLD, DEFAULT_INITIAL_EMA, DEFAULT_MOTION_BIAS,
        DEFAULT_MOTION_THRESHOLD, DEFAULT_NOVELTY_EPSILON, DEFAULT_NOVELTY_MU, DEFAULT_NOVELTY_THRESHOLD,
        DEFAULT_SIZE_DEAD_BAND, NOVELTY_CHANNELS, WAITING_STATE,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recorded observation stream
    pub input: InputConfig,

    /// Gaze classifier configuration
    pub gaze: GazeConfig,

    /// Smile classifier configuration
    pub smile: SmileConfig,

    /// Head size detector configuration
    pub size: SizeConfig,

    /// Novelty detector configuration
    pub novelty: NoveltyConfig,

    /// Motion aggregator configuration
    pub motion: MotionConfig,

    /// Event and contact sample output
    pub output: OutputConfig,
}

/// Recorded input configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the JSON Lines observation stream
    pub path: Option<PathBuf>,

    /// Replay pacing in frames per second (0 replays as fast as possible)
    pub frame_rate: u32,
}

/// Gaze classifier parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Rescaled angle beyond which a direction is held
    pub angle_threshold: f64,

    /// A direction fires once its counter exceeds this many frames
    pub debounce_frames: u32,
}

/// Smile classifier parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmileConfig {
    /// A smile fires once its counter exceeds this many frames
    pub debounce_frames: u32,
}

/// Head size detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    /// Minimum change (exclusive) before a new size is published
    pub dead_band: i32,
}

/// How often the novelty EMA advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoveltyCadence {
    /// Once per frame, fed by the last classified face
    #[default]
    PerFrame,
    /// Once per classified face; frames without faces still advance once
    PerFace,
}

/// Novelty detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoveltyConfig {
    /// EMA smoothing factor (larger reacts faster)
    pub mu: f64,

    /// Denominator guard of the distance
    pub epsilon: f64,

    /// Distance above which novelty is published
    pub threshold: f64,

    /// EMA vector at startup
    pub initial_ema: [f64; NOVELTY_CHANNELS],

    /// Update cadence
    pub cadence: NoveltyCadence,
}

/// Motion aggregator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Enable motion aggregation
    pub enabled: bool,

    /// Total displacement (exclusive) above which motion is published
    pub threshold: f64,

    /// Subtracted from the total to form the published magnitude
    pub bias: f64,

    /// External state during which tracking is suspended and reseeded
    pub waiting_state: String,
}

/// Where events go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutput {
    /// JSON Lines on standard output
    #[default]
    Stdout,
    /// JSON Lines appended to `output.events_path`
    File,
    /// Log lines only
    Log,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Event sink
    pub events: EventOutput,

    /// Event file for `events: file`
    pub events_path: Option<PathBuf>,

    /// Optional JSON Lines file receiving contact samples
    pub contacts_path: Option<PathBuf>,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            angle_threshold: DEFAULT_GAZE_THRESHOLD,
            debounce_frames: DEFAULT_DEBOUNCE_FRAMES,
        }
    }
}

impl Default for SmileConfig {
    fn default() -> Self {
        Self {
            debounce_frames: DEFAULT_DEBOUNCE_FRAMES,
        }
    }
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            dead_band: DEFAULT_SIZE_DEAD_BAND,
        }
    }
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            mu: DEFAULT_NOVELTY_MU,
            epsilon: DEFAULT_NOVELTY_EPSILON,
            threshold: DEFAULT_NOVELTY_THRESHOLD,
            initial_ema: DEFAULT_INITIAL_EMA,
            cadence: NoveltyCadence::PerFrame,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_MOTION_THRESHOLD,
            bias: DEFAULT_MOTION_BIAS,
            waiting_state: WAITING_STATE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !self.gaze.angle_threshold.is_finite() || self.gaze.angle_threshold < 0.0 {
            return Err(Error::ConfigError(
                "Gaze angle threshold must be a non-negative number".to_string(),
            ));
        }
        if self.size.dead_band < 0 {
            return Err(Error::ConfigError("Size dead band must be non-negative".to_string()));
        }

        if !(self.novelty.mu > 0.0 && self.novelty.mu <= 1.0) {
            return Err(Error::ConfigError("Novelty mu must be in (0, 1]".to_string()));
        }
        if !(self.novelty.epsilon > 0.0) {
            return Err(Error::ConfigError("Novelty epsilon must be positive".to_string()));
        }
        if !self.novelty.threshold.is_finite() {
            return Err(Error::ConfigError("Novelty threshold must be finite".to_string()));
        }
        if self.novelty.initial_ema.iter().any(|v| !v.is_finite()) {
            return Err(Error::ConfigError("Initial EMA values must be finite".to_string()));
        }

        if !self.motion.threshold.is_finite() || !self.motion.bias.is_finite() {
            return Err(Error::ConfigError(
                "Motion threshold and bias must be finite".to_string(),
            ));
        }

        if self.output.events == EventOutput::File && self.output.events_path.is_none() {
            return Err(Error::ConfigError(
                "output.events_path is required when output.events is 'file'".to_string(),
            ));
        }

        Ok(())
    }

    /// Check that the observation stream exists
    pub fn validate_input(&self) -> Result<&Path> {
        let path = self
            .input
            .path
            .as_deref()
            .ok_or_else(|| Error::InputUnavailable("No input stream configured".to_string()))?;
        if !path.exists() {
            return Err(Error::InputUnavailable(format!(
                "Observation stream not found: {}",
                path.display()
            )));
        }
        Ok(path)
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Engagement Vision Configuration

# Recorded observation stream (JSON Lines)
input:
  path: "recordings/session.jsonl"
  frame_rate: 0

# Gaze classifier
gaze:
  angle_threshold: 0.3
  debounce_frames: 5

# Smile classifier
smile:
  debounce_frames: 5

# Head size dead band
size:
  dead_band: 5

# Novelty detector
novelty:
  mu: 0.1
  epsilon: 0.00000001
  threshold: 1.0
  initial_ema: [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
  cadence: per_frame

# Motion aggregator
motion:
  enabled: true
  threshold: 778000.0
  bias: 830000.0
  waiting_state: "WAITING_FOR_FEEDBACK"

# Output
output:
  events: stdout
  contacts_path: null
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.gaze, GazeConfig::default());
        assert_eq!(config.novelty, NoveltyConfig::default());
        assert_eq!(config.motion, MotionConfig::default());
        assert_eq!(config.input.path, Some(PathBuf::from("recordings/session.jsonl")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("size:\n  dead_band: 8\n").unwrap();
        assert_eq!(config.size.dead_band, 8);
        assert_eq!(config.smile, SmileConfig::default());
        assert_eq!(config.novelty.cadence, NoveltyCadence::PerFrame);
    }

    #[test]
    fn test_validate_rejects_bad_mu() {
        let mut config = Config::default();
        config.novelty.mu = 1.5;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_requires_events_path() {
        let mut config = Config::default();
        config.output.events = EventOutput::File;
        assert!(config.validate().is_err());
        config.output.events_path = Some(PathBuf::from("events.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_input_is_unavailable() {
        let mut config = Config::default();
        assert!(matches!(config.validate_input(), Err(Error::InputUnavailable(_))));
        config.input.path = Some(PathBuf::from("/nonexistent/stream.jsonl"));
        assert!(matches!(config.validate_input(), Err(Error::InputUnavailable(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = Config::default();
        config.novelty.cadence = NoveltyCadence::PerFace;
        config.motion.waiting_state = "PAUSED".to_string();
        config.output.contacts_path = Some(PathBuf::from("contacts.jsonl"));

        let path = std::env::temp_dir().join(format!("engagement-vision-config-{}.yaml", std::process::id()));
        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("gaze: [not, a, map]"),
            Err(Error::ConfigError(_))
        ));
    }
}
