// Global configuration and constants

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Point;

pub const MAX_SPROUTS: u32 = 3;
pub const BRANCH_LENGTH: f32 = 20.0;
pub const NODE_TOLERANCE: f32 = 5.0;
pub const ENDPOINT_TOLERANCE: f32 = 1.0;
pub const PHASE_TIME_MS: f64 = 500.0;

pub const DEFAULT_LINE_COLOR: &str = "rgb(0, 255, 192, 0.95)";
pub const DEFAULT_MARKER_COLOR: &str = "rgb(0, 255, 192, 1)";

const DEFAULT_CONFIG_PATHS: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

// Configuration struct for loader parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    // Growth & branching
    pub max_sprouts: u32,
    pub branch_length: f32,
    pub node_tolerance: f32,     // Endpoint-to-node proximity rejection
    pub endpoint_tolerance: f32, // Shared endpoints closer than this never collide
    pub origin: Point,

    // Pacing
    pub phase_time_ms: f64, // Dwell before the next phase is requested
    pub retry_delay_ms: f64,
    pub progress_per_frame: f32,
    pub target_frame_ms: f64,
    pub max_frame_ms: f64, // Caps a single tick after the host was backgrounded

    // Rendering
    pub line_width: f32,
    pub line_color: String,
    pub marker_color: String,
    pub window_width: u32,
    pub window_height: u32,

    pub log_level: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_sprouts: MAX_SPROUTS,
            branch_length: BRANCH_LENGTH,
            node_tolerance: NODE_TOLERANCE,
            endpoint_tolerance: ENDPOINT_TOLERANCE,
            origin: Point::new(1.0, 1.0),
            phase_time_ms: PHASE_TIME_MS,
            retry_delay_ms: 500.0,
            progress_per_frame: 0.05,
            target_frame_ms: 16.0,
            max_frame_ms: 32.0,
            line_width: 2.0,
            line_color: DEFAULT_LINE_COLOR.to_owned(),
            marker_color: DEFAULT_MARKER_COLOR.to_owned(),
            window_width: 480,
            window_height: 320,
            log_level: "info".to_owned(),
        }
    }
}

impl LoaderConfig {
    /// Load a config file, picking the parser from the extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = Self::parse(&contents, &extension)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(contents: &str, extension: &str) -> Result<Self, ConfigError> {
        match extension {
            "yaml" | "yml" => Ok(serde_yaml::from_str(contents)?),
            "json" => Ok(serde_json::from_str(contents)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_owned())),
        }
    }

    /// Search the working directory for a config file, falling back to defaults.
    pub fn from_default_paths() -> Self {
        for candidate in DEFAULT_CONFIG_PATHS {
            if !Path::new(candidate).exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("ignoring {candidate}: {e}");
                }
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sprouts == 0 {
            return Err(ConfigError::Invalid("max_sprouts must be at least 1".into()));
        }
        if !(self.branch_length > 0.0) {
            return Err(ConfigError::Invalid("branch_length must be positive".into()));
        }
        if self.node_tolerance < 0.0 || self.endpoint_tolerance < 0.0 {
            return Err(ConfigError::Invalid("tolerances must not be negative".into()));
        }
        if !(self.progress_per_frame > 0.0 && self.progress_per_frame <= 1.0) {
            return Err(ConfigError::Invalid(
                "progress_per_frame must be in (0, 1]".into(),
            ));
        }
        if !(self.target_frame_ms > 0.0) || self.max_frame_ms < self.target_frame_ms {
            return Err(ConfigError::Invalid(
                "target_frame_ms must be positive and no larger than max_frame_ms".into(),
            ));
        }
        if self.phase_time_ms < 0.0 || self.retry_delay_ms < 0.0 {
            return Err(ConfigError::Invalid("delays must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_loader_constants() {
        let config = LoaderConfig::default();
        assert_eq!(config.max_sprouts, 3);
        assert_eq!(config.branch_length, 20.0);
        assert_eq!(config.origin, Point::new(1.0, 1.0));
        assert_eq!(config.phase_time_ms, 500.0);
        assert_eq!(config.retry_delay_ms, 500.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = LoaderConfig::parse("branch_length: 12.5\nline_color: \"#ff0000\"\n", "yaml")
            .unwrap();
        assert_eq!(config.branch_length, 12.5);
        assert_eq!(config.line_color, "#ff0000");
        assert_eq!(config.max_sprouts, MAX_SPROUTS);
    }

    #[test]
    fn json_is_supported() {
        let config = LoaderConfig::parse(r#"{"max_sprouts": 5, "origin": {"x": 4, "y": 8}}"#, "json")
            .unwrap();
        assert_eq!(config.max_sprouts, 5);
        assert_eq!(config.origin, Point::new(4.0, 8.0));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = LoaderConfig::parse("", "toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = LoaderConfig::default();
        config.branch_length = 0.0;
        assert!(config.validate().is_err());

        let mut config = LoaderConfig::default();
        config.max_sprouts = 0;
        assert!(config.validate().is_err());

        let mut config = LoaderConfig::default();
        config.max_frame_ms = 8.0;
        assert!(config.validate().is_err());

        let mut config = LoaderConfig::default();
        config.progress_per_frame = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reads_and_validates() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("sproutline-good-{}.yaml", std::process::id()));
        std::fs::write(&good, "phase_time_ms: 250\n").unwrap();
        let config = LoaderConfig::from_file(&good).unwrap();
        assert_eq!(config.phase_time_ms, 250.0);

        let bad = dir.join(format!("sproutline-bad-{}.json", std::process::id()));
        std::fs::write(&bad, r#"{"branch_length": -3}"#).unwrap();
        assert!(matches!(
            LoaderConfig::from_file(&bad),
            Err(ConfigError::Invalid(_))
        ));

        let _ = std::fs::remove_file(good);
        let _ = std::fs::remove_file(bad);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LoaderConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
