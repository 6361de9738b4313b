//! # Application Configuration
//!
//! JSON file read at startup. Every section and every field has a default,
//! so a partial file (or none at all) is valid:
//!
//! ```json
//! {
//!   "serial": { "device": "/dev/ttyUSB0", "baud": 19200 },
//!   "print": { "density": 10, "break_time": 2, "line_height": 24 },
//!   "layout": { "graph_height": 1200 },
//!   "job": { "pattern": "linear", "points": 3000 },
//!   "dispatch": { "queue_capacity": 4, "idle_timeout_ms": 5000 }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PressplotError;
use crate::job::{DEFAULT_POINTS, DEFAULT_THICKNESS, GraphJob, PrintSettings};
use crate::render::{CurvePattern, GraphLayout};
use crate::transport::serial::{self, DEFAULT_BAUD, DEFAULT_DEVICE};

/// Default port for the command inbox
pub const DEFAULT_COMMAND_DEVICE: &str = "/dev/ttyUSB1";

/// Serial ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Printer port
    pub device: String,
    pub baud: u32,
    /// Command inbox port
    pub command_device: String,
    pub command_baud: u32,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            command_device: DEFAULT_COMMAND_DEVICE.to_string(),
            command_baud: DEFAULT_BAUD,
        }
    }
}

/// What a job looks like when the request does not say
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDefaults {
    pub points: usize,
    pub pattern: CurvePattern,
    pub thickness: u8,
    pub dashed_grid: bool,
    pub title: Option<String>,
    pub footer: Option<String>,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            pattern: CurvePattern::Quadratic,
            thickness: DEFAULT_THICKNESS,
            dashed_grid: true,
            title: Some("Build-up Curve Graph".to_string()),
            footer: Some("PRESSURE".to_string()),
        }
    }
}

impl JobDefaults {
    pub fn to_job(&self, seed: u32) -> GraphJob {
        GraphJob {
            pattern: self.pattern,
            num_points: self.points,
            seed,
            thickness: self.thickness,
            dashed_grid: self.dashed_grid,
            title: self.title.clone(),
            footer: self.footer.clone(),
        }
    }
}

/// Queue and timing of the `listen` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub queue_capacity: usize,
    /// How long the worker waits for a job before idling
    pub idle_timeout_ms: u64,
    /// Status indicator refresh period
    pub status_poll_ms: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            queue_capacity: crate::dispatch::queue::DEFAULT_CAPACITY,
            idle_timeout_ms: 5000,
            status_poll_ms: 100,
        }
    }
}

impl DispatchSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_millis(self.status_poll_ms)
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialSettings,
    pub print: PrintSettings,
    pub layout: GraphLayout,
    pub job: JobDefaults,
    pub dispatch: DispatchSettings,
}

impl AppConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, PressplotError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PressplotError::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: &Path) -> Result<Self, PressplotError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PressplotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PressplotError> {
        self.layout.validate()?;

        for baud in [self.serial.baud, self.serial.command_baud] {
            if !serial::is_supported_baud(baud) {
                return Err(PressplotError::Config(format!(
                    "Unsupported baud rate {} (supported: {:?})",
                    baud,
                    serial::SUPPORTED_BAUD_RATES
                )));
            }
        }
        if self.job.points == 0 {
            return Err(PressplotError::Config("job.points must be at least 1".into()));
        }
        if self.dispatch.queue_capacity == 0 {
            return Err(PressplotError::Config(
                "dispatch.queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_json(
            r#"{
                "serial": { "baud": 9600 },
                "print": { "density": 12 },
                "job": { "pattern": "linear", "title": null }
            }"#,
        )
        .unwrap();

        assert_eq!(config.serial.baud, 9600);
        assert_eq!(config.serial.device, DEFAULT_DEVICE);
        assert_eq!(config.print.density, 12);
        assert_eq!(config.print.line_height, 24);
        assert_eq!(config.job.pattern, CurvePattern::Linear);
        assert_eq!(config.job.title, None);
        assert_eq!(config.job.footer.as_deref(), Some("PRESSURE"));
        assert_eq!(config.layout, GraphLayout::REFERENCE);
    }

    #[test]
    fn test_rejects_unknown_pattern() {
        assert!(AppConfig::from_json(r#"{ "job": { "pattern": "sine" } }"#).is_err());
    }

    #[test]
    fn test_rejects_bad_baud() {
        let result = AppConfig::from_json(r#"{ "serial": { "baud": 12345 } }"#);
        assert!(matches!(result, Err(PressplotError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_layout() {
        let result = AppConfig::from_json(r#"{ "layout": { "y_step": 0 } }"#);
        assert!(matches!(result, Err(PressplotError::Config(_))));
    }

    #[test]
    fn test_defaults_to_job() {
        let job = JobDefaults::default().to_job(99);
        assert_eq!(job.seed, 99);
        assert_eq!(job.num_points, DEFAULT_POINTS);
        assert!(job.dashed_grid);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load(Path::new("/nonexistent/pressplot.json"));
        assert!(matches!(result, Err(PressplotError::Config(_))));
    }
}
