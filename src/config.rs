//! Timeline options, loaded from an optional JSON file and overridden from
//! the command line.

use crate::error::Result;
use crate::scale::TickFormat;
use crate::tree::DomainOverride;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HEIGHT: f32 = 800.0;
pub const DEFAULT_EVENT_HEIGHT: f32 = 20.0;
pub const DEFAULT_RESIZE_THROTTLE_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Viewport height in pixels.
    pub height: f32,
    /// Row height in pixels.
    pub event_height: f32,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub tick_format: TickFormat,
    pub resize_throttle: Duration,
    /// Keep collapse state by id when the data is replaced.
    pub retain_collapse: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            event_height: DEFAULT_EVENT_HEIGHT,
            start: None,
            end: None,
            tick_format: TickFormat::default(),
            resize_throttle: Duration::from_millis(DEFAULT_RESIZE_THROTTLE_MS),
            retain_collapse: false,
        }
    }
}

impl TimelineConfig {
    pub fn domain(&self) -> DomainOverride {
        DomainOverride {
            start: self.start,
            end: self.end,
        }
    }

    /// Apply every option set in `overrides`.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(height) = overrides.height {
            match positive(height) {
                Some(height) => self.height = height,
                None => log::warn!("ignoring height {height}, expected a positive number"),
            }
        }
        if let Some(event_height) = overrides.event_height {
            match positive(event_height) {
                Some(event_height) => self.event_height = event_height,
                None => {
                    log::warn!("ignoring event_height {event_height}, expected a positive number")
                }
            }
        }
        if overrides.start.is_some() {
            self.start = overrides.start;
        }
        if overrides.end.is_some() {
            self.end = overrides.end;
        }
        if let Some(unit) = &overrides.tick_unit {
            self.tick_format = TickFormat::suffix(unit.clone());
        }
        if let Some(ms) = overrides.resize_throttle {
            self.resize_throttle = Duration::from_millis(ms);
        }
        if let Some(retain) = overrides.retain_collapse {
            self.retain_collapse = retain;
        }
    }
}

fn positive(value: f32) -> Option<f32> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Partial configuration as read from a config file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub height: Option<f32>,
    pub event_height: Option<f32>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub tick_unit: Option<String>,
    /// Milliseconds.
    pub resize_throttle: Option<u64>,
    pub retain_collapse: Option<bool>,
}

impl ConfigOverrides {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let overrides = serde_json::from_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TimelineConfig::default();
        assert_eq!(config.height, 800.0);
        assert_eq!(config.event_height, 20.0);
        assert_eq!(config.resize_throttle, Duration::from_millis(50));
        assert_eq!(config.tick_format.format(250.0), "250ms");
        assert_eq!(config.domain(), DomainOverride::default());
        assert!(!config.retain_collapse);
    }

    #[test]
    fn parses_partial_file() {
        let overrides: ConfigOverrides =
            serde_json::from_str(r#"{ "event_height": 24, "tick_unit": "us", "start": 0 }"#)
                .unwrap();
        let mut config = TimelineConfig::default();
        config.apply(&overrides);
        assert_eq!(config.event_height, 24.0);
        assert_eq!(config.height, 800.0);
        assert_eq!(config.start, Some(0.0));
        assert_eq!(config.end, None);
        assert_eq!(config.tick_format.format(3.0), "3us");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = serde_json::from_str::<ConfigOverrides>(r#"{ "heigth": 10 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn later_overrides_win() {
        let mut config = TimelineConfig::default();
        config.apply(&ConfigOverrides {
            height: Some(600.0),
            resize_throttle: Some(100),
            ..Default::default()
        });
        config.apply(&ConfigOverrides {
            height: Some(400.0),
            retain_collapse: Some(true),
            ..Default::default()
        });
        assert_eq!(config.height, 400.0);
        assert_eq!(config.resize_throttle, Duration::from_millis(100));
        assert!(config.retain_collapse);
    }

    #[test]
    fn rejects_non_positive_heights() {
        let mut config = TimelineConfig::default();
        for bad in [0.0, -20.0, f32::NAN, f32::INFINITY] {
            config.apply(&ConfigOverrides {
                height: Some(bad),
                event_height: Some(bad),
                ..Default::default()
            });
        }
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.event_height, DEFAULT_EVENT_HEIGHT);
    }
}
