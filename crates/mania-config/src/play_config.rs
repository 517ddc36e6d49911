use std::path::Path;

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

pub const TPS_MIN: u32 = 60;
pub const TPS_MAX: u32 = 1000;
pub const LEAD_MAX: i64 = 10000;
pub const OFFSET_MIN: i64 = -1000;
pub const OFFSET_MAX: i64 = 1000;
pub const SPEED_MIN: f64 = 0.05;
pub const SPEED_MAX: f64 = 10.0;
pub const SCREEN_HEIGHT_MIN: f64 = 240.0;
pub const SCREEN_HEIGHT_MAX: f64 = 8640.0;
pub const POSITION_MARGIN_MAX: f64 = 1000.0;
pub const DRIFT_WARN_MIN: i64 = 1;
pub const DRIFT_WARN_MAX: i64 = 10000;
pub const JUDGE_MIN: i64 = 1;
pub const JUDGE_MAX: i64 = 1000;

/// Judgment tolerances in milliseconds, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct JudgmentTolerances {
    pub kool: i64,
    pub cool: i64,
    pub good: i64,
    pub bad: i64,
    pub miss: i64,
}

impl Default for JudgmentTolerances {
    fn default() -> Self {
        Self {
            kool: 16,
            cool: 40,
            good: 70,
            bad: 100,
            miss: 150,
        }
    }
}

impl JudgmentTolerances {
    pub fn as_array(&self) -> [i64; 5] {
        [self.kool, self.cool, self.good, self.bad, self.miss]
    }

    /// Clamp each tolerance into range, then push looser windows out so every
    /// window is at least 1 ms wider than the one before it.
    pub fn validate(&mut self) {
        let slots = [
            &mut self.kool,
            &mut self.cool,
            &mut self.good,
            &mut self.bad,
            &mut self.miss,
        ];
        let count = slots.len() as i64;
        let mut floor = JUDGE_MIN;
        for (i, slot) in slots.into_iter().enumerate() {
            let ceiling = JUDGE_MAX - (count - 1 - i as i64);
            *slot = (*slot).clamp(floor, ceiling);
            floor = *slot + 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PlayConfig {
    pub ticks_per_second: u32,
    pub lead_in_ms: i64,
    pub lead_out_ms: i64,
    /// Audio latency offset
    pub offset_ms: i64,
    /// Scroll speed in pixels per millisecond
    pub speed: f64,
    pub reverse: bool,
    pub screen_height: f64,
    /// Hit line as a fraction of the screen height, measured from the top
    pub hit_position: f64,
    /// Extra pixels past both screen edges; at least half the tallest sprite
    pub position_margin: f64,
    pub drift_warn_ms: i64,
    pub judgment: JudgmentTolerances,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 1000,
            lead_in_ms: 1800,
            lead_out_ms: 1800,
            offset_ms: 0,
            speed: 1.0,
            reverse: false,
            screen_height: 1080.0,
            hit_position: 0.90,
            position_margin: 100.0,
            drift_warn_ms: 50,
            judgment: JudgmentTolerances::default(),
        }
    }
}

/// `f64::clamp` keeps NaN, which would poison every position.
fn clamp_f64(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl PlayConfig {
    pub fn validate(&mut self) {
        let defaults = Self::default();
        self.ticks_per_second = self.ticks_per_second.clamp(TPS_MIN, TPS_MAX);
        self.lead_in_ms = self.lead_in_ms.clamp(0, LEAD_MAX);
        self.lead_out_ms = self.lead_out_ms.clamp(0, LEAD_MAX);
        self.offset_ms = self.offset_ms.clamp(OFFSET_MIN, OFFSET_MAX);
        self.speed = clamp_f64(self.speed, SPEED_MIN, SPEED_MAX, defaults.speed);
        self.screen_height = clamp_f64(
            self.screen_height,
            SCREEN_HEIGHT_MIN,
            SCREEN_HEIGHT_MAX,
            defaults.screen_height,
        );
        self.hit_position = clamp_f64(self.hit_position, 0.0, 1.0, defaults.hit_position);
        self.position_margin = clamp_f64(
            self.position_margin,
            0.0,
            POSITION_MARGIN_MAX,
            defaults.position_margin,
        );
        self.drift_warn_ms = self.drift_warn_ms.clamp(DRIFT_WARN_MIN, DRIFT_WARN_MAX);
        self.judgment.validate();
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut config: PlayConfig = serde_json::from_str(&data)?;
        config.validate();
        debug!("Loaded play config from {}", path.display());
        Ok(config)
    }

    /// Read config from a JSON file, or the defaults when it does not exist.
    pub fn read_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::read(path)
        } else {
            debug!("No play config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PlayConfig::default();
        assert_eq!(config.ticks_per_second, 1000);
        assert_eq!(config.lead_in_ms, 1800);
        assert_eq!(config.lead_out_ms, 1800);
        assert_eq!(config.offset_ms, 0);
        assert_eq!(config.speed, 1.0);
        assert!(!config.reverse);
        assert_eq!(config.screen_height, 1080.0);
        assert_eq!(config.hit_position, 0.90);
        assert_eq!(config.position_margin, 100.0);
        assert_eq!(config.drift_warn_ms, 50);
        assert_eq!(config.judgment.as_array(), [16, 40, 70, 100, 150]);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = PlayConfig {
            ticks_per_second: 5000,
            lead_in_ms: -5,
            lead_out_ms: 20000,
            offset_ms: -4000,
            speed: 0.0,
            screen_height: 100.0,
            hit_position: 1.5,
            position_margin: f64::NAN,
            drift_warn_ms: 0,
            ..Default::default()
        };
        config.validate();

        assert_eq!(config.ticks_per_second, TPS_MAX);
        assert_eq!(config.lead_in_ms, 0);
        assert_eq!(config.lead_out_ms, LEAD_MAX);
        assert_eq!(config.offset_ms, OFFSET_MIN);
        assert_eq!(config.speed, SPEED_MIN);
        assert_eq!(config.screen_height, SCREEN_HEIGHT_MIN);
        assert_eq!(config.hit_position, 1.0);
        assert_eq!(config.position_margin, 100.0);
        assert_eq!(config.drift_warn_ms, DRIFT_WARN_MIN);
    }

    #[test]
    fn test_validate_keeps_defaults() {
        let mut config = PlayConfig::default();
        config.validate();
        assert_eq!(config, PlayConfig::default());
    }

    #[test]
    fn test_judgment_forced_increasing() {
        let mut j = JudgmentTolerances {
            kool: 40,
            cool: 40,
            good: 10,
            bad: 0,
            miss: 5000,
        };
        j.validate();
        assert_eq!(j.as_array(), [40, 41, 42, 43, 1000]);
    }

    #[test]
    fn test_judgment_ceiling_leaves_room() {
        let mut j = JudgmentTolerances {
            kool: 2000,
            cool: 2000,
            good: 2000,
            bad: 2000,
            miss: 2000,
        };
        j.validate();
        assert_eq!(j.as_array(), [996, 997, 998, 999, 1000]);
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let config = PlayConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"ticksPerSecond\""));
        assert!(json.contains("\"positionMargin\""));
        assert!(!json.contains("\"lead_in_ms\""));
    }

    #[test]
    fn test_serde_default_fills_missing_fields() {
        let json = r#"{"speed": 2.5, "judgment": {"kool": 10}}"#;
        let config: PlayConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.speed, 2.5);
        assert_eq!(config.lead_in_ms, 1800);
        assert_eq!(config.judgment.kool, 10);
        assert_eq!(config.judgment.cool, 40);
    }

    #[test]
    fn test_read_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");

        let config = PlayConfig {
            speed: 3.0,
            reverse: true,
            offset_ms: -20,
            ..Default::default()
        };
        config.write(&path).unwrap();

        let loaded = PlayConfig::read(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_read_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        std::fs::write(&path, r#"{"ticksPerSecond": 1}"#).unwrap();

        let loaded = PlayConfig::read(&path).unwrap();
        assert_eq!(loaded.ticks_per_second, TPS_MIN);
    }

    #[test]
    fn test_read_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayConfig::read_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, PlayConfig::default());
    }

    #[test]
    fn test_read_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(PlayConfig::read(&path).is_err());
    }
}
