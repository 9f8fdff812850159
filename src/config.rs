use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Axis, PostStatus};

/// Axis weights on a 0..=100 scale. They sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    pub h: f64,
    pub q: f64,
    pub c: f64,
}

impl AxisWeights {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::H => self.h,
            Axis::Q => self.q,
            Axis::C => self.c,
        }
    }

    pub fn sum(&self) -> f64 {
        self.h + self.q + self.c
    }

    fn check(&self) -> Result<(), ConfigError> {
        if [self.h, self.q, self.c]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(ConfigError::Invalid(
                "axis weights must be finite and non-negative".to_string(),
            ));
        }
        if (self.sum() - 100.0).abs() > 0.01 {
            return Err(ConfigError::Invalid(format!(
                "axis weights must sum to 100, got {}",
                self.sum()
            )));
        }
        Ok(())
    }
}

impl Default for AxisWeights {
    fn default() -> Self {
        WeightPreset::Balanced.weights()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPreset {
    #[default]
    Balanced,
    HumanFocus,
    QualityFocus,
    SeoFocus,
}

impl WeightPreset {
    pub fn weights(self) -> AxisWeights {
        let (h, q, c) = match self {
            WeightPreset::Balanced => (33.0, 34.0, 33.0),
            WeightPreset::HumanFocus => (45.0, 30.0, 25.0),
            WeightPreset::QualityFocus => (30.0, 45.0, 25.0),
            WeightPreset::SeoFocus => (25.0, 30.0, 45.0),
        };
        AxisWeights { h, q, c }
    }
}

/// Plugin settings, loaded once and passed into the components that need them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hqc_enabled: bool,
    /// Stored as a percentage, consumed as a fraction.
    pub hqc_threshold: f64,
    pub weight_preset: WeightPreset,
    pub custom_weights: Option<AxisWeights>,
    pub max_regeneration_attempts: u32,
    pub default_model: String,
    pub allow_legacy_models: bool,
    pub require_location: bool,
    pub learning_enabled: bool,
    pub learning_window: usize,
    pub default_post_status: PostStatus,
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hqc_enabled: true,
            hqc_threshold: 50.0,
            weight_preset: WeightPreset::default(),
            custom_weights: None,
            max_regeneration_attempts: 3,
            default_model: "gpt-4o".to_string(),
            allow_legacy_models: false,
            require_location: false,
            learning_enabled: false,
            learning_window: 20,
            default_post_status: PostStatus::Draft,
            request_timeout_secs: 120,
            temperature: 0.7,
            max_tokens: 8000,
            batch_size: 1,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.hqc_threshold) {
            return Err(ConfigError::Invalid(format!(
                "hqc_threshold must be within 0..=100, got {}",
                self.hqc_threshold
            )));
        }
        if let Some(weights) = &self.custom_weights {
            weights.check()?;
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::Invalid("default_model is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn hqc_threshold_fraction(&self) -> f64 {
        self.hqc_threshold / 100.0
    }

    pub fn axis_weights(&self) -> AxisWeights {
        self.custom_weights
            .unwrap_or_else(|| self.weight_preset.weights())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_sum_to_100() {
        for preset in [
            WeightPreset::Balanced,
            WeightPreset::HumanFocus,
            WeightPreset::QualityFocus,
            WeightPreset::SeoFocus,
        ] {
            assert!((preset.weights().sum() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s = Settings::from_json_str(r#"{"hqc_threshold": 65, "weight_preset": "seo_focus"}"#)
            .unwrap();
        assert!((s.hqc_threshold_fraction() - 0.65).abs() < 1e-9);
        assert_eq!(s.axis_weights(), WeightPreset::SeoFocus.weights());
        assert_eq!(s.max_regeneration_attempts, 3);
        assert_eq!(s.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn custom_weights_override_preset() {
        let s = Settings::from_json_str(
            r#"{"custom_weights": {"h": 50, "q": 25, "c": 25}, "weight_preset": "seo_focus"}"#,
        )
        .unwrap();
        assert_eq!(s.axis_weights().h, 50.0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Settings::from_json_str(r#"{"hqc_threshold": 150}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json_str(r#"{"custom_weights": {"h": 50, "q": 50, "c": 50}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"learning_enabled": true, "batch_size": 2}"#).unwrap();
        let s = Settings::load(&path).unwrap();
        assert!(s.learning_enabled);
        assert_eq!(s.batch_size, 2);

        let missing = Settings::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
