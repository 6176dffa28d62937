use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_LOG_SCALE_FLOOR, DEFAULT_NEW_CASES_WINDOW, DEFAULT_Y_PADDING_FACTOR};
use crate::error::{ChartError, ChartResult};

/// Tuning for the derivation stages.
///
/// Defaults reproduce the chart's fixed behavior: a three-record new-case
/// window, 10% headroom above the largest value, and a log axis starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivationConfig {
    #[serde(default = "default_new_cases_window")]
    pub new_cases_window: usize,
    #[serde(default = "default_y_padding_factor")]
    pub y_padding_factor: f64,
    #[serde(default = "default_log_scale_floor")]
    pub log_scale_floor: f64,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            new_cases_window: default_new_cases_window(),
            y_padding_factor: default_y_padding_factor(),
            log_scale_floor: default_log_scale_floor(),
        }
    }
}

impl DerivationConfig {
    #[must_use]
    pub fn with_new_cases_window(mut self, window: usize) -> Self {
        self.new_cases_window = window;
        self
    }

    #[must_use]
    pub fn with_y_padding_factor(mut self, factor: f64) -> Self {
        self.y_padding_factor = factor;
        self
    }

    #[must_use]
    pub fn with_log_scale_floor(mut self, floor: f64) -> Self {
        self.log_scale_floor = floor;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.new_cases_window == 0 {
            return Err(ChartError::InvalidConfig(
                "new-case window must be >= 1".to_owned(),
            ));
        }
        if !self.y_padding_factor.is_finite() || self.y_padding_factor < 1.0 {
            return Err(ChartError::InvalidConfig(
                "y padding factor must be finite and >= 1".to_owned(),
            ));
        }
        if !self.log_scale_floor.is_finite() || self.log_scale_floor <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "log scale floor must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to parse derivation config: {e}"))
        })?;
        config.validate()
    }
}

fn default_new_cases_window() -> usize {
    DEFAULT_NEW_CASES_WINDOW
}

fn default_y_padding_factor() -> f64 {
    DEFAULT_Y_PADDING_FACTOR
}

fn default_log_scale_floor() -> f64 {
    DEFAULT_LOG_SCALE_FLOOR
}
