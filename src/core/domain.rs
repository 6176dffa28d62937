use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::metrics::{EnabledMetricSet, MetricCategory};
use crate::core::primitives::Timestamp;
use crate::core::types::MergedSeries;

/// Headroom applied above the largest plotted value.
pub const DEFAULT_Y_PADDING_FACTOR: f64 = 1.1;

/// Smallest value a logarithmic axis may start at.
pub const DEFAULT_LOG_SCALE_FLOOR: f64 = 1.0;

/// Value-axis mapping chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    #[default]
    Linear,
    Logarithmic,
}

impl ScaleMode {
    /// Lower bound of the value axis for this mode.
    #[must_use]
    pub fn lower_bound(self, log_floor: f64) -> f64 {
        match self {
            ScaleMode::Linear => 0.0,
            ScaleMode::Logarithmic => log_floor,
        }
    }
}

/// Axis bounds derived from a merged series.
///
/// Every field except `scale` is `None` when there is nothing to plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainSummary {
    pub t_min: Option<Timestamp>,
    pub t_max: Option<Timestamp>,
    pub y_min: f64,
    pub y_max: Option<f64>,
    pub scale: ScaleMode,
}

impl DomainSummary {
    /// `(t_min, t_max)` when the series has at least one point.
    #[must_use]
    pub fn time_range(&self) -> Option<(Timestamp, Timestamp)> {
        self.t_min.zip(self.t_max)
    }

    /// `(lower, y_max)` when a value axis can be drawn.
    ///
    /// Returns `None` if `y_max` is missing or does not exceed the lower
    /// bound, which would otherwise hand a log axis an empty or inverted range.
    #[must_use]
    pub fn y_domain(&self) -> Option<(f64, f64)> {
        self.y_max
            .filter(|y_max| *y_max > self.y_min)
            .map(|y_max| (self.y_min, y_max))
    }

    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.time_range().is_some() && self.y_domain().is_some()
    }
}

/// Computes time and value bounds for `series`.
///
/// `y_max` is the largest value among enabled, non-reference metrics scaled
/// by `padding_factor`. Bands do not widen it.
#[must_use]
pub fn compute_domain(
    series: &MergedSeries,
    enabled: &EnabledMetricSet,
    scale: ScaleMode,
    padding_factor: f64,
    log_floor: f64,
) -> DomainSummary {
    let t_min = series.iter().map(|point| point.time).min();
    let t_max = series.iter().map(|point| point.time).max();

    let y_max = series
        .iter()
        .flat_map(|point| point.values.iter())
        .filter(|(key, value)| {
            key.category() != MetricCategory::Reference
                && enabled.contains(**key)
                && value.is_finite()
        })
        .map(|(_, value)| OrderedFloat(*value))
        .max()
        .map(|max| max.into_inner() * padding_factor);

    trace!(?t_min, ?t_max, ?y_max, ?scale, "computed domain");
    DomainSummary {
        t_min,
        t_max,
        y_min: scale.lower_bound(log_floor),
        y_max,
        scale,
    }
}
