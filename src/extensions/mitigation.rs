use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{DomainSummary, Timestamp};

/// Time span of an intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }
}

/// Intervention drawn as a shaded overlay band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationInterval {
    pub id: String,
    pub name: String,
    pub color: String,
    pub time_range: TimeRange,
    /// Transmission reduction in percent, nominally `0..=100`.
    ///
    /// JSON has no NaN, so serde_json writes it as `null`; `null` reads back as NaN.
    #[serde(deserialize_with = "strength_or_nan")]
    pub strength: f64,
}

fn strength_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl MitigationInterval {
    #[must_use]
    pub fn new(id: impl Into<String>, time_range: TimeRange, strength: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            color: String::from("#cccccc"),
            time_range,
            strength,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Returns a copy of `interval` fitted to the plotted domain.
///
/// Start and end are clamped into `[t_min, t_max]` and strength into
/// `[0, 100]`. When the domain has no time range the interval is returned
/// unchanged. Out-of-range input is never rejected.
#[must_use]
pub fn clamp_interval(interval: &MitigationInterval, domain: &DomainSummary) -> MitigationInterval {
    let Some((t_min, t_max)) = domain.time_range() else {
        return interval.clone();
    };

    let mut clipped = interval.clone();
    clipped.time_range = TimeRange {
        start: interval.time_range.start.clamp(t_min, t_max),
        end: interval.time_range.end.clamp(t_min, t_max),
    };
    clipped.strength = clamp_strength(interval.strength);
    clipped
}

#[must_use]
pub fn clamp_intervals(
    intervals: &[MitigationInterval],
    domain: &DomainSummary,
) -> Vec<MitigationInterval> {
    intervals
        .iter()
        .map(|interval| clamp_interval(interval, domain))
        .collect()
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        return 0.0;
    }
    strength.clamp(0.0, 100.0)
}
