use serde::{Deserialize, Serialize};

use crate::core::{
    EnabledMetricSet, HospitalCapacity, MetricCategory, MetricKey, MetricStyle, ObservationCounts,
};

/// One series the renderer should draw, with its legend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub key: MetricKey,
    pub name: String,
    pub color: String,
    pub style: MetricStyle,
    /// Whether an uncertainty area accompanies the line.
    pub has_band: bool,
}

impl SeriesDescriptor {
    fn from_key(key: MetricKey) -> Self {
        let info = key.info();
        Self {
            key,
            name: info.name.to_owned(),
            color: info.color.to_owned(),
            style: info.style,
            has_band: info.category == MetricCategory::Computed,
        }
    }
}

/// Decides which enabled metrics are worth surfacing, in catalog order.
///
/// Observed metrics without a single data-bearing record are omitted, as are
/// capacity lines whose capacity is not strictly positive.
#[must_use]
pub fn plan_series(
    enabled: &EnabledMetricSet,
    counts: &ObservationCounts,
    capacity: HospitalCapacity,
) -> Vec<SeriesDescriptor> {
    MetricKey::ALL
        .into_iter()
        .filter(|key| enabled.contains(*key))
        .filter(|key| match key.category() {
            MetricCategory::Computed => true,
            MetricCategory::Observed => counts.has_data(*key),
            MetricCategory::Reference => capacity.value(*key).is_some(),
        })
        .map(SeriesDescriptor::from_key)
        .collect()
}
