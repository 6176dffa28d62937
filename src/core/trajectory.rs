use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::metrics::{EnabledMetricSet, MetricCategory, MetricKey};
use crate::core::primitives::{Timestamp, positive, present_rounded, round_half_up};
use crate::core::types::{Band, TimePoint};
use crate::error::{ChartError, ChartResult};

/// Population total of a single compartment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompartmentTotal {
    pub total: f64,
}

impl From<f64> for CompartmentTotal {
    fn from(total: f64) -> Self {
        Self { total }
    }
}

/// Compartment occupancy at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentState {
    pub susceptible: CompartmentTotal,
    pub exposed: CompartmentTotal,
    pub infectious: CompartmentTotal,
    pub severe: CompartmentTotal,
    pub critical: CompartmentTotal,
    pub overflow: CompartmentTotal,
}

/// Running totals since the start of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CumulativeState {
    pub recovered: CompartmentTotal,
    pub hospitalized: CompartmentTotal,
    pub critical: CompartmentTotal,
    pub fatality: CompartmentTotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: Timestamp,
    #[serde(default)]
    pub current: CurrentState,
    #[serde(default)]
    pub cumulative: CumulativeState,
}

impl TrajectorySample {
    #[must_use]
    pub fn new(time: Timestamp) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Compartment total backing a computed metric.
    ///
    /// Returns `None` for observed and reference metrics.
    #[must_use]
    pub fn total(&self, key: MetricKey) -> Option<f64> {
        let total = match key {
            MetricKey::Susceptible => self.current.susceptible,
            MetricKey::Exposed => self.current.exposed,
            MetricKey::Infectious => self.current.infectious,
            MetricKey::Severe => self.current.severe,
            MetricKey::Critical => self.current.critical,
            MetricKey::Overflow => self.current.overflow,
            MetricKey::Recovered => self.cumulative.recovered,
            MetricKey::Fatality => self.cumulative.fatality,
            _ => return None,
        };
        Some(total.total)
    }

    /// Sets the compartment behind a computed metric; other keys are ignored.
    #[must_use]
    pub fn with_total(mut self, key: MetricKey, total: f64) -> Self {
        let total = CompartmentTotal::from(total);
        match key {
            MetricKey::Susceptible => self.current.susceptible = total,
            MetricKey::Exposed => self.current.exposed = total,
            MetricKey::Infectious => self.current.infectious = total,
            MetricKey::Severe => self.current.severe = total,
            MetricKey::Critical => self.current.critical = total,
            MetricKey::Overflow => self.current.overflow = total,
            MetricKey::Recovered => self.cumulative.recovered = total,
            MetricKey::Fatality => self.cumulative.fatality = total,
            _ => {}
        }
        self
    }
}

/// Simulated trajectory with its uncertainty envelope.
///
/// `mean`, `lower` and `upper` are index-aligned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub mean: Vec<TrajectorySample>,
    pub lower: Vec<TrajectorySample>,
    pub upper: Vec<TrajectorySample>,
}

impl Trajectory {
    #[must_use]
    pub fn new(
        mean: Vec<TrajectorySample>,
        lower: Vec<TrajectorySample>,
        upper: Vec<TrajectorySample>,
    ) -> Self {
        Self { mean, lower, upper }
    }

    /// Trajectory without an envelope: every band collapses onto the mean.
    #[must_use]
    pub fn from_mean(mean: Vec<TrajectorySample>) -> Self {
        Self {
            lower: mean.clone(),
            upper: mean.clone(),
            mean,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.mean.len() != self.lower.len() || self.mean.len() != self.upper.len() {
            return Err(ChartError::MisalignedTrajectory {
                mean: self.mean.len(),
                lower: self.lower.len(),
                upper: self.upper.len(),
            });
        }
        Ok(())
    }
}

/// Scenario bed capacity shown as reference lines.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HospitalCapacity {
    pub hospital_beds: f64,
    pub icu_beds: f64,
}

impl HospitalCapacity {
    #[must_use]
    pub fn new(hospital_beds: f64, icu_beds: f64) -> Self {
        Self {
            hospital_beds,
            icu_beds,
        }
    }

    /// Capacity behind a reference metric, kept only when strictly positive.
    #[must_use]
    pub fn value(self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::HospitalBeds => positive(self.hospital_beds),
            MetricKey::IcuBeds => positive(self.icu_beds),
            _ => None,
        }
    }
}

/// Converts the trajectory into one [`TimePoint`] per sample, in sample order.
///
/// Only enabled computed metrics are extracted. Each rounded mean that is
/// non-zero becomes a value, and its rounded `[lower, upper]` becomes the band.
/// Enabled reference metrics are attached to every point when their capacity
/// is strictly positive.
pub fn normalize_trajectory(
    trajectory: &Trajectory,
    capacity: HospitalCapacity,
    enabled: &EnabledMetricSet,
) -> ChartResult<Vec<TimePoint>> {
    trajectory.validate()?;

    let computed: Vec<MetricKey> = enabled.of_category(MetricCategory::Computed).collect();
    let references: Vec<(MetricKey, f64)> = enabled
        .of_category(MetricCategory::Reference)
        .filter_map(|key| capacity.value(key).map(|value| (key, value)))
        .collect();

    let mut points = Vec::with_capacity(trajectory.len());
    let mut skipped = 0_usize;
    for ((mean, lower), upper) in trajectory
        .mean
        .iter()
        .zip(&trajectory.lower)
        .zip(&trajectory.upper)
    {
        let mut point = TimePoint::new(mean.time);
        for &key in &computed {
            let Some(value) = mean.total(key).and_then(present_rounded) else {
                continue;
            };
            point.values.insert(key, value);
            if let (Some(low), Some(high)) = (lower.total(key), upper.total(key)) {
                if low.is_finite() && high.is_finite() {
                    point.bands.insert(key, Band::new(round_half_up(low), round_half_up(high)));
                } else {
                    skipped += 1;
                }
            }
        }
        for &(key, value) in &references {
            point.values.insert(key, value);
        }
        points.push(point);
    }

    if skipped > 0 {
        warn!(skipped, "dropped non-finite trajectory bands");
    }
    debug!(
        samples = trajectory.len(),
        computed_metrics = computed.len(),
        reference_metrics = references.len(),
        "normalized trajectory"
    );
    Ok(points)
}
