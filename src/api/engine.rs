use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    DomainSummary, EnabledMetricSet, HospitalCapacity, MergedSeries, MetricKey, ObservationCounts,
    ObservationRecord, ScaleMode, TimePoint, Trajectory, WindowedObservations, compute_domain,
    merge_series, normalize_trajectory, window_observations,
};
use crate::error::ChartResult;
use crate::extensions::{MitigationInterval, clamp_intervals};

use super::{DerivationConfig, SeriesDescriptor, plan_series};

/// Everything one recompute reads.
///
/// Large inputs sit behind `Arc` so unchanged data can be recognized by
/// identity and shared between cycles without copying.
#[derive(Debug, Clone, Default)]
pub struct ChartInputs {
    pub trajectory: Arc<Trajectory>,
    pub observations: Arc<Vec<ObservationRecord>>,
    pub intervals: Arc<Vec<MitigationInterval>>,
    pub capacity: HospitalCapacity,
    pub enabled: EnabledMetricSet,
    pub scale: ScaleMode,
    /// Display flag for the number formatter, forwarded untouched.
    pub humanize: bool,
}

impl ChartInputs {
    #[must_use]
    pub fn new(trajectory: impl Into<Arc<Trajectory>>) -> Self {
        Self {
            trajectory: trajectory.into(),
            enabled: EnabledMetricSet::all(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_observations(
        mut self,
        observations: impl Into<Arc<Vec<ObservationRecord>>>,
    ) -> Self {
        self.observations = observations.into();
        self
    }

    #[must_use]
    pub fn with_intervals(mut self, intervals: impl Into<Arc<Vec<MitigationInterval>>>) -> Self {
        self.intervals = intervals.into();
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: HospitalCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: EnabledMetricSet) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: ScaleMode) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_humanize(mut self, humanize: bool) -> Self {
        self.humanize = humanize;
        self
    }

    /// Flips one metric and returns its new visibility.
    pub fn toggle_metric(&mut self, key: MetricKey) -> bool {
        self.enabled.toggle(key)
    }

    /// True when `other` would produce the same output.
    ///
    /// Shared data is compared by `Arc` identity, everything else by value.
    #[must_use]
    pub fn same_as(&self, other: &ChartInputs) -> bool {
        Arc::ptr_eq(&self.trajectory, &other.trajectory)
            && Arc::ptr_eq(&self.observations, &other.observations)
            && Arc::ptr_eq(&self.intervals, &other.intervals)
            && self.capacity == other.capacity
            && self.enabled == other.enabled
            && self.scale == other.scale
            && self.humanize == other.humanize
    }
}

/// Plot-ready result of one recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOutput {
    pub series: MergedSeries,
    pub domain: DomainSummary,
    /// Mitigation intervals clipped to the plotted time range.
    pub intervals: Vec<MitigationInterval>,
    pub plan: Vec<SeriesDescriptor>,
    pub observation_counts: ObservationCounts,
    pub humanize: bool,
}

impl ChartOutput {
    /// False when the renderer should draw nothing at all.
    #[must_use]
    pub fn should_render(&self) -> bool {
        !self.series.is_empty() && self.domain.is_renderable()
    }
}

/// Derives the full chart output from scratch.
///
/// Deterministic: the same inputs and config always give an equal output.
pub fn recompute(inputs: &ChartInputs, config: &DerivationConfig) -> ChartResult<ChartOutput> {
    let config = config.validate()?;
    let (computed, observed) = derive_stages(inputs, &config);
    let computed = computed?;
    let WindowedObservations { points, counts } = observed;

    let series = merge_series(computed, points);
    let domain = compute_domain(
        &series,
        &inputs.enabled,
        inputs.scale,
        config.y_padding_factor,
        config.log_scale_floor,
    );
    let intervals = clamp_intervals(&inputs.intervals, &domain);
    let plan = plan_series(&inputs.enabled, &counts, inputs.capacity);

    debug!(
        points = series.len(),
        series_planned = plan.len(),
        intervals = intervals.len(),
        renderable = domain.is_renderable(),
        "recomputed chart output"
    );
    Ok(ChartOutput {
        series,
        domain,
        intervals,
        plan,
        observation_counts: counts,
        humanize: inputs.humanize,
    })
}

#[cfg(not(feature = "parallel-derivation"))]
fn derive_stages(
    inputs: &ChartInputs,
    config: &DerivationConfig,
) -> (ChartResult<Vec<TimePoint>>, WindowedObservations) {
    let computed = normalize_trajectory(&inputs.trajectory, inputs.capacity, &inputs.enabled);
    let observed = window_observations(
        &inputs.observations,
        &inputs.enabled,
        config.new_cases_window,
    );
    (computed, observed)
}

#[cfg(feature = "parallel-derivation")]
fn derive_stages(
    inputs: &ChartInputs,
    config: &DerivationConfig,
) -> (ChartResult<Vec<TimePoint>>, WindowedObservations) {
    rayon::join(
        || normalize_trajectory(&inputs.trajectory, inputs.capacity, &inputs.enabled),
        || {
            window_observations(
                &inputs.observations,
                &inputs.enabled,
                config.new_cases_window,
            )
        },
    )
}

/// Runtime metrics exposed by the engine's recompute cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecomputeCacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct CachedRecompute {
    inputs: ChartInputs,
    output: Arc<ChartOutput>,
}

/// Memoizing front end for [`recompute`].
///
/// Holds the last output and returns it while inputs are unchanged. Any
/// change recomputes from scratch and replaces the cached entry wholesale.
#[derive(Debug, Default)]
pub struct ChartEngine {
    config: DerivationConfig,
    cache: Option<CachedRecompute>,
    stats: RecomputeCacheStats,
}

impl ChartEngine {
    pub fn new(config: DerivationConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            cache: None,
            stats: RecomputeCacheStats::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> DerivationConfig {
        self.config
    }

    /// Replaces the derivation config and drops the cached output.
    pub fn set_config(&mut self, config: DerivationConfig) -> ChartResult<()> {
        self.config = config.validate()?;
        self.invalidate();
        Ok(())
    }

    pub fn recompute(&mut self, inputs: &ChartInputs) -> ChartResult<Arc<ChartOutput>> {
        if let Some(cached) = &self.cache {
            if cached.inputs.same_as(inputs) {
                self.stats.hits += 1;
                trace!(hits = self.stats.hits, "recompute cache hit");
                return Ok(Arc::clone(&cached.output));
            }
        }

        self.stats.misses += 1;
        trace!(misses = self.stats.misses, "recompute cache miss");
        let output = Arc::new(recompute(inputs, &self.config)?);
        self.cache = Some(CachedRecompute {
            inputs: inputs.clone(),
            output: Arc::clone(&output),
        });
        Ok(output)
    }

    #[must_use]
    pub fn cached_output(&self) -> Option<Arc<ChartOutput>> {
        self.cache.as_ref().map(|cached| Arc::clone(&cached.output))
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    #[must_use]
    pub fn cache_stats(&self) -> RecomputeCacheStats {
        self.stats
    }
}
