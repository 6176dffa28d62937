use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::core::metrics::{EnabledMetricSet, MetricKey};
use crate::core::primitives::{Timestamp, parse_timestamp, truthy};
use crate::core::types::TimePoint;
use crate::error::ChartResult;

/// Number of filtered records spanned by the rolling new-case delta.
pub const DEFAULT_NEW_CASES_WINDOW: usize = 3;

/// Sparse empirical report for one day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time: Timestamp,
    #[serde(default)]
    pub cases: Option<f64>,
    #[serde(default)]
    pub deaths: Option<f64>,
    #[serde(default)]
    pub hospitalized: Option<f64>,
    #[serde(default)]
    pub icu: Option<f64>,
}

impl ObservationRecord {
    #[must_use]
    pub fn new(time: Timestamp) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Builds a record dated by `YYYY-MM-DD` or an RFC 3339 string.
    pub fn dated(date: &str) -> ChartResult<Self> {
        Ok(Self::new(parse_timestamp(date)?))
    }

    #[must_use]
    pub fn with_cases(mut self, cases: f64) -> Self {
        self.cases = Some(cases);
        self
    }

    #[must_use]
    pub fn with_deaths(mut self, deaths: f64) -> Self {
        self.deaths = Some(deaths);
        self
    }

    #[must_use]
    pub fn with_hospitalized(mut self, hospitalized: f64) -> Self {
        self.hospitalized = Some(hospitalized);
        self
    }

    #[must_use]
    pub fn with_icu(mut self, icu: f64) -> Self {
        self.icu = Some(icu);
        self
    }

    /// Raw count behind an observed metric. New cases are derived, not stored.
    #[must_use]
    pub fn count(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::ObservedCases => self.cases,
            MetricKey::ObservedDeaths => self.deaths,
            MetricKey::ObservedHospitalized => self.hospitalized,
            MetricKey::ObservedIcu => self.icu,
            _ => None,
        }
    }

    /// True when at least one count carries data.
    #[must_use]
    pub fn has_any_count(&self) -> bool {
        [self.cases, self.deaths, self.hospitalized, self.icu]
            .into_iter()
            .any(|count| truthy(count).is_some())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => Ok(millis),
        RawTimestamp::Text(text) => parse_timestamp(&text).map_err(serde::de::Error::custom),
    }
}

/// Number of records carrying data for each observed metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObservationCounts {
    pub cases: usize,
    pub deaths: usize,
    pub hospitalized: usize,
    pub icu: usize,
    pub new_cases: usize,
}

impl ObservationCounts {
    #[must_use]
    pub fn get(&self, key: MetricKey) -> usize {
        match key {
            MetricKey::ObservedCases => self.cases,
            MetricKey::ObservedDeaths => self.deaths,
            MetricKey::ObservedHospitalized => self.hospitalized,
            MetricKey::ObservedIcu => self.icu,
            MetricKey::ObservedNewCases => self.new_cases,
            _ => 0,
        }
    }

    #[must_use]
    pub fn has_data(&self, key: MetricKey) -> bool {
        self.get(key) > 0
    }
}

/// Output of the observation stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowedObservations {
    /// One point per retained record, in record order.
    pub points: Vec<TimePoint>,
    pub counts: ObservationCounts,
}

/// Drops records whose four counts are all missing or zero.
#[must_use]
pub fn filter_observations(records: &[ObservationRecord]) -> Vec<ObservationRecord> {
    records
        .iter()
        .copied()
        .filter(|record| record.has_any_count())
        .collect()
}

/// Cases reported over the last `window` retained records.
///
/// `filtered` must already have passed [`filter_observations`]: the window
/// counts records, not days, so irregular reporting stretches it in time.
/// Defined for `index >= window` when both endpoints report cases and the
/// difference is strictly positive.
#[must_use]
pub fn new_cases_at(filtered: &[ObservationRecord], index: usize, window: usize) -> Option<f64> {
    if window == 0 || index < window || index >= filtered.len() {
        return None;
    }
    let current = truthy(filtered[index].cases)?;
    let previous = truthy(filtered[index - window].cases)?;
    let delta = current - previous;
    (delta > 0.0).then_some(delta)
}

/// Rolling new-case deltas for every filtered record.
#[must_use]
pub fn windowed_new_cases(filtered: &[ObservationRecord], window: usize) -> Vec<Option<f64>> {
    (0..filtered.len())
        .map(|index| new_cases_at(filtered, index, window))
        .collect()
}

#[must_use]
pub fn count_observations(
    filtered: &[ObservationRecord],
    new_cases: &[Option<f64>],
) -> ObservationCounts {
    let count = |key: MetricKey| {
        filtered
            .iter()
            .filter(|record| truthy(record.count(key)).is_some())
            .count()
    };

    ObservationCounts {
        cases: count(MetricKey::ObservedCases),
        deaths: count(MetricKey::ObservedDeaths),
        hospitalized: count(MetricKey::ObservedHospitalized),
        icu: count(MetricKey::ObservedIcu),
        new_cases: new_cases.iter().filter(|delta| delta.is_some()).count(),
    }
}

/// Filters, counts, windows and projects observation records.
///
/// Filtering happens first and all window indexing is done over the filtered
/// sequence. Each retained record yields one point carrying only the enabled
/// observed metrics that hold data.
#[must_use]
pub fn window_observations(
    records: &[ObservationRecord],
    enabled: &EnabledMetricSet,
    window: usize,
) -> WindowedObservations {
    let filtered = filter_observations(records);
    let new_cases = windowed_new_cases(&filtered, window);
    let counts = count_observations(&filtered, &new_cases);
    trace!(?counts, "observation counts");

    let direct = [
        MetricKey::ObservedCases,
        MetricKey::ObservedDeaths,
        MetricKey::ObservedHospitalized,
        MetricKey::ObservedIcu,
    ];
    let emit_new_cases = enabled.contains(MetricKey::ObservedNewCases);

    let points: Vec<TimePoint> = filtered
        .iter()
        .zip(&new_cases)
        .map(|(record, delta)| {
            let mut point = TimePoint::new(record.time);
            for key in direct {
                if enabled.contains(key) {
                    point.set_if_present(key, truthy(record.count(key)));
                }
            }
            if emit_new_cases {
                point.set_if_present(MetricKey::ObservedNewCases, *delta);
            }
            point
        })
        .collect();

    debug!(
        records = records.len(),
        retained = filtered.len(),
        dropped = records.len() - filtered.len(),
        window,
        "windowed observations"
    );
    WindowedObservations { points, counts }
}
