use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Origin of a plotted metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricCategory {
    /// Derived from the simulated trajectory; drawn with an uncertainty band.
    Computed,
    /// Taken from empirical case-count records.
    Observed,
    /// Capacity line; drawn but never used to scale the value axis.
    Reference,
}

/// How the renderer draws a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricStyle {
    Line,
    Scatter,
    DashedLine,
}

/// Every metric the chart knows about.
///
/// The set is closed: a key that is not listed here cannot reach the catalog
/// except through [`MetricKey::from_str`], which rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Susceptible,
    Exposed,
    Infectious,
    Severe,
    Critical,
    Overflow,
    Recovered,
    Fatality,
    ObservedCases,
    ObservedDeaths,
    ObservedHospitalized,
    ObservedIcu,
    ObservedNewCases,
    HospitalBeds,
    IcuBeds,
}

/// Static description of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricInfo {
    pub key: MetricKey,
    pub name: &'static str,
    pub color: &'static str,
    pub category: MetricCategory,
    pub style: MetricStyle,
}

impl MetricKey {
    pub const ALL: [MetricKey; 15] = [
        MetricKey::Susceptible,
        MetricKey::Exposed,
        MetricKey::Infectious,
        MetricKey::Severe,
        MetricKey::Critical,
        MetricKey::Overflow,
        MetricKey::Recovered,
        MetricKey::Fatality,
        MetricKey::ObservedCases,
        MetricKey::ObservedDeaths,
        MetricKey::ObservedHospitalized,
        MetricKey::ObservedIcu,
        MetricKey::ObservedNewCases,
        MetricKey::HospitalBeds,
        MetricKey::IcuBeds,
    ];

    pub const COMPUTED: [MetricKey; 8] = [
        MetricKey::Susceptible,
        MetricKey::Exposed,
        MetricKey::Infectious,
        MetricKey::Severe,
        MetricKey::Critical,
        MetricKey::Overflow,
        MetricKey::Recovered,
        MetricKey::Fatality,
    ];

    pub const OBSERVED: [MetricKey; 5] = [
        MetricKey::ObservedCases,
        MetricKey::ObservedDeaths,
        MetricKey::ObservedHospitalized,
        MetricKey::ObservedIcu,
        MetricKey::ObservedNewCases,
    ];

    pub const REFERENCE: [MetricKey; 2] = [MetricKey::HospitalBeds, MetricKey::IcuBeds];

    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Susceptible => "susceptible",
            MetricKey::Exposed => "exposed",
            MetricKey::Infectious => "infectious",
            MetricKey::Severe => "severe",
            MetricKey::Critical => "critical",
            MetricKey::Overflow => "overflow",
            MetricKey::Recovered => "recovered",
            MetricKey::Fatality => "fatality",
            MetricKey::ObservedCases => "observedCases",
            MetricKey::ObservedDeaths => "observedDeaths",
            MetricKey::ObservedHospitalized => "observedHospitalized",
            MetricKey::ObservedIcu => "observedIcu",
            MetricKey::ObservedNewCases => "observedNewCases",
            MetricKey::HospitalBeds => "hospitalBeds",
            MetricKey::IcuBeds => "icuBeds",
        }
    }

    #[must_use]
    pub fn category(self) -> MetricCategory {
        self.info().category
    }

    #[must_use]
    pub fn is_enabled(self, enabled: &EnabledMetricSet) -> bool {
        enabled.contains(self)
    }

    #[must_use]
    pub fn info(self) -> MetricInfo {
        use MetricCategory::{Computed, Observed, Reference};
        use MetricStyle::{DashedLine, Line, Scatter};

        let (name, color, category, style) = match self {
            MetricKey::Susceptible => ("Susceptible", "#a6cee3", Computed, Line),
            MetricKey::Exposed => ("Exposed", "#fdbf6f", Computed, Line),
            MetricKey::Infectious => ("Infectious", "#ff7f00", Computed, Line),
            MetricKey::Severe => ("Severely ill", "#fb9a99", Computed, Line),
            MetricKey::Critical => ("Patients in ICU", "#e31a1c", Computed, Line),
            MetricKey::Overflow => ("ICU overflow", "#900d2c", Computed, Line),
            MetricKey::Recovered => ("Recovered", "#33a02c", Computed, Line),
            MetricKey::Fatality => ("Cumulative deaths", "#5e5e5e", Computed, Line),
            MetricKey::ObservedCases => ("Cumulative cases (data)", "#aaaaaa", Observed, Scatter),
            MetricKey::ObservedDeaths => ("Cumulative deaths (data)", "#5e5e5e", Observed, Scatter),
            MetricKey::ObservedHospitalized => {
                ("Patients in hospital (data)", "#fb9a99", Observed, Scatter)
            }
            MetricKey::ObservedIcu => ("Patients in ICU (data)", "#e31a1c", Observed, Scatter),
            MetricKey::ObservedNewCases => {
                ("Cases past 3 days (data)", "#ff7f00", Observed, Scatter)
            }
            MetricKey::HospitalBeds => ("Total hospital beds", "#bbbbbb", Reference, DashedLine),
            MetricKey::IcuBeds => ("Total ICU/ICM beds", "#cccccc", Reference, DashedLine),
        };

        MetricInfo {
            key: self,
            name,
            color,
            category,
            style,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ChartError;

    fn from_str(s: &str) -> ChartResult<Self> {
        MetricKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ChartError::UnknownMetric(s.to_owned()))
    }
}

/// Snapshot of the metrics currently visible.
///
/// The UI owns and toggles its own copy; every recompute receives a snapshot
/// by reference and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledMetricSet {
    keys: BTreeSet<MetricKey>,
}

impl EnabledMetricSet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all() -> Self {
        Self::from_keys(MetricKey::ALL)
    }

    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = MetricKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, key: MetricKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn enable(&mut self, key: MetricKey) {
        self.keys.insert(key);
    }

    pub fn disable(&mut self, key: MetricKey) {
        self.keys.remove(&key);
    }

    /// Flips visibility of `key` and returns the new state.
    pub fn toggle(&mut self, key: MetricKey) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    #[must_use]
    pub fn with(mut self, key: MetricKey) -> Self {
        self.enable(key);
        self
    }

    #[must_use]
    pub fn without(mut self, key: MetricKey) -> Self {
        self.disable(key);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = MetricKey> + '_ {
        self.keys.iter().copied()
    }

    /// Enabled keys of one category, in catalog order.
    pub fn of_category(&self, category: MetricCategory) -> impl Iterator<Item = MetricKey> + '_ {
        MetricKey::ALL
            .into_iter()
            .filter(move |key| key.category() == category && self.contains(*key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<MetricKey> for EnabledMetricSet {
    fn from_iter<I: IntoIterator<Item = MetricKey>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}
