use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::metrics::MetricKey;
use crate::core::primitives::Timestamp;
use crate::error::ChartError;

/// Uncertainty interval attached to a computed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// One sparse record on the shared time axis.
///
/// A metric missing from `values` means "no data" at this instant; a zero is
/// never stored in its place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimePoint {
    pub time: Timestamp,
    #[serde(default)]
    pub values: IndexMap<MetricKey, f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub bands: IndexMap<MetricKey, Band>,
}

impl TimePoint {
    #[must_use]
    pub fn new(time: Timestamp) -> Self {
        Self {
            time,
            values: IndexMap::new(),
            bands: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, key: MetricKey, value: f64) -> Self {
        self.values.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_band(mut self, key: MetricKey, band: Band) -> Self {
        self.bands.insert(key, band);
        self
    }

    #[must_use]
    pub fn value(&self, key: MetricKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    #[must_use]
    pub fn band(&self, key: MetricKey) -> Option<Band> {
        self.bands.get(&key).copied()
    }

    /// Stores `value` under `key` when present; `None` leaves the field untouched.
    pub fn set_if_present(&mut self, key: MetricKey, value: Option<f64>) {
        if let Some(value) = value {
            self.values.insert(key, value);
        }
    }

    /// True when `key` appears either as a value or as a band.
    #[must_use]
    pub fn carries(&self, key: MetricKey) -> bool {
        self.values.contains_key(&key) || self.bands.contains_key(&key)
    }

    /// Folds `other` into `self` field by field.
    ///
    /// Every field defined on `other` overwrites or adds the same field here.
    /// Fields `other` lacks keep their current value.
    pub fn absorb(&mut self, other: TimePoint) {
        debug_assert_eq!(self.time, other.time, "absorb across timestamps");
        for (key, value) in other.values {
            self.values.insert(key, value);
        }
        for (key, band) in other.bands {
            self.bands.insert(key, band);
        }
    }
}

/// Ascending, timestamp-unique sequence of [`TimePoint`]s ready for plotting.
///
/// Deserialized input is checked for the same ordering; an unsorted or
/// duplicated timestamp is rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "Vec<TimePoint>", try_from = "Vec<TimePoint>")]
pub struct MergedSeries {
    points: Vec<TimePoint>,
}

impl MergedSeries {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps points that are already strictly ascending by time.
    pub(crate) fn from_sorted_unique(points: Vec<TimePoint>) -> Self {
        debug_assert!(
            points.windows(2).all(|pair| pair[0].time < pair[1].time),
            "merged series must be strictly ascending"
        );
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<TimePoint> {
        self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimePoint> {
        self.points.iter()
    }

    /// Point at exactly `time`, if any.
    #[must_use]
    pub fn at(&self, time: Timestamp) -> Option<&TimePoint> {
        self.points
            .binary_search_by_key(&time, |point| point.time)
            .ok()
            .map(|index| &self.points[index])
    }
}

impl TryFrom<Vec<TimePoint>> for MergedSeries {
    type Error = ChartError;

    fn try_from(points: Vec<TimePoint>) -> Result<Self, Self::Error> {
        if let Some(pair) = points.windows(2).find(|pair| pair[0].time >= pair[1].time) {
            return Err(ChartError::InvalidData(format!(
                "merged series timestamps must be strictly ascending: {} then {}",
                pair[0].time, pair[1].time
            )));
        }
        Ok(Self { points })
    }
}

impl From<MergedSeries> for Vec<TimePoint> {
    fn from(series: MergedSeries) -> Self {
        series.points
    }
}

impl<'a> IntoIterator for &'a MergedSeries {
    type Item = &'a TimePoint;
    type IntoIter = std::slice::Iter<'a, TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
