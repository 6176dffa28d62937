use tracing::debug;

use crate::core::types::{MergedSeries, TimePoint};

/// Merges computed and observed points into one ascending, timestamp-unique series.
///
/// The inputs are concatenated (computed first) and stably sorted by time, so
/// points sharing a timestamp keep their arrival order. Each run of equal
/// timestamps is consolidated with [`TimePoint::absorb`]: later defined fields
/// win, and a field missing on a later point never erases an earlier value.
#[must_use]
pub fn merge_series(computed: Vec<TimePoint>, observed: Vec<TimePoint>) -> MergedSeries {
    let input_count = computed.len() + observed.len();
    let mut points = computed;
    points.extend(observed);
    // `sort_by_key` is stable.
    points.sort_by_key(|point| point.time);

    let mut merged: Vec<TimePoint> = Vec::with_capacity(points.len());
    let mut consolidated = 0_usize;
    let mut iter = points.into_iter();
    if let Some(first) = iter.next() {
        let mut accumulator = first;
        for point in iter {
            if point.time == accumulator.time {
                accumulator.absorb(point);
                consolidated += 1;
            } else {
                merged.push(std::mem::replace(&mut accumulator, point));
            }
        }
        merged.push(accumulator);
    }

    debug!(
        input_count,
        consolidated,
        merged_count = merged.len(),
        "merged series"
    );
    MergedSeries::from_sorted_unique(merged)
}
