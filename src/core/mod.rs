pub mod domain;
pub mod merge;
pub mod metrics;
pub mod observations;
pub mod primitives;
pub mod trajectory;
pub mod types;

pub use domain::{
    DEFAULT_LOG_SCALE_FLOOR, DEFAULT_Y_PADDING_FACTOR, DomainSummary, ScaleMode, compute_domain,
};
pub use merge::merge_series;
pub use metrics::{EnabledMetricSet, MetricCategory, MetricInfo, MetricKey, MetricStyle};
pub use observations::{
    DEFAULT_NEW_CASES_WINDOW, ObservationCounts, ObservationRecord, WindowedObservations,
    count_observations, filter_observations, new_cases_at, window_observations,
    windowed_new_cases,
};
pub use primitives::{
    Timestamp, parse_timestamp, present_rounded, round_half_up, timestamp_to_datetime,
};
pub use trajectory::{
    CompartmentTotal, CumulativeState, CurrentState, HospitalCapacity, Trajectory,
    TrajectorySample, normalize_trajectory,
};
pub use types::{Band, MergedSeries, TimePoint};
