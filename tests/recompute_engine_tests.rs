use std::sync::Arc;

use approx::assert_relative_eq;
use epi_chart::ChartError;
use epi_chart::api::{ChartEngine, ChartInputs, ChartOutput, DerivationConfig, recompute};
use epi_chart::core::{
    EnabledMetricSet, HospitalCapacity, MetricKey, ObservationRecord, ScaleMode, TimePoint,
    Trajectory, TrajectorySample,
};
use epi_chart::extensions::{MitigationInterval, TimeRange};

fn susceptible(time: i64, total: f64) -> TrajectorySample {
    TrajectorySample::new(time).with_total(MetricKey::Susceptible, total)
}

fn scenario_inputs() -> ChartInputs {
    let trajectory = Trajectory::from_mean(vec![
        TrajectorySample::new(0)
            .with_total(MetricKey::Infectious, 20.0)
            .with_total(MetricKey::Critical, 2.0),
        TrajectorySample::new(5)
            .with_total(MetricKey::Infectious, 30.0)
            .with_total(MetricKey::Critical, 3.0),
        TrajectorySample::new(10)
            .with_total(MetricKey::Infectious, 45.0)
            .with_total(MetricKey::Critical, 5.0),
    ]);
    let observations = vec![
        ObservationRecord::new(2).with_cases(3.0),
        ObservationRecord::new(5).with_cases(7.0),
        ObservationRecord::new(7).with_cases(9.0).with_deaths(1.0),
        ObservationRecord::new(12).with_cases(14.0),
    ];
    let intervals = vec![MitigationInterval::new("lockdown", TimeRange::new(-5, 8), 120.0)];

    ChartInputs::new(trajectory)
        .with_observations(observations)
        .with_intervals(intervals)
        .with_capacity(HospitalCapacity::new(500.0, 60.0))
}

#[test]
fn susceptible_only_scenario() {
    let trajectory = Trajectory::from_mean(vec![susceptible(0, 100.0), susceptible(1, 90.0)]);
    let inputs = ChartInputs::new(trajectory)
        .with_enabled(EnabledMetricSet::from_keys([MetricKey::Susceptible]));

    let output = recompute(&inputs, &DerivationConfig::default()).expect("recompute");

    let expected = vec![
        TimePoint::new(0).with_value(MetricKey::Susceptible, 100.0),
        TimePoint::new(1).with_value(MetricKey::Susceptible, 90.0),
    ];
    let values: Vec<_> = output
        .series
        .iter()
        .map(|point| (point.time, point.values.clone()))
        .collect();
    let expected_values: Vec<_> = expected
        .iter()
        .map(|point| (point.time, point.values.clone()))
        .collect();
    assert_eq!(values, expected_values);
    assert_relative_eq!(output.domain.y_max.expect("y max"), 110.0, max_relative = 1e-12);
    assert!(output.should_render());
}

#[test]
fn empty_inputs_render_nothing() {
    let inputs = ChartInputs::new(Trajectory::default());
    let output = recompute(&inputs, &DerivationConfig::default()).expect("recompute");

    assert!(output.series.is_empty());
    assert_eq!(output.domain.t_min, None);
    assert_eq!(output.domain.t_max, None);
    assert_eq!(output.domain.y_max, None);
    assert!(!output.should_render());
}

#[test]
fn passthrough_nan_strength_survives_json() {
    let inputs = ChartInputs::new(Trajectory::default()).with_intervals(vec![
        MitigationInterval::new("lockdown", TimeRange::new(0, 10), f64::NAN),
    ]);
    let output = recompute(&inputs, &DerivationConfig::default()).expect("recompute");
    assert!(output.intervals[0].strength.is_nan());

    let json = serde_json::to_string(&output).expect("serialize");
    let parsed: ChartOutput = serde_json::from_str(&json).expect("parse");
    assert_eq!(parsed.intervals.len(), 1);
    assert_eq!(parsed.intervals[0].time_range, TimeRange::new(0, 10));
    assert!(parsed.intervals[0].strength.is_nan());
    assert!(parsed.series.is_empty());
}

#[test]
fn computed_and_observed_share_one_timeline() {
    let output = recompute(&scenario_inputs(), &DerivationConfig::default()).expect("recompute");

    let times: Vec<i64> = output.series.iter().map(|point| point.time).collect();
    assert_eq!(times, vec![0, 2, 5, 7, 10, 12]);

    let at_five = output.series.at(5).expect("t=5");
    assert_eq!(at_five.value(MetricKey::Infectious), Some(30.0));
    assert_eq!(at_five.value(MetricKey::ObservedCases), Some(7.0));
    assert_eq!(at_five.value(MetricKey::HospitalBeds), Some(500.0));

    let at_twelve = output.series.at(12).expect("t=12");
    assert_eq!(at_twelve.value(MetricKey::ObservedNewCases), Some(11.0));

    assert_eq!(output.domain.time_range(), Some((0, 12)));
    assert_relative_eq!(output.domain.y_max.expect("y max"), 49.5, max_relative = 1e-12);

    assert_eq!(output.intervals[0].time_range, TimeRange::new(0, 8));
    assert_eq!(output.intervals[0].strength, 100.0);
}

#[test]
fn disabling_a_metric_removes_it_everywhere() {
    let mut inputs = scenario_inputs();
    for key in [MetricKey::Infectious, MetricKey::ObservedCases, MetricKey::HospitalBeds] {
        assert!(!inputs.toggle_metric(key));
    }

    let output = recompute(&inputs, &DerivationConfig::default()).expect("recompute");
    for point in &output.series {
        assert!(!point.carries(MetricKey::Infectious));
        assert!(!point.carries(MetricKey::ObservedCases));
        assert!(!point.carries(MetricKey::HospitalBeds));
    }
    assert!(output.plan.iter().all(|entry| entry.key != MetricKey::Infectious));
    assert_relative_eq!(output.domain.y_max.expect("y max"), 12.1, max_relative = 1e-12);
}

#[test]
fn plan_hides_observed_metrics_without_data() {
    let output = recompute(&scenario_inputs(), &DerivationConfig::default()).expect("recompute");
    let planned: Vec<MetricKey> = output.plan.iter().map(|entry| entry.key).collect();

    assert!(planned.contains(&MetricKey::ObservedCases));
    assert!(planned.contains(&MetricKey::ObservedDeaths));
    assert!(planned.contains(&MetricKey::ObservedNewCases));
    assert!(!planned.contains(&MetricKey::ObservedIcu));
    assert!(!planned.contains(&MetricKey::ObservedHospitalized));
    assert!(planned.contains(&MetricKey::HospitalBeds));
    assert_eq!(output.observation_counts.cases, 4);
    assert_eq!(output.observation_counts.new_cases, 1);
}

#[test]
fn humanize_flag_is_forwarded() {
    let inputs = scenario_inputs().with_humanize(true);
    let output = recompute(&inputs, &DerivationConfig::default()).expect("recompute");
    assert!(output.humanize);
}

#[test]
fn log_scale_moves_lower_bound() {
    let inputs = scenario_inputs().with_scale(ScaleMode::Logarithmic);
    let output = recompute(&inputs, &DerivationConfig::default()).expect("recompute");
    assert_eq!(output.domain.y_min, 1.0);
    assert_eq!(output.domain.scale, ScaleMode::Logarithmic);
}

#[test]
fn custom_window_changes_new_case_span() {
    let config = DerivationConfig::default().with_new_cases_window(1);
    let output = recompute(&scenario_inputs(), &config).expect("recompute");
    assert_eq!(output.series.at(5).and_then(|p| p.value(MetricKey::ObservedNewCases)), Some(4.0));
    assert_eq!(output.observation_counts.new_cases, 3);
}

#[test]
fn invalid_config_is_rejected() {
    let config = DerivationConfig::default().with_y_padding_factor(0.5);
    let err = recompute(&scenario_inputs(), &config).expect_err("invalid config");
    assert!(matches!(err, ChartError::InvalidConfig(_)));
    assert!(ChartEngine::new(DerivationConfig::default().with_new_cases_window(0)).is_err());
}

#[test]
fn recompute_is_idempotent() {
    let inputs = scenario_inputs();
    let first = recompute(&inputs, &DerivationConfig::default()).expect("first");
    let second = recompute(&inputs, &DerivationConfig::default()).expect("second");
    assert_eq!(first, second);
}

#[test]
fn engine_reuses_output_for_unchanged_inputs() {
    let mut engine = ChartEngine::new(DerivationConfig::default()).expect("engine");
    let inputs = scenario_inputs();

    let first = engine.recompute(&inputs).expect("first");
    let second = engine.recompute(&inputs.clone()).expect("second");
    assert!(Arc::ptr_eq(&first, &second));

    let stats = engine.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn engine_recomputes_after_toggle_or_new_data() {
    let mut engine = ChartEngine::new(DerivationConfig::default()).expect("engine");
    let mut inputs = scenario_inputs();
    let first = engine.recompute(&inputs).expect("first");

    inputs.toggle_metric(MetricKey::Critical);
    let toggled = engine.recompute(&inputs).expect("toggled");
    assert!(!Arc::ptr_eq(&first, &toggled));
    assert!(toggled.series.iter().all(|point| !point.carries(MetricKey::Critical)));

    // Equal contents behind a fresh Arc count as new data.
    let refreshed = inputs.clone().with_observations(inputs.observations.as_ref().clone());
    let reloaded = engine.recompute(&refreshed).expect("reloaded");
    assert!(!Arc::ptr_eq(&toggled, &reloaded));
    assert_eq!(*toggled, *reloaded);
    assert_eq!(engine.cache_stats().misses, 3);
}

#[test]
fn engine_config_change_invalidates_cache() {
    let mut engine = ChartEngine::new(DerivationConfig::default()).expect("engine");
    let inputs = scenario_inputs();
    engine.recompute(&inputs).expect("first");
    assert!(engine.cached_output().is_some());

    engine
        .set_config(DerivationConfig::default().with_y_padding_factor(2.0))
        .expect("set config");
    assert!(engine.cached_output().is_none());

    let output = engine.recompute(&inputs).expect("second");
    assert_relative_eq!(output.domain.y_max.expect("y max"), 90.0, max_relative = 1e-12);
}

#[test]
fn misaligned_trajectory_surfaces_as_error() {
    let trajectory = Trajectory::new(vec![susceptible(0, 1.0)], Vec::new(), Vec::new());
    let mut engine = ChartEngine::default();
    let err = engine
        .recompute(&ChartInputs::new(trajectory))
        .expect_err("misaligned");
    assert!(matches!(err, ChartError::MisalignedTrajectory { .. }));
    assert!(engine.cached_output().is_none());
}
