use epi_chart::core::{DomainSummary, ScaleMode};
use epi_chart::extensions::{MitigationInterval, TimeRange, clamp_interval, clamp_intervals};

fn domain(t_min: Option<i64>, t_max: Option<i64>) -> DomainSummary {
    DomainSummary {
        t_min,
        t_max,
        y_min: 0.0,
        y_max: Some(10.0),
        scale: ScaleMode::Linear,
    }
}

fn interval(start: i64, end: i64, strength: f64) -> MitigationInterval {
    MitigationInterval::new("school-closures", TimeRange::new(start, end), strength)
        .with_name("School closures")
        .with_color("#bb5566")
}

#[test]
fn bounds_are_clamped_into_the_time_domain() {
    let original = interval(-50, 500, 140.0);
    let clipped = clamp_interval(&original, &domain(Some(0), Some(100)));

    assert_eq!(clipped.time_range, TimeRange::new(0, 100));
    assert_eq!(clipped.strength, 100.0);
    assert_eq!(clipped.id, "school-closures");
    assert_eq!(clipped.name, "School closures");
    assert_eq!(clipped.color, "#bb5566");
    // Input is left untouched.
    assert_eq!(original.time_range, TimeRange::new(-50, 500));
    assert_eq!(original.strength, 140.0);
}

#[test]
fn in_range_interval_is_unchanged() {
    let original = interval(10, 20, 35.0);
    let clipped = clamp_interval(&original, &domain(Some(0), Some(100)));
    assert_eq!(clipped, original);
}

#[test]
fn interval_outside_domain_collapses_to_an_edge() {
    let clipped = clamp_interval(&interval(200, 300, -10.0), &domain(Some(0), Some(100)));
    assert_eq!(clipped.time_range, TimeRange::new(100, 100));
    assert_eq!(clipped.strength, 0.0);
}

#[test]
fn undefined_domain_passes_interval_through() {
    let original = interval(-50, 500, 140.0);
    let clipped = clamp_interval(&original, &domain(None, None));
    assert_eq!(clipped, original);
}

#[test]
fn batch_clamp_preserves_order() {
    let intervals = vec![interval(-1, 5, 50.0), interval(3, 99, 60.0)];
    let clipped = clamp_intervals(&intervals, &domain(Some(0), Some(10)));
    assert_eq!(clipped.len(), 2);
    assert_eq!(clipped[0].time_range, TimeRange::new(0, 5));
    assert_eq!(clipped[1].time_range, TimeRange::new(3, 10));
}
