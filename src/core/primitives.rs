use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ChartError, ChartResult};

/// Epoch milliseconds, the shared time axis of every series.
pub type Timestamp = i64;

/// Rounds a simulated total and applies the zero-as-absent policy.
///
/// A rounded value of exactly zero is reported as `None`, the same as missing
/// data. Zero counts are therefore never drawn on the chart, which also keeps
/// them off a logarithmic axis. Non-finite inputs are absent as well.
#[must_use]
pub fn present_rounded(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = round_half_up(value);
    if rounded == 0.0 { None } else { Some(rounded) }
}

/// Nearest integer, with halves rounded toward positive infinity.
///
/// `-2.5` becomes `-2.0`, unlike [`f64::round`] which rounds away from zero.
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Reduces an optional observed count to a present value.
///
/// Observation feeds use zero and missing interchangeably, so a count carries
/// data only when it is finite and non-zero.
#[must_use]
pub fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Keeps strictly positive finite values.
#[must_use]
pub fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

#[must_use]
pub fn timestamp_to_datetime(time: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(time)
}

/// Parses an observation time given as `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Plain dates resolve to midnight UTC.
pub fn parse_timestamp(input: &str) -> ChartResult<Timestamp> {
    let trimmed = input.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.with_timezone(&Utc).timestamp_millis());
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
        ChartError::InvalidData(format!("unrecognized observation time `{trimmed}`: {e}"))
    })?;
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| {
            ChartError::InvalidData(format!("observation date `{trimmed}` has no midnight"))
        })
}
