//! Overlay annotations drawn independently of the main series.

pub mod mitigation;

pub use mitigation::{MitigationInterval, TimeRange, clamp_interval, clamp_intervals};
