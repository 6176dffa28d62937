//! Recompute surface consumed by the rendering layer.
//!
//! Inputs arrive as one [`ChartInputs`] snapshot and leave as one
//! [`ChartOutput`]; nothing in between keeps state except the optional
//! memoizing [`ChartEngine`].

mod config;
mod engine;
mod series_plan;

pub use config::DerivationConfig;
pub use engine::{ChartEngine, ChartInputs, ChartOutput, RecomputeCacheStats, recompute};
pub use series_plan::{SeriesDescriptor, plan_series};
