//! epi-chart: plot-ready data engine for epidemic scenario charts.
//!
//! The crate reconciles a simulated trajectory, sparse case observations and
//! the user's metric visibility into one timestamp-sorted series, plus the
//! axis domain and clipped mitigation overlays a renderer needs. Rendering,
//! layout and text formatting stay with the host application.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod telemetry;

pub use api::{ChartEngine, ChartInputs, ChartOutput, DerivationConfig, recompute};
pub use error::{ChartError, ChartResult};
