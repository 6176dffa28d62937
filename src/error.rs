use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("misaligned trajectory: mean={mean}, lower={lower}, upper={upper}")]
    MisalignedTrajectory {
        mean: usize,
        lower: usize,
        upper: usize,
    },

    #[error("unknown metric key: {0}")]
    UnknownMetric(String),

    #[error("invalid derivation config: {0}")]
    InvalidConfig(String),
}
