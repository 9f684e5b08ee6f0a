//! Error taxonomy of the simulation core
//!
//! Every error is local and fatal to the requested operation only; internal
//! state is left exactly as it was before the failing call.

use thiserror::Error;

use crate::simulation::expr::ExprError;

#[derive(Debug, Error)]
pub enum SimError {
    // Configuration errors
    #[error("`deltaTime` of simulation should be positive, but received {0}")]
    NonPositiveDeltaTime(String),

    #[error("`from` in simulation time range should be zero or positive, but received {0}")]
    NegativeTimeRangeFrom(String),

    #[error("`from` in simulation time range should not exceed `to`, but received {from} and {to}")]
    InvertedTimeRange { from: String, to: String },

    #[error("time range is too wide for this `deltaTime`: step count overflows")]
    StepCountOverflow,

    // Shape errors
    #[error("`mass` of particle should be positive, but received {0}")]
    NonPositiveMass(String),

    #[error("border option of field area is not a valid expression: {0}")]
    BadBorderExpression(#[from] ExprError),

    #[error("border option of field area is expected to be `false` or an expression string, but received `true`")]
    InvalidBorderOption,

    // State errors
    #[error("simulating now; {0} is not allowed")]
    CurrentlySimulating(&'static str),

    // Query errors
    #[error("particle does not have a track yet, please simulate first")]
    EmptyTrack,

    #[error("particle does not have a track point at time {0}, please reset the time range and simulate again")]
    TimeOutOfTrack(String),
}
