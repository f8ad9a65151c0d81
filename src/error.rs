//! Error types for Tempoline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TempolineError {
    #[error("tween duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("step delta must be a finite, non-negative number of seconds, got {0}")]
    InvalidDelta(f64),

    #[error("unknown easing kind: {0}")]
    InvalidEasing(String),

    #[error("invalid metadata value for `{key}`: {value}")]
    InvalidMetadata { key: String, value: String },

    #[error("interactive is already bound to a clock")]
    AlreadyBound,

    #[error("interactive is not bound to a clock")]
    NotBound,

    #[error("driver error: {0}")]
    Driver(String),

    #[error("audio output error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, TempolineError>;
