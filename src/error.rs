use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupplyError {
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("no pipe from {from} to {to}")]
    UnknownPipe { from: String, to: String },

    #[error("location {0} already exists")]
    DuplicateLocation(String),

    #[error("invalid capacity {capacity} on pipe {from} -> {to}")]
    InvalidCapacity {
        from: String,
        to: String,
        capacity: f64,
    },

    #[error("invalid delivery value {value} for location {code}")]
    InvalidDelivery { code: String, value: f64 },

    /// Max-flow endpoints are missing or identical.
    #[error("invalid flow endpoints: source {source_code}, sink {sink_code}")]
    InvalidEndpoints {
        source_code: String,
        sink_code: String,
    },

    #[error("{file}:{line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SupplyError>;
