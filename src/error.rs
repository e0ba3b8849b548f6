use std::fmt;

use thiserror::Error;

use crate::units::Unit;

// ---------------------------------------------------------------------------
// Error type shared by the whole crate
// ---------------------------------------------------------------------------

/// Which side of the plot a column reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A one-based column number falls outside `1..=count`.
    #[error("{axis} column number ({index}) should be 1 <= {axis} <= ({count})")]
    ColumnRange {
        axis: Axis,
        index: usize,
        count: usize,
    },

    /// A legend/marker/linestyle/title list has a length not allowed for
    /// the current table × column shape.
    #[error("{0}")]
    CardinalityMismatch(String),

    #[error("{0}")]
    UnsupportedCombination(String),

    /// A construction step ran before the step it depends on.
    #[error("cannot {step} before the tables are built")]
    BuildOrder { step: &'static str },

    #[error("cannot convert from unit '{from}' to unit '{to}'")]
    UnitConversion { from: Unit, to: Unit },

    #[error("interpolation failed: {0}")]
    Interpolation(String),

    /// Malformed or unsupported table file.
    #[error("table format error: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn cardinality(msg: impl Into<String>) -> Self {
        Error::CardinalityMismatch(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}
