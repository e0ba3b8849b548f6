use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Physical units attached to table columns
// ---------------------------------------------------------------------------

/// Physical unit of a column.
///
/// Only the length units convert into each other; everything else is
/// compared by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Dimensionless,
    Nanometer,
    Micrometer,
    Angstrom,
    Meter,
    Ampere,
    Percent,
    /// Any other unit, kept verbatim.
    Other(String),
}

impl Unit {
    /// Size of one unit in metres, for length units only.
    fn metres(&self) -> Option<f64> {
        match self {
            Unit::Nanometer => Some(1e-9),
            Unit::Micrometer => Some(1e-6),
            Unit::Angstrom => Some(1e-10),
            Unit::Meter => Some(1.0),
            _ => None,
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        matches!(self, Unit::Dimensionless)
    }

    /// Factor that turns a value expressed in `self` into `to`.
    pub fn factor_to(&self, to: &Unit) -> Result<f64> {
        if self == to {
            return Ok(1.0);
        }
        match (self.metres(), to.metres()) {
            (Some(a), Some(b)) => Ok(a / b),
            _ => Err(Error::UnitConversion {
                from: self.clone(),
                to: to.clone(),
            }),
        }
    }

    /// Convert a single value expressed in `self` into `to`.
    pub fn convert(&self, value: f64, to: &Unit) -> Result<f64> {
        Ok(value * self.factor_to(to)?)
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Dimensionless
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Dimensionless => write!(f, ""),
            Unit::Nanometer => write!(f, "nm"),
            Unit::Micrometer => write!(f, "um"),
            Unit::Angstrom => write!(f, "Angstrom"),
            Unit::Meter => write!(f, "m"),
            Unit::Ampere => write!(f, "A"),
            Unit::Percent => write!(f, "%"),
            Unit::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for Unit {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let unit = match s.trim() {
            "" | "dimensionless" | "dimensionless_unscaled" => Unit::Dimensionless,
            "nm" | "nanometer" | "nanometre" => Unit::Nanometer,
            "um" | "µm" | "micron" | "micrometer" | "micrometre" => Unit::Micrometer,
            "Angstrom" | "angstrom" | "AA" | "Å" => Unit::Angstrom,
            "m" | "meter" | "metre" => Unit::Meter,
            "A" | "ampere" | "Ampere" => Unit::Ampere,
            "%" | "pct" | "percent" => Unit::Percent,
            other => Unit::Other(other.to_string()),
        };
        Ok(unit)
    }
}

impl From<&str> for Unit {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(unit) => unit,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Unit::from(s.as_str()))
    }
}
