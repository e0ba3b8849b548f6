//! Marker and line style vocabulary shared by the element builders and the
//! rendering plan.  Spellings follow the matplotlib format characters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Marker shapes for data points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Circle,
    Square,
    Star,
    Diamond,
    ThinDiamond,
    TriUp,
    TriDown,
    Point,
    Cross,
    Plus,
    TriangleDown,
    TriangleUp,
    TriangleLeft,
    TriangleRight,
    Pentagon,
    Hexagon,
    /// Draw no marker at all.
    Nothing,
}

impl Marker {
    /// Cycle used when a table supplies no marker at all.
    pub const DEFAULTS: [Marker; 9] = [
        Marker::Circle,
        Marker::Square,
        Marker::Star,
        Marker::Diamond,
        Marker::TriUp,
        Marker::TriDown,
        Marker::Point,
        Marker::Cross,
        Marker::Plus,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Marker::Circle => "o",
            Marker::Square => "s",
            Marker::Star => "*",
            Marker::Diamond => "D",
            Marker::ThinDiamond => "d",
            Marker::TriUp => "2",
            Marker::TriDown => "1",
            Marker::Point => ".",
            Marker::Cross => "x",
            Marker::Plus => "+",
            Marker::TriangleDown => "v",
            Marker::TriangleUp => "^",
            Marker::TriangleLeft => "<",
            Marker::TriangleRight => ">",
            Marker::Pentagon => "p",
            Marker::Hexagon => "h",
            Marker::Nothing => "None",
        }
    }
}

impl FromStr for Marker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let marker = match s {
            "o" => Marker::Circle,
            "s" => Marker::Square,
            "*" => Marker::Star,
            "D" => Marker::Diamond,
            "d" => Marker::ThinDiamond,
            "2" => Marker::TriUp,
            "1" => Marker::TriDown,
            "." => Marker::Point,
            "x" | "X" => Marker::Cross,
            "+" => Marker::Plus,
            "v" => Marker::TriangleDown,
            "^" => Marker::TriangleUp,
            "<" => Marker::TriangleLeft,
            ">" => Marker::TriangleRight,
            "p" => Marker::Pentagon,
            "h" | "H" => Marker::Hexagon,
            "None" | "none" | "" => Marker::Nothing,
            other => return Err(Error::format(format!("unknown marker '{other}'"))),
        };
        Ok(marker)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Dash pattern for lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
    /// Markers only, no connecting line.
    Nothing,
}

impl LineStyle {
    pub const DEFAULTS: [LineStyle; 4] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::DashDot,
        LineStyle::Dotted,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::DashDot => "-.",
            LineStyle::Dotted => ":",
            LineStyle::Nothing => "None",
        }
    }
}

impl FromStr for LineStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let style = match s {
            "-" | "solid" => LineStyle::Solid,
            "--" | "dashed" => LineStyle::Dashed,
            "-." | "dashdot" => LineStyle::DashDot,
            ":" | "dotted" => LineStyle::Dotted,
            "None" | "none" | "" => LineStyle::Nothing,
            other => return Err(Error::format(format!("unknown line style '{other}'"))),
        };
        Ok(style)
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

macro_rules! serde_as_symbol {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.symbol())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_as_symbol!(Marker);
serde_as_symbol!(LineStyle);
