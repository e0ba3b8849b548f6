//! Fixed characteristics of the optical bench the measurements come from.

use crate::style::LineStyle;
use crate::units::Unit;

/// Shortest wavelength the bench monochromator delivers, in nm.
pub const WAVE_START: f64 = 350.0;
/// Longest wavelength the bench monochromator delivers, in nm.
pub const WAVE_END: f64 = 1050.0;
/// Unit of [`WAVE_START`] and [`WAVE_END`].
pub const WAVE_UNIT: Unit = Unit::Nanometer;

/// Default number of characters kept from a column name in legends.
pub const LABEL_LENGTH: usize = 6;

/// A filter swap in the monochromator, drawn as a vertical reference line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterChange {
    pub label: &'static str,
    /// Wavelength in nm.
    pub wavelength: f64,
    pub style: LineStyle,
}

pub const MONOCHROMATOR_CHANGES: [FilterChange; 2] = [
    FilterChange {
        label: "BG38 => OG570",
        wavelength: 570.0,
        style: LineStyle::Dashed,
    },
    FilterChange {
        label: "OG570 => RG830",
        wavelength: 860.0,
        style: LineStyle::DashDot,
    },
];

/// Bench range expressed in `unit`.
pub fn range_in(unit: &Unit) -> crate::error::Result<(f64, f64)> {
    Ok((
        WAVE_UNIT.convert(WAVE_START, unit)?,
        WAVE_UNIT.convert(WAVE_END, unit)?,
    ))
}
