//! Plot element resolution for wavelength-indexed optical measurements.
//!
//! Tables are read (or wrapped), resampled and trimmed by a
//! [`source::TableSource`]; an [`elements::Layout`] validates and defaults
//! titles, legends, markers and line styles; the [`elements::Director`]
//! runs the steps and hands back [`elements::Elements`], which
//! [`render::plan`] lays out for a drawing collaborator.

pub mod archive;
pub mod bench;
pub mod color;
pub mod data;
pub mod elements;
pub mod error;
pub mod render;
pub mod source;
pub mod style;
pub mod units;

pub use elements::{build_elements, Director, Elements, ElementsBuilder, Layout};
pub use error::{Error, Result};
pub use source::{TableFromFile, TableOptions, TableSource, TableWrapper, TablesFromFiles, TablesWrapper};
