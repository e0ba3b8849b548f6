use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::Unit;

// ---------------------------------------------------------------------------
// MetadataValue – a free-form table metadata entry
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value found in a table header besides the
/// well-known `title`, `label` and `History` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<MetadataValue>),
    Null,
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// TableMeta – title, label and provenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    /// Human readable title, used as default plot title.
    #[serde(default)]
    pub title: String,
    /// Short label, used as default legend when several tables share a plot.
    #[serde(default)]
    pub label: String,
    /// Append-only log of processing steps.
    #[serde(default, rename = "History")]
    pub history: Vec<String>,
    /// Any other header keys, preserved on round trips.
    #[serde(flatten)]
    pub extra: BTreeMap<String, MetadataValue>,
}

// ---------------------------------------------------------------------------
// Column – one named, unit-tagged vector of values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// `None` when the source format carried no unit.
    pub unit: Option<Unit>,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, unit: Option<Unit>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            unit,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest non-NaN value.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }

    /// Largest non-NaN value.
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }

    /// Unit to use when none was stored with the column.
    pub fn unit_or(&self, fallback: &Unit) -> Unit {
        self.unit.clone().unwrap_or_else(|| fallback.clone())
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded measurement
// ---------------------------------------------------------------------------

/// An ordered set of equally long columns plus metadata.
///
/// Tables are never modified in place by the processing steps: trimming and
/// resampling return new tables carrying a copy of the metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub meta: TableMeta,
}

impl Table {
    pub fn new(columns: Vec<Column>, meta: TableMeta) -> Self {
        Table { columns, meta }
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail unless every column holds the same number of rows.
    pub fn validate(&self) -> Result<()> {
        let rows = self.len();
        match self.columns.iter().find(|c| c.len() != rows) {
            Some(col) => Err(Error::format(format!(
                "table '{}': column '{}' has {} rows, expected {rows}",
                self.meta.title,
                col.name,
                col.len()
            ))),
            None => Ok(()),
        }
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// New table keeping only the rows where `keep` is true.
    pub fn select_rows(&self, keep: &[bool]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                unit: col.unit.clone(),
                values: col
                    .values
                    .iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| *v)
                    .collect(),
            })
            .collect();
        Table {
            columns,
            meta: self.meta.clone(),
        }
    }

    /// Append a processing step to the provenance log.
    pub fn with_history(mut self, entry: impl Into<String>) -> Self {
        self.meta.history.push(entry.into());
        self
    }
}
