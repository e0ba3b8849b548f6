use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::read_table;
use crate::data::model::{Column, Table};
use crate::data::resample::resample_column;
use crate::data::trim::trim_table;
use crate::error::{Axis, Error, Result};
use crate::units::Unit;

// ---------------------------------------------------------------------------
// Column references
// ---------------------------------------------------------------------------

/// A zero-based column index, valid for every table it was resolved against.
///
/// Users always count columns from one; [`ColumnRef::resolve`] is the single
/// place where that number becomes an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef(usize);

impl ColumnRef {
    /// Turn a one-based column `number` into a reference, checking it against
    /// every table in `tables`.
    pub fn resolve(number: usize, axis: Axis, tables: &[Table]) -> Result<ColumnRef> {
        if number == 0 || tables.is_empty() {
            return Err(Error::ColumnRange {
                axis,
                index: number,
                count: tables.first().map_or(0, Table::ncols),
            });
        }
        for table in tables {
            let count = table.ncols();
            if number > count {
                return Err(Error::ColumnRange {
                    axis,
                    index: number,
                    count,
                });
            }
        }
        Ok(ColumnRef(number - 1))
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// One-based column number, as shown to users.
    pub fn number(self) -> usize {
        self.0 + 1
    }

    /// The referenced column of `table`, if it has that many columns.
    pub fn get(self, table: &Table) -> Option<&Column> {
        table.column(self.0)
    }
}

/// One-based Y column selection: a single column or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YColumns {
    One(usize),
    Many(Vec<usize>),
}

impl YColumns {
    /// Number of Y columns requested (`ncol`).
    pub fn len(&self) -> usize {
        match self {
            YColumns::One(_) => 1,
            YColumns::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn numbers(&self) -> Vec<usize> {
        match self {
            YColumns::One(n) => vec![*n],
            YColumns::Many(v) => v.clone(),
        }
    }
}

impl From<usize> for YColumns {
    fn from(n: usize) -> Self {
        YColumns::One(n)
    }
}

impl From<Vec<usize>> for YColumns {
    fn from(v: Vec<usize>) -> Self {
        YColumns::Many(v)
    }
}

// ---------------------------------------------------------------------------
// Loading options
// ---------------------------------------------------------------------------

/// How tables are read and prepared before plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Column names replacing the file header row.
    pub columns: Option<Vec<String>>,
    pub delimiter: Option<char>,
    /// Unit assumed for the X column when the file carries none.
    pub x_unit: Unit,
    /// Unit assumed for the Y columns when the file carries none.
    pub y_unit: Unit,
    pub x_low: Option<f64>,
    pub x_high: Option<f64>,
    /// Unit of `x_low` / `x_high`.
    pub limits_unit: Unit,
    /// Uniform X step to resample onto.
    pub resolution: Option<f64>,
    /// Clamp the X range to the optical bench range.
    pub bench_trim: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            columns: None,
            delimiter: None,
            x_unit: Unit::Nanometer,
            y_unit: Unit::Dimensionless,
            x_low: None,
            x_high: None,
            limits_unit: Unit::Nanometer,
            resolution: None,
            bench_trim: false,
        }
    }
}

impl TableOptions {
    /// Load options from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Tables plus the column references shared by all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTables {
    pub tables: Vec<Table>,
    pub x: ColumnRef,
    pub yy: Vec<ColumnRef>,
}

/// Something that yields the tables to plot.
pub trait TableSource {
    /// Number of tables that will be produced (`ntab`).
    fn ntab(&self) -> usize;
    /// Number of Y columns per table (`ncol`).
    fn ncol(&self) -> usize;
    fn build_tables(&self) -> Result<LoadedTables>;
}

fn resolve_refs(xcol: usize, ycols: &YColumns, tables: &[Table]) -> Result<(ColumnRef, Vec<ColumnRef>)> {
    let x = ColumnRef::resolve(xcol, Axis::X, tables)?;
    let yy = ycols
        .numbers()
        .into_iter()
        .map(|n| ColumnRef::resolve(n, Axis::Y, tables))
        .collect::<Result<Vec<_>>>()?;
    Ok((x, yy))
}

fn check_resampling(ycols: &YColumns, options: &TableOptions) -> Result<()> {
    if options.resolution.is_some() && ycols.len() != 1 {
        return Err(Error::UnsupportedCombination(format!(
            "resampling works on a single Y column, but {} were requested",
            ycols.len()
        )));
    }
    Ok(())
}

/// Read, validate and prepare one table from `path`.
///
/// Resampling, when requested, happens before trimming.
fn load_one(path: &Path, xcol: usize, ycols: &YColumns, options: &TableOptions) -> Result<(Table, ColumnRef, Vec<ColumnRef>)> {
    let table = read_table(path, options.columns.as_deref(), options.delimiter)?;
    let (x, yy) = resolve_refs(xcol, ycols, std::slice::from_ref(&table))?;

    let table = match options.resolution {
        Some(step) => resample_table(&table, step, x, yy[0], options)?,
        None => {
            log::debug!("Not resampling table {}", path.display());
            table
        }
    };
    let mut table = trim_table(
        &table,
        x.index(),
        &options.x_unit,
        options.x_low,
        options.x_high,
        &options.limits_unit,
        options.bench_trim,
    )?;

    if table.columns[x.index()].unit.is_none() {
        table.columns[x.index()].unit = Some(options.x_unit.clone());
    }
    for y in &yy {
        if table.columns[y.index()].unit.is_none() {
            table.columns[y.index()].unit = Some(options.y_unit.clone());
        }
    }
    log::debug!("Table meta: {:?}", table.meta);
    Ok((table, x, yy))
}

/// Regrid every non-X column onto the uniform grid so column positions
/// stay valid.  Only a failure on the requested Y column is an error.
fn resample_table(table: &Table, step: f64, x: ColumnRef, y: ColumnRef, options: &TableOptions) -> Result<Table> {
    log::debug!("Resampling table '{}' to {step}", table.meta.title);
    let (grid, _) = resample_column(table, step, x.index(), &options.x_unit, y.index(), options.bench_trim)?;
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(j, col)| {
            if j == x.index() {
                return Ok(Column::new(col.name.clone(), col.unit.clone(), grid.clone()));
            }
            match resample_column(table, step, x.index(), &options.x_unit, j, options.bench_trim) {
                Ok((_, values)) => Ok(Column::new(col.name.clone(), col.unit.clone(), values)),
                Err(e) if j != y.index() => {
                    log::warn!("Column '{}' could not be resampled ({e}), filling with NaN", col.name);
                    Ok(Column::new(col.name.clone(), col.unit.clone(), vec![f64::NAN; grid.len()]))
                }
                Err(e) => Err(e),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let unit = table.columns[x.index()].unit_or(&options.x_unit);
    Ok(Table::new(columns, table.meta.clone())
        .with_history(format!("Resampled to a uniform {step} {unit} grid (Akima)")))
}

/// One table read from a file.
#[derive(Debug, Clone)]
pub struct TableFromFile {
    pub path: PathBuf,
    /// One-based X column.
    pub xcol: usize,
    /// One-based Y column(s).
    pub ycol: YColumns,
    pub options: TableOptions,
}

impl TableFromFile {
    pub fn new(path: impl Into<PathBuf>, xcol: usize, ycol: impl Into<YColumns>, options: TableOptions) -> Self {
        TableFromFile {
            path: path.into(),
            xcol,
            ycol: ycol.into(),
            options,
        }
    }
}

impl TableSource for TableFromFile {
    fn ntab(&self) -> usize {
        1
    }

    fn ncol(&self) -> usize {
        self.ycol.len()
    }

    fn build_tables(&self) -> Result<LoadedTables> {
        check_resampling(&self.ycol, &self.options)?;
        let (table, x, yy) = load_one(&self.path, self.xcol, &self.ycol, &self.options)?;
        Ok(LoadedTables {
            tables: vec![table],
            x,
            yy,
        })
    }
}

/// Several tables read from files, sharing the same column layout.
#[derive(Debug, Clone)]
pub struct TablesFromFiles {
    pub paths: Vec<PathBuf>,
    pub xcol: usize,
    pub ycol: YColumns,
    pub options: TableOptions,
}

impl TablesFromFiles {
    pub fn new<P: Into<PathBuf>>(
        paths: impl IntoIterator<Item = P>,
        xcol: usize,
        ycol: impl Into<YColumns>,
        options: TableOptions,
    ) -> Self {
        TablesFromFiles {
            paths: paths.into_iter().map(Into::into).collect(),
            xcol,
            ycol: ycol.into(),
            options,
        }
    }
}

impl TableSource for TablesFromFiles {
    fn ntab(&self) -> usize {
        self.paths.len()
    }

    fn ncol(&self) -> usize {
        self.ycol.len()
    }

    fn build_tables(&self) -> Result<LoadedTables> {
        check_resampling(&self.ycol, &self.options)?;
        let mut tables = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let (table, _, _) = load_one(path, self.xcol, &self.ycol, &self.options)?;
            tables.push(table);
        }
        let (x, yy) = resolve_refs(self.xcol, &self.ycol, &tables)?;
        Ok(LoadedTables { tables, x, yy })
    }
}

/// One table already in memory.
#[derive(Debug, Clone)]
pub struct TableWrapper {
    pub table: Table,
    pub xcol: usize,
    pub ycol: YColumns,
}

impl TableWrapper {
    pub fn new(table: Table, xcol: usize, ycol: impl Into<YColumns>) -> Self {
        TableWrapper {
            table,
            xcol,
            ycol: ycol.into(),
        }
    }
}

impl TableSource for TableWrapper {
    fn ntab(&self) -> usize {
        1
    }

    fn ncol(&self) -> usize {
        self.ycol.len()
    }

    fn build_tables(&self) -> Result<LoadedTables> {
        self.table.validate()?;
        let tables = vec![self.table.clone()];
        let (x, yy) = resolve_refs(self.xcol, &self.ycol, &tables)?;
        Ok(LoadedTables { tables, x, yy })
    }
}

/// Several tables already in memory.
#[derive(Debug, Clone)]
pub struct TablesWrapper {
    pub tables: Vec<Table>,
    pub xcol: usize,
    pub ycol: YColumns,
}

impl TablesWrapper {
    pub fn new(tables: Vec<Table>, xcol: usize, ycol: impl Into<YColumns>) -> Self {
        TablesWrapper {
            tables,
            xcol,
            ycol: ycol.into(),
        }
    }
}

impl TableSource for TablesWrapper {
    fn ntab(&self) -> usize {
        self.tables.len()
    }

    fn ncol(&self) -> usize {
        self.ycol.len()
    }

    fn build_tables(&self) -> Result<LoadedTables> {
        for table in &self.tables {
            table.validate()?;
        }
        let tables = self.tables.clone();
        let (x, yy) = resolve_refs(self.xcol, &self.ycol, &tables)?;
        Ok(LoadedTables { tables, x, yy })
    }
}
