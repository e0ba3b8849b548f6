use serde::{Deserialize, Serialize};

use crate::bench::LABEL_LENGTH;
use crate::data::model::Table;
use crate::error::{Error, Result};
use crate::source::ColumnRef;
use crate::style::{LineStyle, Marker};

use super::group::{check_count, grouped, some_all, truncated, Cardinality, Group};

/// What the attribute resolvers may look at once tables are loaded.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub tables: &'a [Table],
    pub yy: &'a [ColumnRef],
}

impl Context<'_> {
    pub fn ntab(&self) -> usize {
        self.tables.len()
    }

    pub fn ncol(&self) -> usize {
        self.yy.len()
    }

    fn y_name(&self, table: &Table, y: ColumnRef) -> String {
        y.get(table).map(|c| c.name.clone()).unwrap_or_default()
    }

    /// Truncated Y column names, table by table.
    fn short_names(&self, length: usize) -> Vec<Option<String>> {
        self.tables
            .iter()
            .flat_map(|t| self.yy.iter().map(move |&y| Some(truncated(&self.y_name(t, y), length))))
            .collect()
    }

    fn first_title(&self) -> String {
        self.tables.first().map(|t| t.meta.title.clone()).unwrap_or_default()
    }

    fn every_title(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.meta.title.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// One struct per table × column shape
// ---------------------------------------------------------------------------

/// One table, one Y column, one panel.
///
/// Title defaults to the table title; legend, marker and line style default
/// to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTableColumn {
    pub title: Option<String>,
    pub legend: Option<String>,
    pub marker: Option<Marker>,
    pub linestyle: Option<LineStyle>,
}

/// One table, several Y columns, one panel.
///
/// Legends default to the abbreviated Y column names. Lists must have one
/// entry per Y column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTableColumns {
    pub title: Option<String>,
    pub legends: Option<Vec<String>>,
    pub markers: Option<Vec<Marker>>,
    pub linestyles: Option<Vec<LineStyle>>,
    pub label_length: usize,
}

/// Several tables, one Y column each, overlaid in one panel.
///
/// Title defaults to the first table's title, legends to each table label.
/// Lists have one entry per table or a single shared entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTablesColumn {
    pub title: Option<String>,
    pub legends: Option<Vec<String>>,
    pub markers: Option<Vec<Marker>>,
    pub linestyles: Option<Vec<LineStyle>>,
}

/// Several tables, several Y columns each, overlaid in one panel.
///
/// Legends default to `label-Column.`. Lists have either one entry per Y
/// column (repeated for every table) or one per table and Y column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTablesColumns {
    pub title: Option<String>,
    pub legends: Option<Vec<String>>,
    pub markers: Option<Vec<Marker>>,
    pub linestyles: Option<Vec<LineStyle>>,
    pub label_length: usize,
}

/// Several tables, one Y column each, one panel per table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiTablesColumn {
    /// One title per panel.
    pub titles: Option<Vec<String>>,
    pub legend: Option<String>,
    pub marker: Option<Marker>,
    pub linestyle: Option<LineStyle>,
    pub label_length: usize,
}

/// Several tables, several Y columns each, one panel per table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiTablesColumns {
    /// One title per panel.
    pub titles: Option<Vec<String>>,
    /// One legend per Y column, repeated in every panel.
    pub legends: Option<Vec<String>>,
    pub markers: Option<Vec<Marker>>,
    pub linestyles: Option<Vec<LineStyle>>,
    pub label_length: usize,
}

macro_rules! default_label_length {
    ($($ty:ident { $($field:ident),* }),* $(,)?) => {
        $(
            impl Default for $ty {
                fn default() -> Self {
                    $ty {
                        $($field: None,)*
                        label_length: LABEL_LENGTH,
                    }
                }
            }
        )*
    };
}

default_label_length!(
    SingleTableColumns { title, legends, markers, linestyles },
    SingleTablesColumns { title, legends, markers, linestyles },
    MultiTablesColumn { titles, legend, marker, linestyle },
    MultiTablesColumns { titles, legends, markers, linestyles },
);

// ---------------------------------------------------------------------------
// Layout – the closed set of shapes
// ---------------------------------------------------------------------------

/// How tables and Y columns are arranged, with the user overrides for each
/// attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Layout {
    SingleTableColumn(SingleTableColumn),
    SingleTableColumns(SingleTableColumns),
    SingleTablesColumn(SingleTablesColumn),
    SingleTablesColumns(SingleTablesColumns),
    MultiTablesColumn(MultiTablesColumn),
    MultiTablesColumns(MultiTablesColumns),
}

macro_rules! layout_from {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Layout {
                fn from(v: $ty) -> Self {
                    Layout::$ty(v)
                }
            }
        )*
    };
}

layout_from!(
    SingleTableColumn,
    SingleTableColumns,
    SingleTablesColumn,
    SingleTablesColumns,
    MultiTablesColumn,
    MultiTablesColumns
);

fn one_of<T: Clone>(value: &Option<T>) -> Option<Vec<Option<T>>> {
    value.as_ref().map(|v| vec![Some(v.clone())])
}

fn user_title(title: &Option<String>, fallback: impl FnOnce() -> String) -> Vec<String> {
    vec![title.clone().unwrap_or_else(fallback)]
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::SingleTableColumn(_) => "single table, single column",
            Layout::SingleTableColumns(_) => "single table, multiple columns",
            Layout::SingleTablesColumn(_) => "multiple tables, single column",
            Layout::SingleTablesColumns(_) => "multiple tables, multiple columns",
            Layout::MultiTablesColumn(_) => "one panel per table, single column",
            Layout::MultiTablesColumns(_) => "one panel per table, multiple columns",
        }
    }

    /// Fail when the source shape does not fit this layout.
    pub fn check_shape(&self, ntab: usize, ncol: usize) -> Result<()> {
        let ok = match self {
            Layout::SingleTableColumn(_) => ntab == 1 && ncol == 1,
            Layout::SingleTableColumns(_) => ntab == 1 && ncol >= 1,
            Layout::SingleTablesColumn(_) | Layout::MultiTablesColumn(_) => ntab >= 1 && ncol == 1,
            Layout::SingleTablesColumns(_) | Layout::MultiTablesColumns(_) => ntab >= 1 && ncol >= 1,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::cardinality(format!(
                "layout '{}' cannot show {ntab} table(s) with {ncol} Y column(s)",
                self.name()
            )))
        }
    }

    /// Whether each table gets its own panel.
    pub fn panel_per_table(&self) -> bool {
        matches!(self, Layout::MultiTablesColumn(_) | Layout::MultiTablesColumns(_))
    }

    pub fn titles(&self, ctx: &Context) -> Result<Vec<String>> {
        let ntab = ctx.ntab();
        let ncol = ctx.ncol();
        let titles = match self {
            Layout::SingleTableColumn(SingleTableColumn { title, .. })
            | Layout::SingleTableColumns(SingleTableColumns { title, .. })
            | Layout::SingleTablesColumn(SingleTablesColumn { title, .. })
            | Layout::SingleTablesColumns(SingleTablesColumns { title, .. }) => {
                user_title(title, || ctx.first_title())
            }
            Layout::MultiTablesColumn(MultiTablesColumn { titles, .. })
            | Layout::MultiTablesColumns(MultiTablesColumns { titles, .. }) => {
                check_count("titles", titles.as_ref().map(Vec::len), Cardinality::Tables, ntab, ncol)?;
                titles.clone().unwrap_or_else(|| ctx.every_title())
            }
        };
        Ok(titles)
    }

    pub fn legends(&self, ctx: &Context) -> Result<Group<String>> {
        let ntab = ctx.ntab();
        let ncol = ctx.ncol();
        let flat = match self {
            Layout::SingleTableColumn(v) => one_of(&v.legend),
            Layout::SingleTableColumns(v) => {
                check_count("labels", v.legends.as_ref().map(Vec::len), Cardinality::Columns, ntab, ncol)?;
                some_all(v.legends.as_deref()).or_else(|| Some(ctx.short_names(v.label_length)))
            }
            Layout::SingleTablesColumn(v) => {
                check_count("legends", v.legends.as_ref().map(Vec::len), Cardinality::TablesOrOne, ntab, ncol)?;
                some_all(v.legends.as_deref())
                    .or_else(|| Some(ctx.tables.iter().map(|t| Some(t.meta.label.clone())).collect()))
            }
            Layout::SingleTablesColumns(v) => {
                check_count("legends", v.legends.as_ref().map(Vec::len), Cardinality::ColumnsOrCells, ntab, ncol)?;
                some_all(v.legends.as_deref()).or_else(|| {
                    Some(
                        ctx.tables
                            .iter()
                            .flat_map(|t| {
                                ctx.yy.iter().map(move |&y| {
                                    Some(format!("{}-{}", t.meta.label, truncated(&ctx.y_name(t, y), v.label_length)))
                                })
                            })
                            .collect(),
                    )
                })
            }
            Layout::MultiTablesColumn(v) => one_of(&v.legend).or_else(|| Some(ctx.short_names(v.label_length))),
            Layout::MultiTablesColumns(v) => {
                check_count("legends", v.legends.as_ref().map(Vec::len), Cardinality::Columns, ntab, ncol)?;
                some_all(v.legends.as_deref()).or_else(|| Some(ctx.short_names(v.label_length)))
            }
        };
        grouped(flat, ntab, ncol)
    }

    pub fn markers(&self, ctx: &Context) -> Result<Group<Marker>> {
        let (ntab, ncol) = (ctx.ntab(), ctx.ncol());
        let flat = match self {
            Layout::SingleTableColumn(v) => one_of(&v.marker),
            Layout::MultiTablesColumn(v) => one_of(&v.marker),
            Layout::SingleTableColumns(v) => listed("markers", &v.markers, Cardinality::Columns, ntab, ncol)?,
            Layout::SingleTablesColumn(v) => listed("markers", &v.markers, Cardinality::TablesOrOne, ntab, ncol)?,
            Layout::SingleTablesColumns(v) => listed("markers", &v.markers, Cardinality::ColumnsOrCells, ntab, ncol)?,
            Layout::MultiTablesColumns(v) => listed("markers", &v.markers, Cardinality::Columns, ntab, ncol)?,
        };
        grouped(flat, ntab, ncol)
    }

    pub fn linestyles(&self, ctx: &Context) -> Result<Group<LineStyle>> {
        let (ntab, ncol) = (ctx.ntab(), ctx.ncol());
        let flat = match self {
            Layout::SingleTableColumn(v) => one_of(&v.linestyle),
            Layout::MultiTablesColumn(v) => one_of(&v.linestyle),
            Layout::SingleTableColumns(v) => listed("linestyles", &v.linestyles, Cardinality::Columns, ntab, ncol)?,
            Layout::SingleTablesColumn(v) => listed("linestyles", &v.linestyles, Cardinality::TablesOrOne, ntab, ncol)?,
            Layout::SingleTablesColumns(v) => listed("linestyles", &v.linestyles, Cardinality::ColumnsOrCells, ntab, ncol)?,
            Layout::MultiTablesColumns(v) => listed("linestyles", &v.linestyles, Cardinality::Columns, ntab, ncol)?,
        };
        grouped(flat, ntab, ncol)
    }
}

/// Validate an optional user list and wrap its values for grouping.
fn listed<T: Clone>(
    noun: &str,
    values: &Option<Vec<T>>,
    rule: Cardinality,
    ntab: usize,
    ncol: usize,
) -> Result<Option<Vec<Option<T>>>> {
    check_count(noun, values.as_ref().map(Vec::len), rule, ntab, ncol)?;
    Ok(some_all(values.as_deref()))
}
