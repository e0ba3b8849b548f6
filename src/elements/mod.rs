//! Resolution of plotting elements.
//!
//! ```text
//!  TableSource ──▶ ElementsBuilder<S> ──▶ Director ──▶ Elements
//!                     │   (Layout)
//!                     ├─ build_tables
//!                     ├─ build_titles
//!                     ├─ build_legends_grp
//!                     ├─ build_markers_grp
//!                     └─ build_linestyles_grp
//! ```
//!
//! A [`Layout`] decides how user overrides are validated and defaulted; the
//! builder pairs it with a [`TableSource`] and the [`Director`] runs the
//! steps in their fixed order.

pub mod group;
pub mod layout;

use crate::data::model::Table;
use crate::error::{Axis, Error, Result};
use crate::source::{ColumnRef, LoadedTables, TableSource};
use crate::style::{LineStyle, Marker};

pub use group::Group;
pub use layout::{
    Context, Layout, MultiTablesColumn, MultiTablesColumns, SingleTableColumn, SingleTableColumns,
    SingleTablesColumn, SingleTablesColumns,
};

// ---------------------------------------------------------------------------
// Elements – the resolved output
// ---------------------------------------------------------------------------

/// Everything the rendering side needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Elements {
    pub x: ColumnRef,
    pub yy: Vec<ColumnRef>,
    pub tables: Vec<Table>,
    /// One shared title or one per table.
    pub titles: Vec<String>,
    pub legends_grp: Group<String>,
    pub markers_grp: Group<Marker>,
    pub linestyles_grp: Group<LineStyle>,
}

impl Elements {
    pub fn ntab(&self) -> usize {
        self.tables.len()
    }

    pub fn ncol(&self) -> usize {
        self.yy.len()
    }

    /// Check the shape invariants: group sizes `ntab × ncol`, title count and
    /// column references valid in every table.
    pub fn validate(&self) -> Result<()> {
        let (ntab, ncol) = (self.ntab(), self.ncol());
        if ntab == 0 || ncol == 0 {
            return Err(Error::cardinality(format!(
                "at least one table and one Y column are needed, got {ntab} table(s) and {ncol} column(s)"
            )));
        }
        for table in &self.tables {
            table.validate()?;
        }
        check_shape("legends", &self.legends_grp, ntab, ncol)?;
        check_shape("markers", &self.markers_grp, ntab, ncol)?;
        check_shape("linestyles", &self.linestyles_grp, ntab, ncol)?;
        if self.titles.len() != 1 && self.titles.len() != ntab {
            return Err(Error::cardinality(format!(
                "number of titles ({}) should match number of tables ({ntab}) or be 1",
                self.titles.len()
            )));
        }
        ColumnRef::resolve(self.x.number(), Axis::X, &self.tables)?;
        for y in &self.yy {
            ColumnRef::resolve(y.number(), Axis::Y, &self.tables)?;
        }
        Ok(())
    }
}

fn check_shape<T>(noun: &str, group: &Group<T>, ntab: usize, ncol: usize) -> Result<()> {
    if group.len() != ntab || group.iter().any(|row| row.len() != ncol) {
        return Err(Error::cardinality(format!(
            "{noun} group should be {ntab} tables x {ncol} columns"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Build steps
// ---------------------------------------------------------------------------

/// The construction steps the [`Director`] drives.
pub trait BuildSteps {
    fn build_tables(&mut self) -> Result<()>;
    fn build_titles(&mut self) -> Result<()>;
    fn build_legends_grp(&mut self) -> Result<()>;
    fn build_markers_grp(&mut self) -> Result<()>;
    fn build_linestyles_grp(&mut self) -> Result<()>;
    /// Hand over the accumulated elements.
    fn take_elements(&mut self) -> Result<Elements>;
}

/// Builds [`Elements`] from a table source and a layout.
#[derive(Debug)]
pub struct ElementsBuilder<S> {
    source: S,
    layout: Layout,
    loaded: Option<LoadedTables>,
    titles: Vec<String>,
    legends_grp: Group<String>,
    markers_grp: Group<Marker>,
    linestyles_grp: Group<LineStyle>,
}

impl<S: TableSource> ElementsBuilder<S> {
    pub fn new(source: S, layout: impl Into<Layout>) -> Self {
        ElementsBuilder {
            source,
            layout: layout.into(),
            loaded: None,
            titles: Vec::new(),
            legends_grp: Vec::new(),
            markers_grp: Vec::new(),
            linestyles_grp: Vec::new(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn context(&self, step: &'static str) -> Result<Context<'_>> {
        let loaded = self.loaded.as_ref().ok_or(Error::BuildOrder { step })?;
        Ok(Context {
            tables: &loaded.tables,
            yy: &loaded.yy,
        })
    }
}

impl<S: TableSource> BuildSteps for ElementsBuilder<S> {
    fn build_tables(&mut self) -> Result<()> {
        self.layout.check_shape(self.source.ntab(), self.source.ncol())?;
        let loaded = self.source.build_tables()?;
        log::info!(
            "Built {} table(s) for layout '{}', X column {}, Y columns {:?}",
            loaded.tables.len(),
            self.layout.name(),
            loaded.x.number(),
            loaded.yy.iter().map(|y| y.number()).collect::<Vec<_>>()
        );
        self.loaded = Some(loaded);
        Ok(())
    }

    fn build_titles(&mut self) -> Result<()> {
        let titles = self.layout.titles(&self.context("build titles")?)?;
        log::debug!("Titles: {titles:?}");
        self.titles = titles;
        Ok(())
    }

    fn build_legends_grp(&mut self) -> Result<()> {
        let legends = self.layout.legends(&self.context("build legends")?)?;
        log::debug!("Legends: {legends:?}");
        self.legends_grp = legends;
        Ok(())
    }

    fn build_markers_grp(&mut self) -> Result<()> {
        let markers = self.layout.markers(&self.context("build markers")?)?;
        log::debug!("Markers: {markers:?}");
        self.markers_grp = markers;
        Ok(())
    }

    fn build_linestyles_grp(&mut self) -> Result<()> {
        let linestyles = self.layout.linestyles(&self.context("build line styles")?)?;
        log::debug!("Line styles: {linestyles:?}");
        self.linestyles_grp = linestyles;
        Ok(())
    }

    fn take_elements(&mut self) -> Result<Elements> {
        let loaded = self.loaded.take().ok_or(Error::BuildOrder { step: "take elements" })?;
        let elements = Elements {
            x: loaded.x,
            yy: loaded.yy,
            tables: loaded.tables,
            titles: std::mem::take(&mut self.titles),
            legends_grp: std::mem::take(&mut self.legends_grp),
            markers_grp: std::mem::take(&mut self.markers_grp),
            linestyles_grp: std::mem::take(&mut self.linestyles_grp),
        };
        elements.validate()?;
        Ok(elements)
    }
}

// ---------------------------------------------------------------------------
// Director
// ---------------------------------------------------------------------------

/// Runs the construction steps in their fixed order.
#[derive(Debug)]
pub struct Director<B> {
    builder: B,
}

impl<B: BuildSteps> Director<B> {
    pub fn new(builder: B) -> Self {
        Director { builder }
    }

    pub fn build_elements(mut self) -> Result<Elements> {
        self.builder.build_tables()?;
        self.builder.build_titles()?;
        self.builder.build_legends_grp()?;
        self.builder.build_markers_grp()?;
        self.builder.build_linestyles_grp()?;
        self.builder.take_elements()
    }
}

/// Shorthand for `Director::new(ElementsBuilder::new(source, layout)).build_elements()`.
pub fn build_elements<S: TableSource>(source: S, layout: impl Into<Layout>) -> Result<Elements> {
    Director::new(ElementsBuilder::new(source, layout)).build_elements()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, TableMeta};
    use crate::source::{TableWrapper, TablesWrapper};

    fn filter(label: &str) -> Table {
        Table::new(
            vec![
                Column::new("Wavelength", None, vec![400.0, 500.0, 600.0]),
                Column::new("Electrical Current", None, vec![1.0, 2.0, 3.0]),
                Column::new("Photodiode", None, vec![0.1, 0.2, 0.3]),
                Column::new("Transmission", None, vec![0.5, 0.6, 0.7]),
            ],
            TableMeta {
                title: format!("{label} filter Measurements"),
                label: label.to_string(),
                ..Default::default()
            },
        )
    }

    fn three() -> Vec<Table> {
        vec![filter("Blue"), filter("Green"), filter("Red")]
    }

    #[test]
    fn single_table_column_defaults() {
        let source = TableWrapper::new(filter("Blue"), 1, 2);
        let elements = build_elements(source, SingleTableColumn::default()).unwrap();
        assert_eq!(elements.titles, vec!["Blue filter Measurements".to_string()]);
        assert_eq!(elements.legends_grp, vec![vec![None]]);
        assert_eq!(elements.markers_grp, vec![vec![None]]);
        assert_eq!(elements.linestyles_grp, vec![vec![None]]);
        assert_eq!(elements.x.index(), 0);
        assert_eq!(elements.yy[0].index(), 1);
    }

    #[test]
    fn single_table_columns_legend_count() {
        let source = TableWrapper::new(filter("Blue"), 1, vec![2, 3]);
        let layout = SingleTableColumns {
            legends: Some(vec!["a".into(), "b".into(), "c".into()]),
            ..Default::default()
        };
        let err = build_elements(source, layout).unwrap_err();
        assert_eq!(err.to_string(), "number of labels (3) should match number of y-columns (2)");
    }

    #[test]
    fn single_table_columns_default_legends() {
        let source = TableWrapper::new(filter("Blue"), 1, vec![2, 3]);
        let layout = SingleTableColumns {
            markers: Some(vec![Marker::Circle, Marker::Plus]),
            ..Default::default()
        };
        let elements = build_elements(source, layout).unwrap();
        assert_eq!(
            elements.legends_grp,
            vec![vec![Some("Electr.".to_string()), Some("Photod.".to_string())]]
        );
        assert_eq!(elements.markers_grp, vec![vec![Some(Marker::Circle), Some(Marker::Plus)]]);
        assert_eq!(elements.linestyles_grp, vec![vec![None, None]]);
    }

    #[test]
    fn tables_column_user_legends() {
        let source = TablesWrapper::new(three(), 1, 3);
        let layout = SingleTablesColumn {
            legends: Some(vec!["Azul".into(), "Verde".into(), "Rojo".into()]),
            ..Default::default()
        };
        let elements = build_elements(source, layout).unwrap();
        assert_eq!(
            elements.legends_grp,
            vec![
                vec![Some("Azul".to_string())],
                vec![Some("Verde".to_string())],
                vec![Some("Rojo".to_string())]
            ]
        );
        assert_eq!(elements.titles, vec!["Blue filter Measurements".to_string()]);
    }

    #[test]
    fn tables_column_wrong_legend_count() {
        let source = TablesWrapper::new(three(), 1, 3);
        let layout = SingleTablesColumn {
            legends: Some(vec!["Azul".into(), "Verde".into()]),
            ..Default::default()
        };
        let err = build_elements(source, layout).unwrap_err();
        assert_eq!(
            err.to_string(),
            "number of legends (2) should either match number of tables (3) or be 1"
        );
    }

    #[test]
    fn tables_column_single_marker_is_shared() {
        let source = TablesWrapper::new(three(), 1, 3);
        let layout = SingleTablesColumn {
            markers: Some(vec![Marker::Star]),
            ..Default::default()
        };
        let elements = build_elements(source, layout).unwrap();
        assert_eq!(elements.markers_grp, vec![vec![Some(Marker::Star)]; 3]);
        assert_eq!(
            elements.legends_grp,
            vec![
                vec![Some("Blue".to_string())],
                vec![Some("Green".to_string())],
                vec![Some("Red".to_string())]
            ]
        );
    }

    #[test]
    fn tables_columns_replicates_per_column_legends() {
        let source = TablesWrapper::new(three(), 1, vec![2, 3]);
        let layout = SingleTablesColumns {
            legends: Some(vec!["I".into(), "PD".into()]),
            ..Default::default()
        };
        let elements = build_elements(source, layout).unwrap();
        assert_eq!(elements.legends_grp, vec![vec![Some("I".to_string()), Some("PD".to_string())]; 3]);
    }

    #[test]
    fn tables_columns_three_legends_fail() {
        let source = TablesWrapper::new(three(), 1, vec![2, 3]);
        let layout = SingleTablesColumns {
            legends: Some(vec!["a".into(), "b".into(), "c".into()]),
            ..Default::default()
        };
        let err = build_elements(source, layout).unwrap_err();
        assert_eq!(
            err.to_string(),
            "number of legends (3) should match number of tables x Y-columns (6) or the number of Y-columns (2)"
        );
    }

    #[test]
    fn multi_tables_columns_titles_and_markers() {
        let layout = MultiTablesColumns {
            titles: Some(vec!["Table 1".into(), "Table 2".into()]),
            ..Default::default()
        };
        let err = build_elements(TablesWrapper::new(three(), 1, vec![2, 3]), layout).unwrap_err();
        assert_eq!(err.to_string(), "number of titles (2) should match number of tables (3)");

        let layout = MultiTablesColumns {
            markers: Some(vec![Marker::Circle]),
            ..Default::default()
        };
        let err = build_elements(TablesWrapper::new(three(), 1, vec![2, 3]), layout).unwrap_err();
        assert_eq!(err.to_string(), "number of markers (1) should match number of y-columns (2)");
    }

    #[test]
    fn multi_tables_column_titles_default_per_table() {
        let elements = build_elements(TablesWrapper::new(three(), 1, 4), MultiTablesColumn::default()).unwrap();
        assert_eq!(
            elements.titles,
            vec![
                "Blue filter Measurements".to_string(),
                "Green filter Measurements".to_string(),
                "Red filter Measurements".to_string()
            ]
        );
        assert_eq!(elements.legends_grp, vec![vec![Some("Transm.".to_string())]; 3]);
    }

    #[test]
    fn column_out_of_range() {
        let err = build_elements(TableWrapper::new(filter("Blue"), 1, 8), SingleTableColumn::default()).unwrap_err();
        assert_eq!(err.to_string(), "Y column number (8) should be 1 <= Y <= (4)");
    }

    #[test]
    fn layout_shape_mismatch() {
        let err = build_elements(TablesWrapper::new(three(), 1, 2), SingleTableColumn::default()).unwrap_err();
        assert!(matches!(err, Error::CardinalityMismatch(_)));
    }

    #[test]
    fn steps_out_of_order() {
        let mut builder = ElementsBuilder::new(TableWrapper::new(filter("Blue"), 1, 2), SingleTableColumn::default());
        assert!(matches!(builder.build_titles(), Err(Error::BuildOrder { .. })));
    }

    #[test]
    fn validate_rejects_bad_groups() {
        let mut elements = build_elements(TableWrapper::new(filter("Blue"), 1, 2), SingleTableColumn::default()).unwrap();
        assert!(elements.validate().is_ok());
        elements.markers_grp.push(vec![None]);
        assert!(elements.validate().is_err());
    }
}
