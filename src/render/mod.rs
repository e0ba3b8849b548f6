//! Turns resolved [`Elements`] into a drawing plan.
//!
//! The drawing library itself lives outside this crate: a [`Renderer`]
//! receives a [`RenderPlan`] where every series already has its data,
//! colour, marker, line style and label.

pub mod pass;

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::{generate_palette, ColorMap, Rgb};
use crate::data::model::{Column, Table};
use crate::elements::Elements;
use crate::error::{Error, Result};
use crate::style::{LineStyle, Marker};
use crate::units::Unit;

pub use pass::{BoxStrategy, ChangesStrategy, Pass, PassStrategy, TextBox};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Style sheet the drawing collaborator should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleSheet {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub nrows: usize,
    pub ncols: usize,
    /// Draw the monochromator filter changes.
    pub changes: bool,
    /// Show dimensionless Y columns as percentages.
    pub percent: bool,
    pub log_y: bool,
    pub linewidth: f64,
    pub save_path: Option<PathBuf>,
    pub save_dpi: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            nrows: 1,
            ncols: 1,
            changes: true,
            percent: false,
            log_y: false,
            linewidth: 1.0,
            save_path: None,
            save_dpi: None,
        }
    }
}

impl RenderConfig {
    /// Everything drawn on one panel.
    pub fn is_single(&self) -> bool {
        self.nrows * self.ncols == 1
    }

    pub fn style(&self) -> StyleSheet {
        if self.is_single() {
            StyleSheet::Single
        } else {
            StyleSheet::Multi
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub marker: Marker,
    pub linestyle: LineStyle,
    pub color: Rgb,
    pub linewidth: f64,
}

/// Vertical line at a fixed X position.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub x: f64,
    pub label: String,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub log_y: bool,
    pub series: Vec<Series>,
    pub reference_lines: Vec<ReferenceLine>,
    pub text_boxes: Vec<TextBox>,
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub style: StyleSheet,
    pub nrows: usize,
    pub ncols: usize,
    /// Figure title, only set for a single shared panel.
    pub figure_title: Option<String>,
    pub panels: Vec<Panel>,
    /// Grid cells left empty after the last panel.
    pub hidden_panels: usize,
    pub save_path: Option<PathBuf>,
    pub save_dpi: Option<u32>,
}

/// The drawing collaborator.
pub trait Renderer {
    fn render(&mut self, plan: &RenderPlan) -> Result<()>;
}

fn axis_label(column: &Column, unit: Option<&Unit>) -> String {
    match unit {
        Some(u) if !u.is_dimensionless() => format!("{} [{u}]", column.name),
        _ => column.name.clone(),
    }
}

fn as_percent(column: &Column, config: &RenderConfig) -> bool {
    config.percent && column.unit.as_ref().map_or(true, Unit::is_dimensionless)
}

/// Values to cycle through: the defaults when nothing was chosen, the
/// chosen values otherwise.
fn cycled<T: Copy>(chosen: &[Option<T>], defaults: &[T], nothing: T) -> Vec<T> {
    if chosen.iter().all(Option::is_none) {
        defaults.to_vec()
    } else {
        chosen.iter().map(|v| v.unwrap_or(nothing)).collect()
    }
}

fn labels(table: &Table, elements: &Elements, config: &RenderConfig) -> Result<(String, String)> {
    let missing = || Error::format(format!("table '{}' lacks a referenced column", table.meta.title));
    let xcol = elements.x.get(table).ok_or_else(missing)?;
    let ycol = elements.yy.first().and_then(|y| y.get(table)).ok_or_else(missing)?;
    let y_unit = if as_percent(ycol, config) {
        Some(Unit::Percent)
    } else {
        ycol.unit.clone()
    };
    Ok((axis_label(xcol, xcol.unit.as_ref()), axis_label(ycol, y_unit.as_ref())))
}

/// Lay out `elements` for drawing.
///
/// A 1×1 grid overlays every table on one panel under `titles[0]`; larger
/// grids give each table its own panel.
pub fn plan(elements: &Elements, config: &RenderConfig, strategy: &dyn PassStrategy) -> Result<RenderPlan> {
    elements.validate()?;
    let single = config.is_single();
    let cells = config.nrows * config.ncols;
    let ntab = elements.ntab();
    if !single && cells < ntab {
        return Err(Error::UnsupportedCombination(format!(
            "{ntab} tables do not fit in a {}x{} grid",
            config.nrows, config.ncols
        )));
    }
    log::info!("Planning {ntab} table(s) on a {}x{} grid", config.nrows, config.ncols);

    let titles: Vec<String> = if elements.titles.len() == 1 {
        vec![elements.titles[0].clone(); ntab]
    } else {
        elements.titles.clone()
    };

    let series_palette = generate_palette(ntab * elements.ncol());
    let column_names: BTreeSet<String> = elements
        .tables
        .iter()
        .flat_map(|t| elements.yy.iter().filter_map(move |y| y.get(t)).map(|c| c.name.clone()))
        .collect();
    let column_colors = ColorMap::new(&column_names);

    let mut panels: Vec<Panel> = Vec::new();
    for (i, table) in elements.tables.iter().enumerate() {
        let (x_label, y_label) = labels(table, elements, config)?;
        if single && i == 0 {
            panels.push(Panel::default());
        } else if !single {
            panels.push(Panel {
                title: Some(titles[i].clone()),
                ..Default::default()
            });
        }
        let Some(panel) = panels.last_mut() else {
            continue;
        };
        panel.x_label = x_label;
        panel.y_label = y_label;
        panel.log_y = config.log_y;
        strategy.decorate(panel, Pass::of(i), single);

        let xcol = elements.x.get(table).ok_or_else(|| Error::format("missing X column"))?;
        let markers = cycled(&elements.markers_grp[i], &Marker::DEFAULTS, Marker::Nothing);
        let linestyles = cycled(&elements.linestyles_grp[i], &LineStyle::DEFAULTS, LineStyle::Nothing);
        for (j, y) in elements.yy.iter().enumerate() {
            let ycol = y.get(table).ok_or_else(|| Error::format("missing Y column"))?;
            let scale = if as_percent(ycol, config) { 100.0 } else { 1.0 };
            let color = if single {
                series_palette[i * elements.ncol() + j]
            } else {
                column_colors.color_for(&ycol.name)
            };
            let label = elements.legends_grp[i][j].clone();
            panel.show_legend |= label.is_some();
            panel.series.push(Series {
                label,
                x: xcol.values.clone(),
                y: ycol.values.iter().map(|v| v * scale).collect(),
                marker: markers[j % markers.len()],
                linestyle: linestyles[j % linestyles.len()],
                color,
                linewidth: config.linewidth,
            });
        }
        log::debug!("Table '{}' planned with {} series", table.meta.title, elements.ncol());
    }

    Ok(RenderPlan {
        style: config.style(),
        nrows: config.nrows,
        ncols: config.ncols,
        figure_title: single.then(|| elements.titles[0].clone()),
        hidden_panels: if single { 0 } else { cells - ntab },
        panels,
        save_path: config.save_path.clone(),
        save_dpi: config.save_dpi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::TableMeta;
    use crate::elements::{build_elements, MultiTablesColumns, SingleTablesColumn};
    use crate::source::TablesWrapper;

    fn filter(label: &str) -> Table {
        Table::new(
            vec![
                Column::new("Wavelength", Some(Unit::Nanometer), vec![400.0, 500.0]),
                Column::new("Electrical Current", Some(Unit::Ampere), vec![1.0, 2.0]),
                Column::new("Transmission", Some(Unit::Dimensionless), vec![0.25, 0.5]),
            ],
            TableMeta {
                title: format!("{label} filter"),
                label: label.to_string(),
                ..Default::default()
            },
        )
    }

    fn tables() -> Vec<Table> {
        vec![filter("Blue"), filter("Red")]
    }

    #[test]
    fn shared_panel_overlays_tables() {
        let elements = build_elements(TablesWrapper::new(tables(), 1, 3), SingleTablesColumn::default()).unwrap();
        let config = RenderConfig {
            percent: true,
            ..Default::default()
        };
        let plan = plan(&elements, &config, &ChangesStrategy::new(true)).unwrap();
        assert_eq!(plan.style, StyleSheet::Single);
        assert_eq!(plan.figure_title.as_deref(), Some("Blue filter"));
        assert_eq!(plan.panels.len(), 1);
        let panel = &plan.panels[0];
        assert_eq!(panel.series.len(), 2);
        assert_eq!(panel.reference_lines.len(), 2);
        assert_eq!(panel.x_label, "Wavelength [nm]");
        assert_eq!(panel.y_label, "Transmission [%]");
        assert_eq!(panel.series[0].y, vec![25.0, 50.0]);
        assert_eq!(panel.series[0].marker, Marker::Circle);
        assert_eq!(panel.series[1].label.as_deref(), Some("Red"));
        assert_ne!(panel.series[0].color, panel.series[1].color);
    }

    #[test]
    fn grid_gives_one_panel_per_table() {
        let elements = build_elements(TablesWrapper::new(tables(), 1, vec![2, 3]), MultiTablesColumns::default()).unwrap();
        let config = RenderConfig {
            nrows: 2,
            ncols: 2,
            ..Default::default()
        };
        let plan = plan(&elements, &config, &ChangesStrategy::new(false)).unwrap();
        assert_eq!(plan.style, StyleSheet::Multi);
        assert_eq!(plan.panels.len(), 2);
        assert_eq!(plan.hidden_panels, 2);
        assert!(plan.figure_title.is_none());
        assert_eq!(plan.panels[1].title.as_deref(), Some("Red filter"));
        assert_eq!(plan.panels[0].y_label, "Electrical Current [A]");
        assert_eq!(plan.panels[0].series[0].color, plan.panels[1].series[0].color);
        assert_eq!(plan.panels[0].series[1].marker, Marker::Square);
        assert!(plan.panels.iter().all(|p| p.reference_lines.is_empty()));
    }

    #[test]
    fn grid_too_small() {
        let elements = build_elements(TablesWrapper::new(tables(), 1, 2), SingleTablesColumn::default()).unwrap();
        let config = RenderConfig {
            nrows: 1,
            ncols: 1,
            ..Default::default()
        };
        assert!(plan(&elements, &config, &ChangesStrategy::default()).is_ok());
        let config = RenderConfig {
            nrows: 1,
            ncols: 3,
            ..Default::default()
        };
        assert!(plan(&elements, &config, &ChangesStrategy::default()).is_ok());
        let three = vec![filter("Blue"), filter("Green"), filter("Red")];
        let elements = build_elements(TablesWrapper::new(three, 1, 2), SingleTablesColumn::default()).unwrap();
        let config = RenderConfig {
            nrows: 1,
            ncols: 2,
            ..Default::default()
        };
        assert!(matches!(
            plan(&elements, &config, &ChangesStrategy::default()),
            Err(Error::UnsupportedCombination(_))
        ));
    }

    #[test]
    fn chosen_values_cycle() {
        assert_eq!(
            cycled(&[None, Some(LineStyle::Dotted)], &LineStyle::DEFAULTS, LineStyle::Nothing),
            vec![LineStyle::Nothing, LineStyle::Dotted]
        );
        assert_eq!(cycled::<Marker>(&[None, None], &Marker::DEFAULTS, Marker::Nothing).len(), 9);
    }

    struct Recorder(Vec<usize>);

    impl Renderer for Recorder {
        fn render(&mut self, plan: &RenderPlan) -> Result<()> {
            self.0.push(plan.panels.len());
            Ok(())
        }
    }

    #[test]
    fn renderer_receives_plan() {
        let elements = build_elements(TablesWrapper::new(tables(), 1, 2), SingleTablesColumn::default()).unwrap();
        let plan = plan(&elements, &RenderConfig::default(), &ChangesStrategy::default()).unwrap();
        let mut recorder = Recorder(Vec::new());
        recorder.render(&plan).unwrap();
        assert_eq!(recorder.0, vec![1]);
    }
}
