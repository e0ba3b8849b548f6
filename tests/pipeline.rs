use std::path::{Path, PathBuf};

use approx_eq::assert_approx_eq;
use rusty_spectra::data::loader::{read_table, write_ecsv, write_parquet};
use rusty_spectra::data::model::{Column, Table, TableMeta};
use rusty_spectra::elements::{
    build_elements, MultiTablesColumns, SingleTableColumn, SingleTableColumns, SingleTablesColumn,
    SingleTablesColumns,
};
use rusty_spectra::render::{plan, ChangesStrategy, RenderConfig};
use rusty_spectra::units::Unit;
use rusty_spectra::{Error, TableFromFile, TableOptions, TablesFromFiles};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn filter_table(label: &str, centre: f64) -> Table {
    let wavelengths: Vec<f64> = (0..=160).map(|i| 300.0 + i as f64 * 5.0).collect();
    let transmission: Vec<f64> = wavelengths
        .iter()
        .map(|wl| (-(wl - centre).powi(2) / (2.0 * 60.0_f64.powi(2))).exp())
        .collect();
    let current: Vec<f64> = transmission.iter().map(|t| 2.0e-9 + t * 1.0e-6).collect();
    let photodiode: Vec<f64> = transmission.iter().map(|t| t * 3.0e-7).collect();
    Table::new(
        vec![
            Column::new("Wavelength", Some(Unit::Nanometer), wavelengths),
            Column::new("Electrical Current", Some(Unit::Ampere), current),
            Column::new("Photodiode", Some(Unit::Ampere), photodiode),
            Column::new("Transmission", Some(Unit::Dimensionless), transmission),
        ],
        TableMeta {
            title: format!("{label} filter Measurements"),
            label: label.to_string(),
            ..Default::default()
        },
    )
}

fn write_filters(dir: &Path, ext: &str) -> Vec<PathBuf> {
    [("Blue", 450.0), ("Green", 530.0), ("Red", 640.0)]
        .iter()
        .map(|(label, centre)| {
            let path = dir.join(format!("{}.{ext}", label.to_lowercase()));
            let table = filter_table(label, *centre);
            match ext {
                "parquet" => write_parquet(&table, &path).unwrap(),
                _ => write_ecsv(&table, &path).unwrap(),
            }
            path
        })
        .collect()
}

#[test]
fn single_table_single_column_defaults() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let source = TableFromFile::new(&paths[0], 1, 2, TableOptions::default());
    let elements = build_elements(source, SingleTableColumn::default()).unwrap();

    assert_eq!(elements.titles, vec!["Blue filter Measurements".to_string()]);
    assert_eq!(elements.legends_grp, vec![vec![None]]);
    assert_eq!(elements.markers_grp, vec![vec![None]]);
    assert_eq!(elements.tables.len(), 1);
    assert_eq!(elements.tables[0].columns[0].unit, Some(Unit::Nanometer));
}

#[test]
fn single_table_columns_user_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let layout = SingleTableColumns {
        title: Some("Blue filter".into()),
        legends: Some(vec!["Current".into(), "PD".into()]),
        ..Default::default()
    };
    let source = TableFromFile::new(&paths[0], 1, vec![2, 3], TableOptions::default());
    let elements = build_elements(source, layout).unwrap();
    assert_eq!(elements.titles, vec!["Blue filter".to_string()]);
    assert_eq!(
        elements.legends_grp,
        vec![vec![Some("Current".to_string()), Some("PD".to_string())]]
    );
}

#[test]
fn three_tables_spanish_legends() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let layout = SingleTablesColumn {
        legends: Some(vec!["Azul".into(), "Verde".into(), "Rojo".into()]),
        ..Default::default()
    };
    let source = TablesFromFiles::new(paths, 1, 3, TableOptions::default());
    let elements = build_elements(source, layout).unwrap();
    assert_eq!(
        elements.legends_grp,
        vec![
            vec![Some("Azul".to_string())],
            vec![Some("Verde".to_string())],
            vec![Some("Rojo".to_string())],
        ]
    );
    assert_eq!(elements.markers_grp, vec![vec![None]; 3]);
}

#[test]
fn three_tables_two_legends_fail() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let layout = SingleTablesColumn {
        legends: Some(vec!["Azul".into(), "Verde".into()]),
        ..Default::default()
    };
    let source = TablesFromFiles::new(paths, 1, 3, TableOptions::default());
    let err = build_elements(source, layout).unwrap_err();
    assert!(matches!(err, Error::CardinalityMismatch(_)));
    assert_eq!(
        err.to_string(),
        "number of legends (2) should either match number of tables (3) or be 1"
    );
}

#[test]
fn tables_columns_cell_legends_stay_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let legends: Vec<String> = (1..=6).map(|i| format!("L{i}")).collect();
    let layout = SingleTablesColumns {
        legends: Some(legends),
        ..Default::default()
    };
    let source = TablesFromFiles::new(paths, 1, vec![2, 4], TableOptions::default());
    let elements = build_elements(source, layout).unwrap();
    assert_eq!(elements.legends_grp[0], vec![Some("L1".to_string()), Some("L2".to_string())]);
    assert_eq!(elements.legends_grp[2], vec![Some("L5".to_string()), Some("L6".to_string())]);
}

#[test]
fn y_column_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let source = TableFromFile::new(&paths[0], 1, 8, TableOptions::default());
    let err = build_elements(source, SingleTableColumn::default()).unwrap_err();
    assert!(matches!(err, Error::ColumnRange { .. }));
    assert_eq!(err.to_string(), "Y column number (8) should be 1 <= Y <= (4)");
}

#[test]
fn resample_then_trim_leaves_no_nan() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let options = TableOptions {
        resolution: Some(1.0),
        x_low: Some(402.0),
        x_high: Some(798.0),
        ..Default::default()
    };
    let source = TableFromFile::new(&paths[1], 1, 4, options);
    let elements = build_elements(source, SingleTableColumn::default()).unwrap();
    let table = &elements.tables[0];

    let x = &table.columns[0].values;
    assert_eq!(x.len(), 397);
    assert_approx_eq!(x[0], 402.0, 1e-9);
    assert_approx_eq!(x[x.len() - 1], 798.0, 1e-9);
    assert!(table.columns[3].values.iter().all(|v| v.is_finite()));
    assert_eq!(table.columns[3].values.len(), x.len());

    assert_eq!(table.meta.history.len(), 2);
    assert!(table.meta.history[0].starts_with("Resampled"));
    assert!(table.meta.history[1].starts_with("Trimmed"));
}

#[test]
fn resampling_several_columns_is_rejected() {
    let options = TableOptions {
        resolution: Some(1.0),
        ..Default::default()
    };
    let source = TableFromFile::new("missing.ecsv", 1, vec![2, 3], options);
    let err = build_elements(source, SingleTableColumns::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCombination(_)));
}

#[test]
fn bench_trim_clamps_to_instrument_range() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "parquet");
    let options = TableOptions {
        bench_trim: true,
        x_low: Some(0.2),
        limits_unit: Unit::Micrometer,
        ..Default::default()
    };
    let source = TableFromFile::new(&paths[2], 1, 4, options);
    let elements = build_elements(source, SingleTableColumn::default()).unwrap();
    let x = &elements.tables[0].columns[0];
    assert_approx_eq!(x.min().unwrap(), 350.0, 1e-9);
    assert_approx_eq!(x.max().unwrap(), 1050.0, 1e-9);
    assert_eq!(elements.titles, vec!["Red filter Measurements".to_string()]);
}

#[test]
fn ecsv_and_parquet_agree() {
    let dir = tempfile::tempdir().unwrap();
    let ecsv = write_filters(dir.path(), "ecsv");
    let parquet = write_filters(dir.path(), "parquet");
    let a = read_table(&ecsv[0], None, None).unwrap();
    let b = read_table(&parquet[0], None, None).unwrap();
    assert_eq!(a.column_names(), b.column_names());
    assert_eq!(a.meta.title, b.meta.title);
    for (ca, cb) in a.columns.iter().zip(&b.columns) {
        assert_eq!(ca.unit, cb.unit);
        assert_eq!(ca.values, cb.values);
    }
}

#[test]
fn multi_panel_plan_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_filters(dir.path(), "ecsv");
    let layout = MultiTablesColumns {
        legends: Some(vec!["Current".into(), "Transmission".into()]),
        ..Default::default()
    };
    let source = TablesFromFiles::new(paths, 1, vec![2, 4], TableOptions::default());
    let elements = build_elements(source, layout).unwrap();
    assert_eq!(elements.titles.len(), 3);

    let config = RenderConfig {
        nrows: 2,
        ncols: 2,
        ..Default::default()
    };
    let plan = plan(&elements, &config, &ChangesStrategy::new(true)).unwrap();
    assert_eq!(plan.panels.len(), 3);
    assert_eq!(plan.hidden_panels, 1);
    assert!(plan.panels.iter().all(|p| p.reference_lines.len() == 2));
    assert_eq!(plan.panels[2].title.as_deref(), Some("Red filter Measurements"));
    assert_eq!(plan.panels[0].x_label, "Wavelength [nm]");
}
