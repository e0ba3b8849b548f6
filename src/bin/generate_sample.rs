use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rusty_spectra::data::loader::{write_ecsv, write_parquet};
use rusty_spectra::data::model::{Column, Table, TableMeta};
use rusty_spectra::units::Unit;

/// Smooth band-pass transmission between `low` and `high` nm.
fn band_pass(wl: f64, low: f64, high: f64, edge: f64, peak: f64) -> f64 {
    let rise = 1.0 / (1.0 + (-(wl - low) / edge).exp());
    let fall = 1.0 / (1.0 + ((wl - high) / edge).exp());
    peak * rise * fall
}

/// Photodiode responsivity in A/W, a rough silicon curve.
fn responsivity(wl: f64) -> f64 {
    (0.62 * (-(wl - 900.0).powi(2) / (2.0 * 220.0_f64.powi(2))).exp()).max(0.02)
}

/// Deterministic measurement noise (SplitMix64 stream).
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        (z ^ (z >> 31)) as f64 / u64::MAX as f64
    }

    /// Roughly normal sample: sum of twelve uniforms, centred.
    fn normal(&mut self, sigma: f64) -> f64 {
        let sum: f64 = (0..12).map(|_| self.uniform()).sum();
        (sum - 6.0) * sigma
    }
}

fn filter_table(label: &str, low: f64, high: f64, noise: &mut Noise) -> Table {
    // 350 → 1050 nm, step 5, as the bench sweeps
    let wavelengths: Vec<f64> = (0..=140).map(|i| 350.0 + i as f64 * 5.0).collect();
    let transmission: Vec<f64> = wavelengths
        .iter()
        .map(|&wl| (band_pass(wl, low, high, 12.0, 0.92) + noise.normal(0.004)).max(0.0))
        .collect();
    let photodiode: Vec<f64> = wavelengths
        .iter()
        .zip(&transmission)
        .map(|(&wl, &t)| 1.0e-6 * responsivity(wl) * t)
        .collect();
    let current: Vec<f64> = photodiode
        .iter()
        .map(|&pd| pd * 3.5e3 + noise.normal(1.0e-6).abs())
        .collect();

    Table::new(
        vec![
            Column::new("Wavelength", Some(Unit::Nanometer), wavelengths),
            Column::new("Electrical Current", Some(Unit::Ampere), current),
            Column::new("Photodiode Current", Some(Unit::Ampere), photodiode),
            Column::new("Transmission", Some(Unit::Dimensionless), transmission),
        ],
        TableMeta {
            title: format!("{label} filter Measurements"),
            label: label.to_string(),
            history: vec!["Generated by generate_sample".to_string()],
            ..Default::default()
        },
    )
}

#[derive(Parser)]
#[command(name = "generate_sample", version, about = "Write blue/green/red filter tables for trying the pipeline")]
struct Cli {
    /// Output directory
    #[arg(default_value = "sample_data")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let out_dir = Cli::parse().out_dir;
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut noise = Noise(42);
    let filters = [("Blue", 380.0, 510.0), ("Green", 480.0, 600.0), ("Red", 590.0, 720.0)];

    for (label, low, high) in filters {
        let table = filter_table(label, low, high, &mut noise);
        let stem = label.to_lowercase();
        let ecsv = out_dir.join(format!("{stem}.ecsv"));
        let parquet = out_dir.join(format!("{stem}.parquet"));
        write_ecsv(&table, &ecsv).with_context(|| format!("writing {}", ecsv.display()))?;
        write_parquet(&table, &parquet).with_context(|| format!("writing {}", parquet.display()))?;
        log::info!("{label}: {} rows", table.len());
    }

    println!("Wrote {} filter tables to {}", filters.len(), out_dir.display());
    Ok(())
}
