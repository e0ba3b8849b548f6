use crate::bench;
use crate::error::{Error, Result};
use crate::units::Unit;

use super::model::Table;

// ---------------------------------------------------------------------------
// Range trimming: keep rows whose X value lies in [low, high]
// ---------------------------------------------------------------------------

/// Restrict `table` to the rows whose X value lies in `[x_low, x_high]`.
///
/// * `x_unit` is the unit of the X column when the column itself carries none.
/// * `x_low` / `x_high` are expressed in `limits_unit`; a missing bound
///   defaults to the observed min / max of the X column.
/// * With `bench_clamp` the interval is further narrowed to the bench range,
///   never widened.
pub fn trim_table(
    table: &Table,
    xcol: usize,
    x_unit: &Unit,
    x_low: Option<f64>,
    x_high: Option<f64>,
    limits_unit: &Unit,
    bench_clamp: bool,
) -> Result<Table> {
    table.validate()?;
    let x = table
        .column(xcol)
        .ok_or_else(|| Error::format(format!("table has no column at index {xcol}")))?;
    let unit = x.unit_or(x_unit);

    let mut high = match x_high {
        Some(v) => limits_unit.convert(v, &unit)?,
        None => x.max().unwrap_or(f64::NAN),
    };
    let mut low = match x_low {
        Some(v) => limits_unit.convert(v, &unit)?,
        None => x.min().unwrap_or(f64::NAN),
    };
    if bench_clamp {
        let (start, end) = bench::range_in(&unit)?;
        high = high.min(end);
        low = low.max(start);
    }

    let keep: Vec<bool> = x.values.iter().map(|&v| v >= low && v <= high).collect();
    let trimmed = table.select_rows(&keep);
    log::debug!(
        "Trimmed table '{}' to X range [{low} - {high}] {unit}: {} -> {} rows",
        table.meta.title,
        table.len(),
        trimmed.len()
    );
    Ok(trimmed.with_history(format!("Trimmed X column to range [{low} - {high}] {unit}")))
}
