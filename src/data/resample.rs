use crate::bench;
use crate::error::{Error, Result};
use crate::units::Unit;

use super::model::Table;

// ---------------------------------------------------------------------------
// Akima interpolation
// ---------------------------------------------------------------------------

/// Piecewise cubic Hermite interpolant with Akima slopes.
///
/// Avoids the overshoot of natural splines near abrupt changes, which matters
/// for band-pass filter edges. Evaluation outside the sample range yields NaN.
#[derive(Debug, Clone)]
pub struct Akima {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Derivative at every knot.
    t: Vec<f64>,
}

impl Akima {
    /// Build the interpolant. Samples may come in any order but X values
    /// must be distinct once NaN pairs are discarded.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::Interpolation(format!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        let mut pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .map(|(a, b)| (*a, *b))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        if pairs.len() < 2 {
            return Err(Error::Interpolation(format!(
                "at least 2 samples needed, got {}",
                pairs.len()
            )));
        }
        if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(Error::Interpolation("duplicated X values".into()));
        }
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let t = akima_slopes(&x, &y);
        Ok(Akima { x, y, t })
    }

    pub fn eval(&self, at: f64) -> f64 {
        let n = self.x.len();
        if at.is_nan() || at < self.x[0] || at > self.x[n - 1] {
            return f64::NAN;
        }
        // Index of the interval [x[i], x[i+1]] containing `at`.
        let i = match self.x.partition_point(|&v| v <= at) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };
        let h = self.x[i + 1] - self.x[i];
        let m = (self.y[i + 1] - self.y[i]) / h;
        let (t0, t1) = (self.t[i], self.t[i + 1]);
        let c2 = (3.0 * m - 2.0 * t0 - t1) / h;
        let c3 = (t0 + t1 - 2.0 * m) / (h * h);
        let s = at - self.x[i];
        self.y[i] + s * (t0 + s * (c2 + s * c3))
    }
}

fn akima_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let segments: Vec<f64> = (0..n - 1)
        .map(|i| (y[i + 1] - y[i]) / (x[i + 1] - x[i]))
        .collect();
    if n == 2 {
        return vec![segments[0]; 2];
    }
    // Two extra slopes on each end, extrapolated linearly.
    let first = segments[0];
    let second = segments[1];
    let last = segments[n - 2];
    let before_last = segments[n - 3];
    let mm = 2.0 * first - second;
    let mmm = 2.0 * mm - first;
    let mp = 2.0 * last - before_last;
    let mpp = 2.0 * mp - last;

    let mut m = Vec::with_capacity(n + 3);
    m.push(mmm);
    m.push(mm);
    m.extend_from_slice(&segments);
    m.push(mp);
    m.push(mpp);

    let dm: Vec<f64> = m.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let f12_max = (0..n)
        .map(|i| dm[i + 2] + dm[i])
        .fold(0.0_f64, f64::max);

    (0..n)
        .map(|i| {
            let f1 = dm[i + 2];
            let f2 = dm[i];
            let f12 = f1 + f2;
            if f12 > 1e-9 * f12_max {
                (f1 * m[i + 1] + f2 * m[i + 2]) / f12
            } else {
                0.5 * (m[i + 1] + m[i + 2])
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Uniform regridding
// ---------------------------------------------------------------------------

/// Uniform grid from `start` to `end` (inclusive when reachable) in `step` steps.
pub fn uniform_grid(start: f64, end: f64, step: f64) -> Vec<f64> {
    let count = ((end - start) / step + 1e-9).floor();
    if !(count >= 0.0) {
        return Vec::new();
    }
    (0..=count as usize).map(|k| start + k as f64 * step).collect()
}

/// Regrid column `ycol` of `table` onto a uniform X grid.
///
/// The grid spans `ceil(min X)` .. `floor(max X)`, or the bench range when
/// `bench_clamp` is set, and is returned together with the interpolated
/// values. Resampling must happen on the untrimmed table: trimming first
/// leaves grid points beyond the data, which evaluate to NaN.
pub fn resample_column(
    table: &Table,
    step: f64,
    xcol: usize,
    x_unit: &Unit,
    ycol: usize,
    bench_clamp: bool,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if !(step > 0.0) {
        return Err(Error::Interpolation(format!(
            "resampling step must be positive, got {step}"
        )));
    }
    table.validate()?;
    let x = table
        .column(xcol)
        .ok_or_else(|| Error::format(format!("table has no column at index {xcol}")))?;
    let y = table
        .column(ycol)
        .ok_or_else(|| Error::format(format!("table has no column at index {ycol}")))?;

    let (start, end) = if bench_clamp {
        bench::range_in(&x.unit_or(x_unit))?
    } else {
        let lo = x.min().ok_or_else(|| Error::Interpolation("empty X column".into()))?;
        let hi = x.max().ok_or_else(|| Error::Interpolation("empty X column".into()))?;
        (lo.ceil(), hi.floor())
    };
    let grid = uniform_grid(start, end, step);
    log::debug!(
        "Resampling column '{}' onto [{start} - {end}] with step {step} ({} points)",
        y.name,
        grid.len()
    );
    let interpolator = Akima::new(&x.values, &y.values)?;
    let values = grid.iter().map(|&g| interpolator.eval(g)).collect();
    Ok((grid, values))
}
