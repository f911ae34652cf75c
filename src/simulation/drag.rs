//! Power-balance estimate of the magnetic drag
//!
//! Electrical power `emf * i` is equated with mechanical power `F * v`,
//! giving `F = emf * i / v`. Samples where the magnet is (almost) at rest
//! report zero. Used for reporting; the trajectory only sees it in the
//! coupled integrator.

use super::error::Result;
use super::states::{check_finite, check_len, CircuitSeries, CoilSeries, DragSeries, Series};

/// Absolute part of the velocity guard
const EPS_ABS: f64 = 1e-12;
/// Part of the velocity guard relative to peak |v|
const EPS_REL: f64 = 1e-12;

/// Velocity below which the drag is reported as zero
pub fn velocity_epsilon(v: &Series) -> f64 {
    epsilon_for_peak(v.amax())
}

/// Velocity guard for a known peak |v|
pub fn epsilon_for_peak(v_peak: f64) -> f64 {
    EPS_ABS + v_peak * EPS_REL
}

/// `emf * i / v`, zero when `|v| <= eps`
pub fn power_balance_force(emf: f64, current: f64, v: f64, eps: f64) -> f64 {
    if v.abs() > eps {
        emf * current / v
    } else {
        0.0
    }
}

/// Per-coil and aggregate drag for a run
pub fn estimate(coils: &[(&CoilSeries, &CircuitSeries)], v: &Series) -> Result<DragSeries> {
    let n = v.len();
    let eps = velocity_epsilon(v);

    let mut per_coil = Vec::with_capacity(coils.len());
    let mut total = Series::zeros(n);
    for (series, circuit) in coils {
        check_len("emf", &series.emf, n)?;
        check_len("current", &circuit.current, n)?;

        let force = Series::from_fn(n, |k, _| power_balance_force(series.emf[k], circuit.current[k], v[k], eps));
        total += &force;
        per_coil.push(force);
    }
    check_finite("Fmag_total", &total)?;

    Ok(DragSeries { per_coil, total })
}
