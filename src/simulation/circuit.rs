//! RL circuit solver for loaded coils
//!
//! In series mode each coil obeys `L di/dt + (R_coil + R_load) i = emf(t)`.
//! Small `L` makes this stiff, so every sub-interval `h` takes a backward
//! Euler step
//!
//! ```text
//! alpha = h / max(L, 1e-12)
//! i_new = (i_old + alpha * emf) / (1 + alpha * R_total)
//! ```
//!
//! which is bounded for any `h`. The EMF is held at the sample from the start
//! of the outer step. Current starts at zero.

use super::error::{Result, SimError};
use super::states::{check_finite, CircuitSeries, CoilSeries, Series};

/// Floor on inductance in the implicit update
pub const MIN_INDUCTANCE: f64 = 1e-12;

/// How the coils are loaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitMode {
    /// Ideal voltmeter, no current flows
    Open,
    /// Each coil in series with its own copy of a shared load resistance
    Series { r_load: f64 },
}

impl CircuitMode {
    pub fn r_load(&self) -> Option<f64> {
        match *self {
            CircuitMode::Open => None,
            CircuitMode::Series { r_load } => Some(r_load),
        }
    }
}

/// One backward Euler step of size `h` with the source held at `emf`
pub fn implicit_step(i: f64, emf: f64, h: f64, inductance: f64, r_total: f64) -> f64 {
    let alpha = h / inductance.max(MIN_INDUCTANCE);
    (i + alpha * emf) / (1.0 + alpha * r_total)
}

/// Advance the current over one outer step of size `dt`, split into
/// `substeps` equal sub-intervals; a leftover shorter than one sub-interval
/// is taken as a final short step.
pub fn advance(i: f64, emf: f64, dt: f64, substeps: usize, inductance: f64, r_total: f64) -> f64 {
    let h = dt / substeps.max(1) as f64;
    let tol = dt.abs() * 1e-12;
    let mut i = i;
    let mut remaining = dt;
    while remaining > tol {
        let step = h.min(remaining);
        i = implicit_step(i, emf, step, inductance, r_total);
        remaining -= step;
    }
    i
}

/// Current and measured voltage for one coil
pub fn solve(coil: &CoilSeries, mode: CircuitMode, dt: f64, substeps: usize) -> Result<CircuitSeries> {
    let emf = &coil.emf;
    let n = emf.len();

    let r_load = match mode {
        CircuitMode::Open => {
            return Ok(CircuitSeries {
                current: Series::zeros(n),
                v_meas: emf.clone(),
            });
        }
        CircuitMode::Series { r_load } => r_load,
    };

    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidConfig(format!("circuit step must be positive, got {dt}")));
    }

    let r_total = coil.resistance + r_load;
    let mut current = Series::zeros(n);
    for k in 1..n {
        current[k] = advance(current[k - 1], emf[k - 1], dt, substeps, coil.inductance, r_total);
    }
    let v_meas = r_load * &current;

    check_finite("current", &current)?;
    Ok(CircuitSeries { current, v_meas })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coil(emf: Series, resistance: f64, inductance: f64) -> CoilSeries {
        let n = emf.len();
        CoilSeries {
            emf,
            flux: Series::zeros(n),
            z_rel: Series::zeros(n),
            resistance,
            inductance,
        }
    }

    #[test]
    fn open_circuit_passes_emf_through() {
        let c = coil(Series::from_vec(vec![0.0, 0.3, -0.2, 1e-9]), 5.0, 1e-4);
        let out = solve(&c, CircuitMode::Open, 1e-3, 4).unwrap();
        assert!(out.current.iter().all(|&i| i == 0.0));
        assert_eq!(out.v_meas, c.emf);
    }

    #[test]
    fn constant_source_settles_to_ohms_law() {
        let c = coil(Series::from_element(2000, 1.0), 10.0, 1e-3);
        let out = solve(&c, CircuitMode::Series { r_load: 40.0 }, 1e-4, 1).unwrap();
        assert_eq!(out.current[0], 0.0);
        let i_end = out.current[out.current.len() - 1];
        assert!((i_end - 1.0 / 50.0).abs() < 1e-9, "i_end = {i_end}");
        assert!((out.v_meas[1999] - 40.0 * i_end).abs() < 1e-15);
    }

    #[test]
    fn substeps_approach_exact_solution() {
        // exact: i(dt) = E/R (1 - exp(-R dt / L))
        let (e, r, l, dt): (f64, f64, f64, f64) = (1.0, 10.0, 1e-3, 1e-4);
        let exact = e / r * (1.0 - (-r * dt / l).exp());
        let coarse = advance(0.0, e, dt, 1, l, r);
        let fine = advance(0.0, e, dt, 64, l, r);
        assert!((fine - exact).abs() < (coarse - exact).abs());
        assert!((fine - exact).abs() < 1e-2 * exact);
    }

    #[test]
    fn remainder_consumes_whole_step() {
        // three equal sub-steps leave no leftover beyond rounding
        let a = advance(0.0, 1.0, 0.3, 3, 1e-2, 2.0);
        let mut b = 0.0;
        for _ in 0..3 {
            b = implicit_step(b, 1.0, 0.1, 1e-2, 2.0);
        }
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn zero_inductance_uses_floor() {
        let i = implicit_step(0.0, 5.0, 1e-3, 0.0, 50.0);
        assert!(i.is_finite());
        assert!((i - 0.1).abs() < 1e-9);
    }
}
