//! Time-series types produced by a run.
//!
//! Every series in a run shares one time base, so all of them have the
//! same length as `Trajectory::t`.

use nalgebra::DVector;

use super::error::{Result, SimError};

pub type Series = DVector<f64>;

/// Magnet motion, one sample per step
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub t: Series, // time
    pub z: Series, // position
    pub v: Series, // velocity
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Time of the first sample sitting at the stop height, if the magnet got there
    pub fn impact_time(&self, h0: f64) -> Option<f64> {
        self.z.iter().position(|&z| z >= h0).map(|i| self.t[i])
    }
}

/// Electromagnetic series of one coil
#[derive(Debug, Clone)]
pub struct CoilSeries {
    pub emf: Series, // V
    pub flux: Series, // Wb-turns
    pub z_rel: Series, // magnet position minus coil position, m
    pub resistance: f64, // ohm
    pub inductance: f64, // H
}

/// Circuit response of one coil
#[derive(Debug, Clone)]
pub struct CircuitSeries {
    pub current: Series, // A
    pub v_meas: Series, // V
}

/// Reporting-only magnetic drag
#[derive(Debug, Clone)]
pub struct DragSeries {
    pub per_coil: Vec<Series>, // same order as the coils
    pub total: Series,
}

/// Fail on a series that does not match the time base length
pub fn check_len(what: &str, series: &Series, expected: usize) -> Result<()> {
    if series.len() == expected {
        Ok(())
    } else {
        Err(SimError::LengthMismatch {
            what: what.to_string(),
            expected,
            found: series.len(),
        })
    }
}

/// Fail on the first NaN/inf sample
pub fn check_finite(what: &str, series: &Series) -> Result<()> {
    match series.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(index) => Err(SimError::NonFinite {
            what: what.to_string(),
            index,
        }),
    }
}
