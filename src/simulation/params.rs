//! Physical and numerical parameters for a drop-tube run
//!
//! - `Magnet`: the falling cylinder (mass, radius, length, remanence)
//! - `Environment`: gravity and the drag model of the tube
//! - `Parameters`: stop height, initial state, duration, step sizes
//!
//! All three are built once per run by `Scenario` and never mutated.

use std::f64::consts::PI;

/// Uniformly magnetized finite cylinder falling along the tube axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnet {
    pub mass: f64, // kg
    pub radius: f64, // m
    pub length: f64, // m, axial
    pub br: f64, // remanence, T
}

impl Default for Magnet {
    fn default() -> Self {
        Self {
            mass: 0.025,
            radius: 0.006,
            length: 0.010,
            br: 1.2,
        }
    }
}

/// Mechanical environment of the tube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub g: f64, // gravitational acceleration, m/s^2 (positive = direction of travel)
    pub rho: f64, // fluid density, kg/m^3
    pub cd: f64, // quadratic drag coefficient
    pub k_lin: f64, // linear drag coefficient, N s/m
    pub tube_radius: f64, // m
}

impl Environment {
    /// Tube cross-section used by the quadratic drag term
    pub fn tube_area(&self) -> f64 {
        PI * self.tube_radius * self.tube_radius
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            g: 9.80665,
            rho: 1.2,
            cd: 0.6,
            k_lin: 0.0,
            tube_radius: 0.012,
        }
    }
}

/// Largest time base a run may allocate
pub const MAX_STEPS: usize = 50_000_000;

/// Run-level numerical parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub h0: f64, // stop height, m
    pub z0: f64, // initial position, m
    pub v0: f64, // initial velocity, m/s
    pub t_end: f64, // duration, s
    pub dt: f64, // step size, s
    pub substeps: usize, // circuit sub-intervals per step
}

impl Parameters {
    /// Number of samples on the shared time base: ceil(t_end/dt) + 1
    pub fn step_count(&self) -> usize {
        ((self.t_end / self.dt).ceil() as usize).saturating_add(1)
    }

    /// `step_count` when it is finite and within [`MAX_STEPS`]
    pub fn checked_step_count(&self) -> Option<usize> {
        let intervals = (self.t_end / self.dt).ceil();
        if intervals.is_finite() && intervals >= 0.0 && intervals < MAX_STEPS as f64 {
            Some(intervals as usize + 1)
        } else {
            None
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            h0: 0.9,
            z0: 0.0,
            v0: 0.0,
            t_end: 1.5,
            dt: 5e-4,
            substeps: 1,
        }
    }
}
