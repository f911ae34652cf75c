//! Retarding force terms acting on the falling magnet
//!
//! Each term implements [`Force`] and returns a force along the direction
//! of travel that opposes motion; the integrator subtracts their sum from
//! gravity: `a = g - sum(F) / m`.

use super::params::Environment;

/// Magnet state at the start of a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetState {
    pub t: f64,
    pub z: f64,
    pub v: f64,
}

/// Collection of retarding force terms (aerodynamic, viscous, etc)
/// Contributions are summed into one scalar force
pub struct ForceSet {
    terms: Vec<Box<dyn Force + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add a force term
    pub fn with(mut self, term: impl Force + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Quadratic and linear drag for the given tube
    pub fn from_environment(env: &Environment) -> Self {
        Self::new()
            .with(QuadraticDrag {
                rho: env.rho,
                cd: env.cd,
                area: env.tube_area(),
            })
            .with(LinearDrag { k_lin: env.k_lin })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of all terms at `state`
    pub fn total(&self, state: &MagnetState) -> f64 {
        self.terms.iter().map(|term| term.force(state)).sum()
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

/// A retarding force evaluated from the magnet state
pub trait Force {
    fn force(&self, state: &MagnetState) -> f64;
}

/// Aerodynamic drag 0.5 * rho * Cd * A * v|v|
pub struct QuadraticDrag {
    pub rho: f64, // fluid density
    pub cd: f64, // drag coefficient
    pub area: f64, // tube cross-section
}

impl Force for QuadraticDrag {
    fn force(&self, state: &MagnetState) -> f64 {
        0.5 * self.rho * self.cd * self.area * state.v * state.v.abs()
    }
}

/// Viscous drag k * v
pub struct LinearDrag {
    pub k_lin: f64,
}

impl Force for LinearDrag {
    fn force(&self, state: &MagnetState) -> f64 {
        self.k_lin * state.v
    }
}
