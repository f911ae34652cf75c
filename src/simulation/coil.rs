//! Sensing coils: geometry, derived R/L, and the EMF waveform
//!
//! For a coil of `N` turns and area `A = pi r^2` at axial position `z_c`:
//!
//! ```text
//! z_rel(t) = z(t) - z_c
//! emf(t)   = -N * A * dB/dz(z_rel) * v(t)
//! flux(t)  =  N * A * B(z_rel)
//! ```
//!
//! with `B` and `dB/dz` averaged over the coil's axial length.

use std::f64::consts::PI;

use tracing::debug;

use super::error::{require_non_negative, require_positive, Result, SimError};
use super::field::CylinderField;
use super::states::{check_finite, CoilSeries, Trajectory};

/// Copper resistivity, ohm m
pub const RHO_CU: f64 = 1.68e-8;

/// Floor on coil length used by the inductance formula
const MIN_INDUCTANCE_LENGTH: f64 = 1e-6;

/// Floor on wire cross-section used by the resistance formula
const MIN_WIRE_AREA: f64 = 1e-16;

#[derive(Debug, Clone, PartialEq)]
pub struct Coil {
    pub name: String,
    pub turns: u32,
    pub radius: f64, // m
    pub length: f64, // axial, m
    pub z: f64, // axial position of the coil centre, m
    pub wire_d: f64, // wire diameter, m
    pub resistance_override: Option<f64>, // ohm, replaces the wire model
    pub inductance_override: Option<f64>, // H, replaces the solenoid model
}

impl Coil {
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// Total wire length, one circumference per turn
    pub fn wire_length(&self) -> f64 {
        2.0 * PI * self.radius * self.turns as f64
    }

    pub fn resistance(&self) -> f64 {
        match self.resistance_override {
            Some(r) => r,
            None => {
                let wire_area = PI * (0.5 * self.wire_d).powi(2);
                RHO_CU * self.wire_length() / wire_area.max(MIN_WIRE_AREA)
            }
        }
    }

    /// Short-solenoid approximation `1e-7 r^2 N^2 / (9 r + 10 l)`
    pub fn inductance(&self) -> f64 {
        match self.inductance_override {
            Some(l) => l,
            None => {
                let r = self.radius;
                let l = self.length.max(MIN_INDUCTANCE_LENGTH);
                let n = self.turns as f64;
                1e-7 * (r * r * n * n) / (9.0 * r + 10.0 * l)
            }
        }
    }

    /// Check the geometry and overrides of one coil
    pub fn validate(&self) -> Result<()> {
        let ctx = |field: &str| format!("coil `{}` {field}", self.name);
        if self.turns == 0 {
            return Err(SimError::InvalidConfig(format!("{} must be at least 1", ctx("turns"))));
        }
        require_positive(&ctx("radius"), self.radius)?;
        require_positive(&ctx("length"), self.length)?;
        if !self.z.is_finite() {
            return Err(SimError::InvalidConfig(format!("{} must be finite", ctx("position"))));
        }
        match self.resistance_override {
            Some(r) => require_positive(&ctx("resistance override"), r)?,
            None => require_positive(&ctx("wire diameter"), self.wire_d)?,
        }
        if let Some(l) = self.inductance_override {
            require_non_negative(&ctx("inductance override"), l)?;
        }
        Ok(())
    }

    /// EMF, flux and relative offset along a trajectory
    pub fn series(&self, traj: &Trajectory, field: &CylinderField, samples: usize) -> Result<CoilSeries> {
        let z_rel = traj.z.add_scalar(-self.z);
        let (b, db_dz) = field.coil_averaged(&z_rel, self.length, samples);

        let na = self.turns as f64 * self.area();
        let emf = -na * db_dz.component_mul(&traj.v);
        let flux = na * b;

        check_finite(&format!("emf_{}", self.name), &emf)?;
        check_finite(&format!("flux_{}", self.name), &flux)?;

        let resistance = self.resistance();
        let inductance = self.inductance();
        debug!(coil = %self.name, resistance, inductance, "coil series computed");

        Ok(CoilSeries {
            emf,
            flux,
            z_rel,
            resistance,
            inductance,
        })
    }
}

impl Default for Coil {
    fn default() -> Self {
        Self {
            name: String::new(),
            turns: 800,
            radius: 0.012,
            length: 0.012,
            z: 0.5,
            wire_d: 0.0005,
            resistance_override: None,
            inductance_override: None,
        }
    }
}
