//! Configuration types for loading drop-tube scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! run. A scenario consists of:
//!
//! - [`RunConfig`]         – stop height, initial state, duration and step sizes
//! - [`MagnetConfig`]      – the falling magnet
//! - [`EnvironmentConfig`] – gravity and drag in the tube
//! - [`CoilConfig`]        – one entry per sensing coil
//! - [`CircuitConfig`]     – open circuit or series load
//! - [`CouplingConfig`]    – whether the magnetic drag feeds back into the motion
//! - [`ReportConfig`]      – quadrature and peak summary settings
//! - [`ScenarioConfig`]    – top-level wrapper
//!
//! Every field is optional and falls back to the documented default.
//!
//! # YAML format
//!
//! ```yaml
//! run:
//!   h0: 0.9          # stop height [m]
//!   z0: 0.0          # initial position [m]
//!   v0: 0.0          # initial velocity [m/s]
//!   t_max: 1.5       # duration [s]
//!   dt: 5.0e-4       # step [s]
//!   substeps: 1      # circuit sub-intervals per step
//!
//! magnet: { mass: 0.025, radius: 0.006, length: 0.010, br: 1.2 }
//!
//! environment: { g: 9.80665, rho: 1.2, cd: 0.6, k_lin: 0.0, tube_radius: 0.012 }
//!
//! coils:
//!   - { n: 800, radius: 0.012, length: 0.012, z: 0.5, name: top }
//!   - { n: 400, radius: 0.012, length: 0.012, z: 0.7, r_override: 3.0 }
//!
//! circuit:
//!   mode: series     # or "open"
//!   r_load: 50.0
//!
//! coupling: decoupled  # or "coupled"
//!
//! report: { peak_min_separation: 40, peaks_per_coil: 2, quadrature_samples: 51 }
//! ```
//!
//! Leaving out `coils` gives a single default coil named `default`;
//! `coils: []` means no coils. Validation happens in `Scenario::build_scenario`.

use serde::Deserialize;

/// Run-level numerical parameters
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub h0: f64, // stop height
    pub z0: f64, // initial position
    pub v0: f64, // initial velocity
    pub t_max: f64, // simulated duration
    pub dt: f64, // fixed step
    pub substeps: usize, // circuit sub-intervals per step (>= 1)
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            h0: 0.9,
            z0: 0.0,
            v0: 0.0,
            t_max: 1.5,
            dt: 5e-4,
            substeps: 1,
        }
    }
}

/// The falling magnet
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MagnetConfig {
    pub mass: f64, // kg
    pub radius: f64, // m
    pub length: f64, // m
    pub br: f64, // remanence, T
}

impl Default for MagnetConfig {
    fn default() -> Self {
        Self {
            mass: 0.025,
            radius: 0.006,
            length: 0.010,
            br: 1.2,
        }
    }
}

/// Gravity and drag in the tube
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub g: f64,
    pub rho: f64, // fluid density
    pub cd: f64, // quadratic drag coefficient
    pub k_lin: f64, // linear drag coefficient
    pub tube_radius: f64,
}

impl Default for EnvironmentConfig {
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

/// One sensing coil
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CoilConfig {
    pub n: u32, // turns
    pub radius: f64,
    pub length: f64,
    pub z: f64, // axial position
    pub name: String, // blank -> coil_<k>
    #[serde(alias = "wire")]
    pub wire_d: f64, // wire diameter
    pub r_override: Option<f64>, // fixed resistance instead of the wire model
    pub l_override: Option<f64>, // fixed inductance instead of the solenoid model
}

impl Default for CoilConfig {
    fn default() -> Self {
        Self {
            n: 800,
            radius: 0.012,
            length: 0.012,
            z: 0.5,
            name: String::new(),
            wire_d: 0.0005,
            r_override: None,
            l_override: None,
        }
    }
}

impl CoilConfig {
    /// Parse a command-line coil such as `N=800,R=0.012,L=0.012,z=0.5,name=top`
    ///
    /// Keys: `N`, `R`, `L`, `z`, `name`, `wire_d` (or `wire`), `R_override`,
    /// `L_override`. Missing keys keep their defaults; parts without `=` are ignored.
    pub fn from_cli(text: &str) -> Result<Self, String> {
        let mut coil = Self::default();
        for part in text.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            let num = || value.parse::<f64>().map_err(|e| format!("coil {key}={value}: {e}"));
            match key {
                "N" => coil.n = value.parse().map_err(|e| format!("coil N={value}: {e}"))?,
                "R" => coil.radius = num()?,
                "L" => coil.length = num()?,
                "z" => coil.z = num()?,
                "wire_d" | "wire" => coil.wire_d = num()?,
                "R_override" => coil.r_override = Some(num()?),
                "L_override" => coil.l_override = Some(num()?),
                "name" => coil.name = value.to_string(),
                _ => return Err(format!("unknown coil key `{key}`")),
            }
        }
        Ok(coil)
    }
}

/// How the coils are loaded
/// `mode: "open"` or `mode: "series"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CircuitModeConfig {
    #[default]
    Open, // ideal voltmeter, no current

    Series, // coil R + L in series with r_load
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitConfig {
    pub mode: CircuitModeConfig,
    pub r_load: f64, // ohm, used in series mode
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            mode: CircuitModeConfig::Open,
            r_load: 1e12,
        }
    }
}

/// Whether the magnetic drag acts back on the magnet
/// `coupling: "decoupled"` or `coupling: "coupled"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CouplingConfig {
    #[default]
    Decoupled, // drag is a diagnostic only, trajectory sees gravity and air drag

    Coupled, // drag is subtracted in the equation of motion every step
}

/// Quadrature and peak summary settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub peak_min_separation: usize, // samples between reported peaks
    pub peaks_per_coil: usize, // peaks kept per coil and signal
    pub quadrature_samples: usize, // odd, >= 51
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            peak_min_separation: 40,
            peaks_per_coil: 2,
            quadrature_samples: 51,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub run: RunConfig,
    pub magnet: MagnetConfig,
    pub environment: EnvironmentConfig,
    pub coils: Option<Vec<CoilConfig>>, // None -> one default coil
    pub circuit: CircuitConfig,
    pub coupling: CouplingConfig,
    pub report: ReportConfig,
}

impl ScenarioConfig {
    /// Parse a scenario from YAML text
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Coils to simulate, filling in the single default coil when none are listed
    pub fn coil_list(&self) -> Vec<CoilConfig> {
        match &self.coils {
            Some(coils) => coils.clone(),
            None => vec![CoilConfig {
                name: "default".to_string(),
                ..CoilConfig::default()
            }],
        }
    }
}
