//! Build a validated run bundle from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the magnet and its environment
//! - the named coil list
//! - the mechanical force set (`ForceSet`)
//!
//! All validation happens here; a `Scenario` that exists is safe to run.

use std::collections::HashSet;

use tracing::info;

use crate::configuration::config::{CircuitModeConfig, CoilConfig, ScenarioConfig};
use crate::simulation::circuit::CircuitMode;
use crate::simulation::coil::Coil;
use crate::simulation::engine::{self, Engine, RunOutput};
use crate::simulation::error::{require_non_negative, require_positive, Result, SimError};
use crate::simulation::field::QUADRATURE_SAMPLES;
use crate::simulation::forces::ForceSet;
use crate::simulation::params::{Environment, Magnet, Parameters, MAX_STEPS};

/// A fully validated drop-tube run
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub magnet: Magnet,
    pub environment: Environment,
    pub coils: Vec<Coil>,
    pub forces: ForceSet,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Coils: map `CoilConfig` -> runtime `Coil`, naming blanks by position
        let coils: Vec<Coil> = cfg
            .coil_list()
            .iter()
            .enumerate()
            .map(|(idx, cc): (usize, &CoilConfig)| Coil {
                name: coil_name(&cc.name, idx),
                turns: cc.n,
                radius: cc.radius,
                length: cc.length,
                z: cc.z,
                wire_d: cc.wire_d,
                resistance_override: cc.r_override,
                inductance_override: cc.l_override,
            })
            .collect();

        let r = &cfg.run;
        let parameters = Parameters {
            h0: r.h0,
            z0: r.z0,
            v0: r.v0,
            t_end: r.t_max,
            dt: r.dt,
            substeps: r.substeps,
        };

        let m = &cfg.magnet;
        let magnet = Magnet {
            mass: m.mass,
            radius: m.radius,
            length: m.length,
            br: m.br,
        };

        let e = &cfg.environment;
        let environment = Environment {
            g: e.g,
            rho: e.rho,
            cd: e.cd,
            k_lin: e.k_lin,
            tube_radius: e.tube_radius,
        };

        let circuit = match cfg.circuit.mode {
            CircuitModeConfig::Open => CircuitMode::Open,
            CircuitModeConfig::Series => CircuitMode::Series {
                r_load: cfg.circuit.r_load,
            },
        };

        let engine = Engine {
            circuit,
            coupling: cfg.coupling,
            quadrature_samples: cfg.report.quadrature_samples,
            peak_min_separation: cfg.report.peak_min_separation,
            peaks_per_coil: cfg.report.peaks_per_coil,
        };

        Self::new(engine, parameters, magnet, environment, coils)
    }

    /// Validate runtime parts and assemble the scenario
    pub fn new(engine: Engine, parameters: Parameters, magnet: Magnet, environment: Environment, coils: Vec<Coil>) -> Result<Self> {
        validate_parameters(&parameters)?;
        validate_magnet(&magnet)?;
        validate_environment(&environment)?;
        validate_engine(&engine)?;
        validate_coils(&coils)?;

        let forces = ForceSet::from_environment(&environment);
        info!(coils = coils.len(), steps = parameters.step_count(), "scenario built");

        Ok(Self {
            engine,
            parameters,
            magnet,
            environment,
            coils,
            forces,
        })
    }

    /// Run the full pipeline
    pub fn run(&self) -> Result<RunOutput> {
        engine::run(self)
    }
}

/// Blank names become `coil_<k>`, `k` being the 1-based list position
pub fn coil_name(name: &str, idx: usize) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("coil_{}", idx + 1)
    } else {
        name.to_string()
    }
}

fn validate_parameters(p: &Parameters) -> Result<()> {
    require_positive("time step", p.dt)?;
    require_positive("duration", p.t_end)?;
    for (what, value) in [("stop height", p.h0), ("initial position", p.z0), ("initial velocity", p.v0)] {
        if !value.is_finite() {
            return Err(SimError::InvalidConfig(format!("{what} must be finite, got {value}")));
        }
    }
    if p.substeps == 0 {
        return Err(SimError::InvalidConfig("substeps must be at least 1".to_string()));
    }
    if p.checked_step_count().is_none() {
        return Err(SimError::InvalidConfig(format!(
            "duration {} / time step {} exceeds {MAX_STEPS} samples",
            p.t_end, p.dt
        )));
    }
    Ok(())
}

fn validate_magnet(m: &Magnet) -> Result<()> {
    require_positive("magnet mass", m.mass)?;
    require_positive("magnet radius", m.radius)?;
    require_positive("magnet length", m.length)?;
    if !m.br.is_finite() {
        return Err(SimError::InvalidConfig(format!("remanence must be finite, got {}", m.br)));
    }
    Ok(())
}

fn validate_environment(e: &Environment) -> Result<()> {
    if !e.g.is_finite() {
        return Err(SimError::InvalidConfig(format!("gravity must be finite, got {}", e.g)));
    }
    require_non_negative("fluid density", e.rho)?;
    require_non_negative("drag coefficient", e.cd)?;
    require_non_negative("linear drag coefficient", e.k_lin)?;
    require_positive("tube radius", e.tube_radius)
}

fn validate_engine(engine: &Engine) -> Result<()> {
    if let CircuitMode::Series { r_load } = engine.circuit {
        require_non_negative("load resistance", r_load)?;
    }
    let samples = engine.quadrature_samples;
    if samples < QUADRATURE_SAMPLES || samples % 2 == 0 {
        return Err(SimError::InvalidConfig(format!(
            "quadrature samples must be odd and at least {QUADRATURE_SAMPLES}, got {samples}"
        )));
    }
    if engine.peak_min_separation == 0 {
        return Err(SimError::InvalidConfig("peak separation must be at least 1 sample".to_string()));
    }
    Ok(())
}

fn validate_coils(coils: &[Coil]) -> Result<()> {
    let mut seen = HashSet::new();
    for coil in coils {
        if coil.name.trim().is_empty() {
            return Err(SimError::InvalidConfig("coil name must not be blank".to_string()));
        }
        if !seen.insert(coil.name.as_str()) {
            return Err(SimError::DuplicateCoil(coil.name.clone()));
        }
        coil.validate()?;
    }
    Ok(())
}
