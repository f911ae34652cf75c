//! Run pipeline and engine settings
//!
//! One sequential stage (the trajectory), then the per-coil electromagnetic
//! and circuit stage in parallel, then the reductions (aggregate drag and
//! peak summaries). The per-coil stage only starts once the trajectory is
//! complete.

use rayon::prelude::*;
use tracing::info;

use crate::configuration::config::CouplingConfig;
use crate::simulation::circuit::{self, CircuitMode};
use crate::simulation::coil::Coil;
use crate::simulation::drag::{self, power_balance_force};
use crate::simulation::error::Result;
use crate::simulation::field::{CylinderField, QUADRATURE_SAMPLES};
use crate::simulation::integrator::{integrate, integrate_with};
use crate::simulation::peaks::find_peaks;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{check_finite, check_len, CircuitSeries, CoilSeries, DragSeries, Series, Trajectory};

/// Run-wide settings that are not physical parameters
#[derive(Debug, Clone)]
pub struct Engine {
    pub circuit: CircuitMode, // open or series load
    pub coupling: CouplingConfig, // whether drag feeds back into the motion
    pub quadrature_samples: usize, // points across each coil
    pub peak_min_separation: usize, // samples between reported peaks
    pub peaks_per_coil: usize, // peaks kept per coil and signal
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            circuit: CircuitMode::Open,
            coupling: CouplingConfig::Decoupled,
            quadrature_samples: QUADRATURE_SAMPLES,
            peak_min_separation: 40,
            peaks_per_coil: 2,
        }
    }
}

/// Everything computed for one coil
#[derive(Debug, Clone)]
pub struct CoilRun {
    pub name: String,
    pub series: CoilSeries,
    pub circuit: CircuitSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakKind {
    EmfAbs,
    VMeasAbs,
}

impl PeakKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeakKind::EmfAbs => "emf_abs_peak",
            PeakKind::VMeasAbs => "v_meas_abs_peak",
        }
    }
}

/// One summary row: a peak of |emf| or |v_meas| on one coil
#[derive(Debug, Clone, PartialEq)]
pub struct PeakRow {
    pub coil: String,
    pub kind: PeakKind,
    pub t: f64,
    pub value: f64,
}

/// Scalar figures for a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub impact_time: Option<f64>, // first sample at the stop height
    pub peak_total_drag: f64, // max |aggregate drag|
    pub load_energy: Vec<f64>, // per coil, sum of i^2 R_load dt
}

/// Output bundle handed to export collaborators
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trajectory: Trajectory,
    pub coils: Vec<CoilRun>, // in configuration order
    pub drag: DragSeries,
    pub peaks: Vec<PeakRow>,
    pub summary: RunSummary,
}

impl RunOutput {
    /// Look a coil up by name
    pub fn coil(&self, name: &str) -> Option<&CoilRun> {
        self.coils.iter().find(|c| c.name == name)
    }

    /// Drag series of the named coil
    pub fn coil_drag(&self, name: &str) -> Option<&Series> {
        let idx = self.coils.iter().position(|c| c.name == name)?;
        self.drag.per_coil.get(idx)
    }
}

pub fn run(scenario: &Scenario) -> Result<RunOutput> {
    let p = &scenario.parameters;
    let engine = &scenario.engine;
    let field = CylinderField::from(&scenario.magnet);
    info!(coils = scenario.coils.len(), mode = ?engine.circuit, coupling = ?engine.coupling, "starting run");

    let trajectory = match engine.coupling {
        CouplingConfig::Decoupled => integrate(p, &scenario.magnet, &scenario.environment, &scenario.forces),
        CouplingConfig::Coupled => integrate_coupled(scenario, &field),
    };
    check_finite("z", &trajectory.z)?;
    check_finite("v", &trajectory.v)?;
    let n = trajectory.len();

    // Coils are independent once the trajectory is known
    let coils = scenario
        .coils
        .par_iter()
        .map(|coil| -> Result<CoilRun> {
            let series = coil.series(&trajectory, &field, engine.quadrature_samples)?;
            let circuit = circuit::solve(&series, engine.circuit, p.dt, p.substeps)?;
            Ok(CoilRun {
                name: coil.name.clone(),
                series,
                circuit,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for c in &coils {
        check_len(&format!("emf_{}", c.name), &c.series.emf, n)?;
        check_len(&format!("flux_{}", c.name), &c.series.flux, n)?;
        check_len(&format!("zrel_{}", c.name), &c.series.z_rel, n)?;
        check_len(&format!("imeas_{}", c.name), &c.circuit.current, n)?;
        check_len(&format!("vmeas_{}", c.name), &c.circuit.v_meas, n)?;
    }

    let pairs: Vec<(&CoilSeries, &CircuitSeries)> = coils.iter().map(|c| (&c.series, &c.circuit)).collect();
    let drag = drag::estimate(&pairs, &trajectory.v)?;

    let peaks = peak_rows(&trajectory, &coils, engine);
    let summary = RunSummary {
        impact_time: trajectory.impact_time(p.h0),
        peak_total_drag: drag.total.amax(),
        load_energy: coils
            .iter()
            .map(|c| match engine.circuit.r_load() {
                Some(r_load) => c.circuit.current.norm_squared() * r_load * p.dt,
                None => 0.0,
            })
            .collect(),
    };
    info!(impact_time = ?summary.impact_time, peak_total_drag = summary.peak_total_drag, "run finished");

    Ok(RunOutput {
        trajectory,
        coils,
        drag,
        peaks,
        summary,
    })
}

/// First `peaks_per_coil` peaks of |emf| for every coil, then of |v_meas|
pub fn peak_rows(trajectory: &Trajectory, coils: &[CoilRun], engine: &Engine) -> Vec<PeakRow> {
    let mut rows = Vec::new();
    for kind in [PeakKind::EmfAbs, PeakKind::VMeasAbs] {
        for c in coils {
            let signal = match kind {
                PeakKind::EmfAbs => &c.series.emf,
                PeakKind::VMeasAbs => &c.circuit.v_meas,
            };
            let peaks = find_peaks(&signal.abs(), &trajectory.t, engine.peak_min_separation);
            rows.extend(peaks.into_iter().take(engine.peaks_per_coil).map(|pk| PeakRow {
                coil: c.name.clone(),
                kind,
                t: pk.t,
                value: pk.value,
            }));
        }
    }
    rows
}

/// Trajectory with the magnetic drag applied every step. Each coil's current
/// advances in lock-step with the magnet using the circuit solver's update.
///
/// The velocity guard only knows the peak |v| seen so far, while the reported
/// drag uses the peak over the whole run. The applied force and `Fmag` can
/// therefore differ at samples whose |v| sits between the two thresholds
/// (within about 1e-12 relative of zero velocity).
fn integrate_coupled(scenario: &Scenario, field: &CylinderField) -> Trajectory {
    let p = &scenario.parameters;
    let r_load = match scenario.engine.circuit {
        // no current, no drag
        CircuitMode::Open => return integrate(p, &scenario.magnet, &scenario.environment, &scenario.forces),
        CircuitMode::Series { r_load } => r_load,
    };
    let samples = scenario.engine.quadrature_samples;

    struct LiveCoil<'a> {
        coil: &'a Coil,
        na: f64,
        r_total: f64,
        inductance: f64,
        current: f64,
    }
    let mut live: Vec<LiveCoil> = scenario
        .coils
        .iter()
        .map(|coil| LiveCoil {
            coil,
            na: coil.turns as f64 * coil.area(),
            r_total: coil.resistance() + r_load,
            inductance: coil.inductance(),
            current: 0.0,
        })
        .collect();
    let mut v_peak: f64 = 0.0;

    integrate_with(p, &scenario.magnet, &scenario.environment, &scenario.forces, |_, state| {
        v_peak = v_peak.max(state.v.abs());
        let eps = drag::epsilon_for_peak(v_peak);
        let mut force = 0.0;
        for lc in live.iter_mut() {
            let (_, db_dz) = field.coil_averaged_at(state.z - lc.coil.z, lc.coil.length, samples);
            let emf = -lc.na * (db_dz * state.v);
            force += power_balance_force(emf, lc.current, state.v, eps);
            lc.current = circuit::advance(lc.current, emf, p.dt, p.substeps, lc.inductance, lc.r_total);
        }
        force
    })
}
