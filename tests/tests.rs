use emfsim::simulation::circuit::{self, CircuitMode};
use emfsim::simulation::coil::Coil;
use emfsim::simulation::engine::{Engine, PeakKind, RunOutput};
use emfsim::simulation::field::CylinderField;
use emfsim::simulation::params::{Environment, Magnet, Parameters};
use emfsim::simulation::scenario::Scenario;
use emfsim::simulation::states::{CoilSeries, Series};
use emfsim::{CouplingConfig, ScenarioConfig, SimError};

/// Single default coil at z = 0.5 named `c`
pub fn one_coil() -> Vec<Coil> {
    vec![Coil {
        name: "c".to_string(),
        ..Coil::default()
    }]
}

/// Default drop with the given circuit mode and coupling
pub fn drop_scenario(circuit: CircuitMode, coupling: CouplingConfig, parameters: Parameters) -> Scenario {
    let engine = Engine {
        circuit,
        coupling,
        ..Engine::default()
    };
    Scenario::new(engine, parameters, Magnet::default(), Environment::default(), one_coil()).unwrap()
}

pub fn run_open() -> RunOutput {
    drop_scenario(CircuitMode::Open, CouplingConfig::Decoupled, Parameters::default()).run().unwrap()
}

pub fn run_series() -> RunOutput {
    drop_scenario(CircuitMode::Series { r_load: 50.0 }, CouplingConfig::Decoupled, Parameters::default())
        .run()
        .unwrap()
}

fn argmax_abs(s: &Series) -> usize {
    s.iamax()
}

// ==================================================================================
// Shape tests
// ==================================================================================

#[test]
fn all_series_share_the_time_base() {
    for p in [
        Parameters::default(),
        Parameters { t_end: 0.37, dt: 1e-3, ..Parameters::default() },
        Parameters { t_end: 0.1, dt: 3e-3, substeps: 3, ..Parameters::default() },
    ] {
        let out = drop_scenario(CircuitMode::Series { r_load: 10.0 }, CouplingConfig::Decoupled, p).run().unwrap();
        let n = (p.t_end / p.dt).ceil() as usize + 1;
        let traj = &out.trajectory;
        assert_eq!(traj.t.len(), n);
        assert_eq!(traj.z.len(), n);
        assert_eq!(traj.v.len(), n);
        for c in &out.coils {
            for s in [&c.series.emf, &c.series.flux, &c.series.z_rel, &c.circuit.current, &c.circuit.v_meas] {
                assert_eq!(s.len(), n);
            }
        }
        assert_eq!(out.drag.total.len(), n);
        assert_eq!(out.drag.per_coil[0].len(), n);
    }
}

#[test]
fn no_coils_is_a_valid_run() {
    let s = Scenario::build_scenario(ScenarioConfig::from_yaml("coils: []").unwrap()).unwrap();
    let out = s.run().unwrap();
    assert!(out.coils.is_empty());
    assert!(out.peaks.is_empty());
    assert!(out.drag.total.iter().all(|&f| f == 0.0));
}

// ==================================================================================
// Field tests
// ==================================================================================

#[test]
fn field_symmetry_about_magnet_centre() {
    let f = CylinderField::from(&Magnet::default());
    let z = Series::from_vec(vec![-0.05, -0.01, -0.002, 0.0, 0.002, 0.01, 0.05]);
    let (b, db) = f.on_axis(&z);
    for k in 0..3 {
        let j = 6 - k;
        assert!((b[k] - b[j]).abs() < 1e-15);
        assert!((db[k] + db[j]).abs() < 1e-12);
    }
    assert_eq!(b.imax(), 3);
}

// ==================================================================================
// Trajectory tests
// ==================================================================================

#[test]
fn magnet_stops_at_h0_and_stays() {
    let out = run_open();
    let traj = &out.trajectory;
    let k = traj.z.iter().position(|&z| z >= 0.9).expect("magnet should reach h0");
    assert!(traj.t[k] < 1.5);
    let z_stop = traj.z[k];
    for i in k..traj.len() {
        assert_eq!(traj.z[i], z_stop);
        assert_eq!(traj.v[i], 0.0);
    }
    assert_eq!(out.summary.impact_time, Some(traj.t[k]));
}

#[test]
fn unreachable_stop_height_is_not_an_error() {
    let p = Parameters { h0: 50.0, t_end: 0.5, ..Parameters::default() };
    let out = drop_scenario(CircuitMode::Open, CouplingConfig::Decoupled, p).run().unwrap();
    assert_eq!(out.summary.impact_time, None);
    assert!(out.trajectory.v[out.trajectory.len() - 1] > 0.0);
}

// ==================================================================================
// Open circuit tests
// ==================================================================================

#[test]
fn open_circuit_has_no_current_and_measures_emf() {
    let out = run_open();
    let c = out.coil("c").unwrap();
    assert!(c.circuit.current.iter().all(|&i| i == 0.0));
    assert_eq!(c.circuit.v_meas, c.series.emf);
    assert!(out.drag.total.iter().all(|&f| f == 0.0));
    assert_eq!(out.summary.load_energy, vec![0.0]);
}

#[test]
fn emf_peaks_as_magnet_passes_the_coil() {
    let out = run_open();
    let c = out.coil("c").unwrap();
    let k = argmax_abs(&c.series.emf);
    assert!(c.series.z_rel[k].abs() < 0.02, "z_rel at peak = {}", c.series.z_rel[k]);
    assert!(out.trajectory.t[k] < out.summary.impact_time.unwrap());

    // the two lobes either side of the coil collapse into one reported peak
    let emf_rows: Vec<_> = out.peaks.iter().filter(|r| r.kind == PeakKind::EmfAbs).collect();
    assert_eq!(emf_rows.len(), 1);
    assert_eq!(emf_rows[0].coil, "c");
    assert!((emf_rows[0].t - out.trajectory.t[k]).abs() < 0.01);
}

#[test]
fn emf_sign_follows_faraday() {
    // approaching the coil from above, flux rises, so emf is negative
    let out = run_open();
    let c = out.coil("c").unwrap();
    let k = (0..c.series.z_rel.len())
        .find(|&k| c.series.z_rel[k] > -0.01)
        .unwrap();
    assert!(c.series.flux[k] > c.series.flux[k - 1]);
    assert!(c.series.emf[k] < 0.0);
}

// ==================================================================================
// Series circuit tests
// ==================================================================================

#[test]
fn series_drag_is_local_to_the_coil() {
    let out = run_series();
    let c = out.coil("c").unwrap();
    let f_max = out.drag.total.amax();
    assert!(f_max > 0.0);
    for k in 0..out.trajectory.len() {
        if c.series.z_rel[k].abs() > 0.1 {
            assert!(out.drag.total[k].abs() < 1e-6 * f_max, "drag at z_rel = {}", c.series.z_rel[k]);
        }
    }
    assert_eq!(out.coil_drag("c").unwrap(), &out.drag.total);
}

#[test]
fn series_drag_extracts_energy() {
    let out = run_series();
    let p = Parameters::default();
    let v = &out.trajectory.v;
    let work: f64 = out.drag.total.iter().zip(v.iter()).map(|(f, v)| f * v * p.dt).sum();
    assert!(work > 0.0, "net drag work = {work}");

    let c = out.coil("c").unwrap();
    let k = argmax_abs(&c.series.emf);
    assert!(out.drag.total[k] * v[k] > 0.0);
    assert!(out.summary.load_energy[0] > 0.0);
}

#[test]
fn series_voltage_is_load_times_current() {
    let out = run_series();
    let c = out.coil("c").unwrap();
    assert_eq!(c.circuit.current[0], 0.0);
    for k in 0..c.circuit.current.len() {
        assert_eq!(c.circuit.v_meas[k], 50.0 * c.circuit.current[k]);
    }
    assert!(c.circuit.v_meas.amax() < c.series.emf.amax());
}

#[test]
fn implicit_solver_stays_bounded_for_huge_steps() {
    let n = 500;
    let emf = Series::from_fn(n, |k, _| if k % 7 < 3 { 1e3 } else { -2e3 });
    let e_max = emf.amax();
    for (resistance, inductance, dt) in [(5.0, 1e-12, 1.0), (0.1, 1e-9, 10.0), (1e3, 1e-3, 1e-6), (1.0, 0.0, 1e3)] {
        let coil = CoilSeries {
            emf: emf.clone(),
            flux: Series::zeros(n),
            z_rel: Series::zeros(n),
            resistance,
            inductance,
        };
        let r_load = 1.0;
        let out = circuit::solve(&coil, CircuitMode::Series { r_load }, dt, 2).unwrap();
        let bound = e_max / (resistance + r_load) * (1.0 + 1e-9);
        assert!(out.current.iter().all(|i| i.is_finite() && i.abs() <= bound));
    }
}

// ==================================================================================
// Coupling tests
// ==================================================================================

#[test]
fn coupling_has_no_effect_in_open_mode() {
    let p = Parameters::default();
    let a = drop_scenario(CircuitMode::Open, CouplingConfig::Decoupled, p).run().unwrap();
    let b = drop_scenario(CircuitMode::Open, CouplingConfig::Coupled, p).run().unwrap();
    assert_eq!(a.trajectory.z, b.trajectory.z);
    assert_eq!(a.trajectory.v, b.trajectory.v);
}

#[test]
fn coupled_drag_slows_the_magnet() {
    let p = Parameters { h0: 10.0, t_end: 0.45, ..Parameters::default() };
    let load = CircuitMode::Series { r_load: 50.0 };
    let free = drop_scenario(load, CouplingConfig::Decoupled, p).run().unwrap();
    let braked = drop_scenario(load, CouplingConfig::Coupled, p).run().unwrap();
    let end = p.step_count() - 1;
    assert!(braked.trajectory.v[end] < free.trajectory.v[end]);
    assert!(braked.trajectory.z[end] < free.trajectory.z[end]);
    // far from the coil the two runs agree
    assert!((braked.trajectory.z[100] - free.trajectory.z[100]).abs() < 1e-9);
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn scenario_from_yaml_runs() {
    let yaml = r#"
run: { t_max: 0.6, dt: 1.0e-3 }
coils:
  - { z: 0.3 }
  - { z: 0.6, name: lower }
circuit: { mode: series, r_load: 20 }
"#;
    let s = Scenario::build_scenario(ScenarioConfig::from_yaml(yaml).unwrap()).unwrap();
    let out = s.run().unwrap();
    let names: Vec<&str> = out.coils.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["coil_1", "lower"]);
    let upper = out.coil("coil_1").unwrap();
    let lower = out.coil("lower").unwrap();
    assert!(out.trajectory.t[argmax_abs(&upper.series.emf)] < out.trajectory.t[argmax_abs(&lower.series.emf)]);
    for k in 0..out.trajectory.len() {
        let sum = out.drag.per_coil[0][k] + out.drag.per_coil[1][k];
        assert!((out.drag.total[k] - sum).abs() <= 1e-12 * sum.abs().max(1.0));
    }
}

#[test]
fn invalid_configuration_is_rejected_before_running() {
    let bad = Coil { radius: -0.01, ..Coil::default() };
    let err = Scenario::new(Engine::default(), Parameters::default(), Magnet::default(), Environment::default(), vec![bad]);
    assert!(matches!(err, Err(SimError::InvalidConfig(_))));

    let twins = vec![
        Coil { name: "a".to_string(), ..Coil::default() },
        Coil { name: "a".to_string(), z: 0.7, ..Coil::default() },
    ];
    let err = Scenario::new(Engine::default(), Parameters::default(), Magnet::default(), Environment::default(), twins);
    assert!(matches!(err, Err(SimError::DuplicateCoil(name)) if name == "a"));

    let p = Parameters { substeps: 0, ..Parameters::default() };
    let err = Scenario::new(Engine::default(), p, Magnet::default(), Environment::default(), one_coil());
    assert!(matches!(err, Err(SimError::InvalidConfig(_))));
}

#[test]
fn pathological_field_fails_loudly() {
    let magnet = Magnet { br: 1e308, ..Magnet::default() };
    let s = Scenario::new(Engine::default(), Parameters::default(), magnet, Environment::default(), one_coil()).unwrap();
    assert!(matches!(s.run(), Err(SimError::NonFinite { .. })));
}

// ==================================================================================
// Export tests
// ==================================================================================

#[test]
fn csv_tables_have_expected_columns() {
    let out = run_series();
    let dir = tempfile::tempdir().unwrap();
    let (ts, peaks) = emfsim::write_results(dir.path(), &out).unwrap();

    let text = std::fs::read_to_string(ts).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "t,z,v,emf_c,flux_c,zrel_c,imeas_c,vmeas_c,Fmag_c,Fmag_total"
    );
    assert_eq!(lines.count(), out.trajectory.len());

    let text = std::fs::read_to_string(peaks).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), "coil,kind,t,val");
    let first = lines.next().unwrap();
    assert!(first.starts_with("c,emf_abs_peak,"));
}
