use std::time::Instant;

use crate::simulation::circuit::{self, CircuitMode};
use crate::simulation::coil::Coil;
use crate::simulation::engine::Engine;
use crate::simulation::params::{Environment, Magnet, Parameters};
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{CoilSeries, Series};

/// Helper to build `n` coils spread along the tube
fn make_coils(n: usize) -> Vec<Coil> {
    (0..n)
        .map(|i| Coil {
            name: format!("coil_{}", i + 1),
            z: 0.1 + 0.7 * (i as f64 + 0.5) / n as f64,
            ..Coil::default()
        })
        .collect()
}

/// Time the full pipeline for a growing number of coils
/// Paste output directly into a spreadsheet to graph
pub fn bench_pipeline() -> crate::Result<()> {
    println!("coils,open_ms,series_ms");

    for n in [1, 2, 4, 8, 16, 32] {
        let open = Scenario::new(Engine::default(), Parameters::default(), Magnet::default(), Environment::default(), make_coils(n))?;
        let series = Scenario::new(
            Engine {
                circuit: CircuitMode::Series { r_load: 50.0 },
                ..Engine::default()
            },
            Parameters::default(),
            Magnet::default(),
            Environment::default(),
            make_coils(n),
        )?;

        // Warm up
        open.run()?;

        let t0 = Instant::now();
        open.run()?;
        let ms_open = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        series.run()?;
        let ms_series = t1.elapsed().as_secs_f64() * 1000.0;

        println!("{},{:.6},{:.6}", n, ms_open, ms_series);
    }
    Ok(())
}

/// Time the series circuit solver alone for increasing substep counts
pub fn bench_circuit_substeps() -> crate::Result<()> {
    println!("substeps,ms");

    let n = 20_000;
    // synthetic bipolar pulse
    let emf = Series::from_fn(n, |k, _| {
        let x = (k as f64 - n as f64 / 2.0) / 200.0;
        -x * (-x * x).exp()
    });
    let coil = CoilSeries {
        emf,
        flux: Series::zeros(n),
        z_rel: Series::zeros(n),
        resistance: 5.0,
        inductance: 4e-5,
    };

    for substeps in [1, 2, 4, 8, 16, 64, 256] {
        let t0 = Instant::now();
        circuit::solve(&coil, CircuitMode::Series { r_load: 50.0 }, 5e-4, substeps)?;
        let ms = t0.elapsed().as_secs_f64() * 1000.0;
        println!("{},{:.6}", substeps, ms);
    }
    Ok(())
}
