use emfsim::{ScenarioConfig, Scenario, CircuitModeConfig, CouplingConfig, CoilConfig};
use emfsim::{make_save_dir, write_results};
use emfsim::{bench_pipeline, bench_circuit_substeps};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};

use std::fs;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Open,
    Series,
}

#[derive(Parser, Debug)]
#[command(about = "Falling-magnet EMF simulator")]
struct Args {
    /// Scenario YAML; looked up in the bundled `scenarios/` folder when not found as given
    #[arg(short, long, default_value = "drop_tube.yaml")]
    file_name: String,

    /// Root folder for timestamped result folders
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Override the stop height [m]
    #[arg(long)]
    h0: Option<f64>,

    /// Override the initial position [m]
    #[arg(long)]
    z0: Option<f64>,

    /// Override the initial velocity [m/s]
    #[arg(long)]
    v0: Option<f64>,

    /// Override the simulated duration [s]
    #[arg(long)]
    t_max: Option<f64>,

    /// Override the time step [s]
    #[arg(long)]
    dt: Option<f64>,

    /// Override the circuit substeps per time step
    #[arg(long)]
    substeps: Option<usize>,

    /// Override the magnet mass [kg]
    #[arg(long)]
    mag_m: Option<f64>,

    /// Override the magnet radius [m]
    #[arg(long)]
    mag_r: Option<f64>,

    /// Override the magnet length [m]
    #[arg(long)]
    mag_l: Option<f64>,

    /// Override the magnet remanence [T]
    #[arg(long)]
    br: Option<f64>,

    /// Override the fluid density [kg/m^3]
    #[arg(long)]
    rho: Option<f64>,

    /// Override the quadratic drag coefficient
    #[arg(long)]
    cd: Option<f64>,

    /// Override the linear drag coefficient [N s/m]
    #[arg(long)]
    k_lin: Option<f64>,

    /// Override the tube radius [m]
    #[arg(long)]
    tube_r: Option<f64>,

    /// Replace the scenario's coils, repeatable: `--coil N=800,R=0.012,L=0.012,z=0.5,name=top`
    #[arg(long = "coil", value_parser = CoilConfig::from_cli)]
    coils: Vec<CoilConfig>,

    /// Override the circuit mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Override the load resistance [ohm]
    #[arg(long)]
    r_load: Option<f64>,

    /// Feed the magnetic drag back into the motion
    #[arg(long)]
    coupled: bool,

    /// Run without writing any files
    #[arg(long)]
    no_export: bool,

    /// Print pipeline timings instead of running the scenario
    #[arg(long)]
    bench: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialise logging: {e}");
    }
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };
    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("reading scenario {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_yaml(&text)
        .with_context(|| format!("parsing scenario {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn apply_overrides(cfg: &mut ScenarioConfig, args: &Args) {
    let run = &mut cfg.run;
    let fields = [
        (&mut run.h0, args.h0),
        (&mut run.z0, args.z0),
        (&mut run.v0, args.v0),
        (&mut run.t_max, args.t_max),
        (&mut run.dt, args.dt),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value;
        }
    }
    if let Some(substeps) = args.substeps {
        run.substeps = substeps;
    }

    let magnet = &mut cfg.magnet;
    let env = &mut cfg.environment;
    let fields = [
        (&mut magnet.mass, args.mag_m),
        (&mut magnet.radius, args.mag_r),
        (&mut magnet.length, args.mag_l),
        (&mut magnet.br, args.br),
        (&mut env.rho, args.rho),
        (&mut env.cd, args.cd),
        (&mut env.k_lin, args.k_lin),
        (&mut env.tube_radius, args.tube_r),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value;
        }
    }

    if !args.coils.is_empty() {
        cfg.coils = Some(args.coils.clone());
    }
    if let Some(mode) = args.mode {
        cfg.circuit.mode = match mode {
            ModeArg::Open => CircuitModeConfig::Open,
            ModeArg::Series => CircuitModeConfig::Series,
        };
    }
    if let Some(r_load) = args.r_load {
        cfg.circuit.r_load = r_load;
    }
    if args.coupled {
        cfg.coupling = CouplingConfig::Coupled;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.bench {
        bench_pipeline()?;
        bench_circuit_substeps()?;
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    apply_overrides(&mut scenario_cfg, &args);

    let scenario = Scenario::build_scenario(scenario_cfg)?;
    let output = scenario.run()?;

    match output.summary.impact_time {
        Some(t) => info!("magnet reached the stop height at t = {t:.4} s"),
        None => info!("magnet still in flight at the end of the run"),
    }
    for row in &output.peaks {
        info!("{:>12} {:<16} t = {:.5} s  |val| = {:.6}", row.coil, row.kind.as_str(), row.t, row.value);
    }

    if !args.no_export {
        let save_dir = make_save_dir(&args.results_dir)?;
        write_results(&save_dir, &output)?;
        println!("Saved all outputs under: {}", save_dir.display());
    }

    Ok(())
}
