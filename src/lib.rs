pub mod simulation;
pub mod configuration;
pub mod export;
pub mod benchmark;

pub use simulation::error::{Result, SimError};
pub use simulation::states::{Series, Trajectory, CoilSeries, CircuitSeries, DragSeries};
pub use simulation::params::{Magnet, Environment, Parameters};
pub use simulation::field::CylinderField;
pub use simulation::forces::{Force, ForceSet, MagnetState, QuadraticDrag, LinearDrag};
pub use simulation::integrator::{integrate, integrate_with};
pub use simulation::coil::Coil;
pub use simulation::circuit::CircuitMode;
pub use simulation::peaks::{find_peaks, Peak};
pub use simulation::scenario::Scenario;
pub use simulation::engine::{Engine, RunOutput, CoilRun, PeakRow, PeakKind, RunSummary};

pub use configuration::config::{RunConfig, MagnetConfig, EnvironmentConfig, CoilConfig, CircuitConfig, CircuitModeConfig, CouplingConfig, ReportConfig, ScenarioConfig};

pub use export::{folders::make_save_dir, tables::write_results};

pub use benchmark::benchmark::{bench_pipeline, bench_circuit_substeps};
