pub mod error;
pub mod states;
pub mod params;
pub mod field;
pub mod forces;
pub mod integrator;
pub mod coil;
pub mod circuit;
pub mod drag;
pub mod peaks;
pub mod scenario;
pub mod engine;
