//! CSV tables for a finished run
//!
//! - `<prefix>_timeseries.csv`: t, z, v, then emf/flux/zrel per coil,
//!   imeas/vmeas per coil, Fmag per coil and Fmag_total
//! - `<prefix>_peaks.csv`: coil, kind, t, val

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::simulation::engine::RunOutput;
use crate::simulation::states::Series;

/// File stem used inside a result folder
pub const RUN_PREFIX: &str = "lab_run";

/// Write both tables into `dir`, returning their paths
pub fn write_results(dir: &Path, out: &RunOutput) -> Result<(PathBuf, PathBuf)> {
    let ts_path = dir.join(format!("{RUN_PREFIX}_timeseries.csv"));
    let peaks_path = dir.join(format!("{RUN_PREFIX}_peaks.csv"));

    let file = File::create(&ts_path).with_context(|| format!("creating {}", ts_path.display()))?;
    write_timeseries(file, out)?;
    let file = File::create(&peaks_path).with_context(|| format!("creating {}", peaks_path.display()))?;
    write_peaks(file, out)?;

    info!(dir = %dir.display(), "results written");
    Ok((ts_path, peaks_path))
}

/// Column name and series, in table order
fn columns(out: &RunOutput) -> Vec<(String, &Series)> {
    let traj = &out.trajectory;
    let mut cols: Vec<(String, &Series)> = vec![
        ("t".to_string(), &traj.t),
        ("z".to_string(), &traj.z),
        ("v".to_string(), &traj.v),
    ];
    for c in &out.coils {
        cols.push((format!("emf_{}", c.name), &c.series.emf));
        cols.push((format!("flux_{}", c.name), &c.series.flux));
        cols.push((format!("zrel_{}", c.name), &c.series.z_rel));
    }
    for c in &out.coils {
        cols.push((format!("imeas_{}", c.name), &c.circuit.current));
        cols.push((format!("vmeas_{}", c.name), &c.circuit.v_meas));
    }
    for (c, force) in out.coils.iter().zip(&out.drag.per_coil) {
        cols.push((format!("Fmag_{}", c.name), force));
    }
    cols.push(("Fmag_total".to_string(), &out.drag.total));
    cols
}

pub fn write_timeseries<W: Write>(writer: W, out: &RunOutput) -> Result<()> {
    let cols = columns(out);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(cols.iter().map(|(name, _)| name.as_str()))?;
    for k in 0..out.trajectory.len() {
        wtr.write_record(cols.iter().map(|(_, s)| s[k].to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_peaks<W: Write>(writer: W, out: &RunOutput) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["coil", "kind", "t", "val"])?;
    for row in &out.peaks {
        wtr.write_record([row.coil.clone(), row.kind.as_str().to_string(), row.t.to_string(), row.value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
