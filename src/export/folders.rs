//! Timestamped result folders

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Create `<base>/<YYYY-mm-dd_HH-MM-SS>`, appending `_1`, `_2`, ... when the
/// folder already exists
pub fn make_save_dir(base: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(base)?;
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let dir = unique_dir(base, &stamp);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn unique_dir(base: &Path, stamp: &str) -> PathBuf {
    let first = base.join(stamp);
    let mut dir = first.clone();
    let mut k = 1;
    while dir.exists() {
        dir = base.join(format!("{stamp}_{k}"));
        k += 1;
    }
    dir
}
