//! Local maxima with a minimum index separation

use super::states::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub t: f64,
    pub value: f64,
}

/// Strict local maxima of `y`, in order. A candidate closer than
/// `min_separation` samples to the last accepted peak is skipped.
pub fn find_peaks(y: &Series, t: &Series, min_separation: usize) -> Vec<Peak> {
    let mut peaks = Vec::new();
    let mut last: Option<usize> = None;
    for i in 1..y.len().saturating_sub(1) {
        let is_max = y[i] > y[i - 1] && y[i] > y[i + 1];
        let far_enough = last.map_or(true, |l| i - l >= min_separation);
        if is_max && far_enough {
            peaks.push(Peak { t: t[i], value: y[i] });
            last = Some(i);
        }
    }
    peaks
}
