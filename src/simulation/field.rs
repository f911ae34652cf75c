//! Closed-form on-axis field of a uniformly magnetized finite cylinder
//!
//! With `u(x) = x / sqrt(x^2 + R^2)` and `g(x) = R^2 / (x^2 + R^2)^1.5`:
//!
//! ```text
//! B(z)     = Br/2 * (u(z + L/2) - u(z - L/2))
//! dB/dz(z) = Br/2 * (g(z + L/2) - g(z - L/2))
//! ```
//!
//! `B` is even in `z` (extremum at the magnet centre) and `dB/dz` is odd.
//! The coil-averaged variant samples both over the coil's axial extent.

use super::params::Magnet;
use super::states::Series;

/// Default number of quadrature points across a coil
pub const QUADRATURE_SAMPLES: usize = 51;

/// On-axis field model for one magnet
#[derive(Debug, Clone, Copy)]
pub struct CylinderField {
    pub radius: f64,
    pub length: f64,
    pub br: f64,
}

impl From<&Magnet> for CylinderField {
    fn from(m: &Magnet) -> Self {
        Self {
            radius: m.radius,
            length: m.length,
            br: m.br,
        }
    }
}

impl CylinderField {
    /// Flux density at axial offset `z` from the magnet centre
    pub fn bz(&self, z: f64) -> f64 {
        let r2 = self.radius * self.radius;
        let u = |x: f64| x / (x * x + r2).sqrt();
        let half = 0.5 * self.length;
        0.5 * self.br * (u(z + half) - u(z - half))
    }

    /// Axial gradient of `bz`
    pub fn dbz_dz(&self, z: f64) -> f64 {
        let r2 = self.radius * self.radius;
        let g = |x: f64| r2 / (x * x + r2).powf(1.5);
        let half = 0.5 * self.length;
        0.5 * self.br * (g(z + half) - g(z - half))
    }

    /// Vectorized point field and gradient
    pub fn on_axis(&self, z_rel: &Series) -> (Series, Series) {
        (z_rel.map(|z| self.bz(z)), z_rel.map(|z| self.dbz_dz(z)))
    }

    /// Field and gradient averaged over a coil of axial length `coil_len`
    /// centred at each offset. A non-positive length falls back to the point value.
    pub fn coil_averaged_at(&self, z: f64, coil_len: f64, samples: usize) -> (f64, f64) {
        if coil_len <= 0.0 || samples < 2 {
            return (self.bz(z), self.dbz_dz(z));
        }
        let (b_sum, db_sum) = quadrature_offsets(coil_len, samples)
            .map(|dz| (self.bz(z + dz), self.dbz_dz(z + dz)))
            .fold((0.0, 0.0), |(b, db), (bi, dbi)| (b + bi, db + dbi));
        let n = samples as f64;
        (b_sum / n, db_sum / n)
    }

    /// Vectorized `coil_averaged_at`
    pub fn coil_averaged(&self, z_rel: &Series, coil_len: f64, samples: usize) -> (Series, Series) {
        let mut b = Series::zeros(z_rel.len());
        let mut db = Series::zeros(z_rel.len());
        for (i, &z) in z_rel.iter().enumerate() {
            let (bi, dbi) = self.coil_averaged_at(z, coil_len, samples);
            b[i] = bi;
            db[i] = dbi;
        }
        (b, db)
    }
}

/// Evenly spaced offsets spanning [-len/2, len/2]. Built from signed integer
/// indices so that offset `k` and offset `-k` are exact negatives.
pub fn quadrature_offsets(coil_len: f64, samples: usize) -> impl Iterator<Item = f64> {
    let mid = (samples as f64 - 1.0) * 0.5;
    let span = (samples as f64 - 1.0).max(1.0);
    (0..samples).map(move |j| coil_len * ((j as f64 - mid) / span))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> CylinderField {
        CylinderField::from(&Magnet::default())
    }

    #[test]
    fn field_is_even_and_gradient_is_odd() {
        let f = field();
        for &z in &[0.001, 0.004, 0.02, 0.3] {
            assert!((f.bz(z) - f.bz(-z)).abs() < 1e-15);
            assert!((f.dbz_dz(z) + f.dbz_dz(-z)).abs() < 1e-12);
        }
        assert_eq!(f.dbz_dz(0.0), 0.0);
    }

    #[test]
    fn field_peaks_at_centre() {
        let f = field();
        let b0 = f.bz(0.0);
        assert!(b0 > 0.0);
        for &z in &[1e-4, 1e-3, 0.01, 0.1] {
            assert!(f.bz(z) < b0);
        }
    }

    #[test]
    fn quadrature_offsets_are_symmetric() {
        let offs: Vec<f64> = quadrature_offsets(0.012, 51).collect();
        assert_eq!(offs.len(), 51);
        assert_eq!(offs[25], 0.0);
        assert!((offs[0] + 0.006).abs() < 1e-15);
        for k in 0..25 {
            assert_eq!(offs[k], -offs[50 - k]);
        }
    }

    #[test]
    fn averaged_gradient_vanishes_at_centre() {
        let f = field();
        let (_, db) = f.coil_averaged_at(0.0, 0.012, 51);
        let scale = f.dbz_dz(0.005).abs();
        assert!(db.abs() < 1e-12 * scale, "gradient at centre = {db}");
    }

    #[test]
    fn zero_length_coil_uses_point_value() {
        let f = field();
        let (b, db) = f.coil_averaged_at(0.003, 0.0, 51);
        assert_eq!(b, f.bz(0.003));
        assert_eq!(db, f.dbz_dz(0.003));
    }
}
