//! Fixed-step Euler-Cromer integrator for the falling magnet
//!
//! Velocity is updated from the previous sample's forces, then position
//! from the new velocity. Once the stop height is reached the magnet is
//! frozen there with zero velocity for the rest of the run.
//! No adaptive step control: `dt` must be small enough for the caller's needs.

use tracing::{debug, warn};

use super::forces::{ForceSet, MagnetState};
use super::params::{Environment, Magnet, Parameters};
use super::states::{Series, Trajectory};

/// Evenly spaced time base `0..=t_end` with `params.step_count()` samples
pub fn time_base(params: &Parameters) -> Series {
    let n = params.step_count();
    let span = (n - 1).max(1) as f64;
    Series::from_fn(n, |i, _| params.t_end * (i as f64 / span))
}

/// Integrate the trajectory with the mechanical forces only
pub fn integrate(params: &Parameters, magnet: &Magnet, env: &Environment, forces: &ForceSet) -> Trajectory {
    integrate_with(params, magnet, env, forces, |_, _| 0.0)
}

/// Integrate the trajectory with an extra retarding force
///
/// `extra(k, state)` is called once per step with the index and state of the
/// sample the step starts from, in increasing `k`. It stops being called
/// once the magnet reaches the stop height.
pub fn integrate_with<F>(params: &Parameters, magnet: &Magnet, env: &Environment, forces: &ForceSet, mut extra: F) -> Trajectory
where
    F: FnMut(usize, &MagnetState) -> f64,
{
    let t = time_base(params);
    let n = t.len();
    let dt = params.dt;

    let mut z = Series::zeros(n);
    let mut v = Series::zeros(n);
    z[0] = params.z0;
    v[0] = params.v0;

    for k in 1..n {
        let prev = MagnetState {
            t: t[k - 1],
            z: z[k - 1],
            v: v[k - 1],
        };

        // a = g - (F_drag + F_extra) / m
        let f = forces.total(&prev) + extra(k - 1, &prev);
        let a = env.g - f / magnet.mass;

        // Euler-Cromer: velocity first, then position with the new velocity
        v[k] = prev.v + a * dt;
        z[k] = prev.z + v[k] * dt;

        if z[k] >= params.h0 {
            let z_stop = z[k];
            z.rows_mut(k, n - k).fill(z_stop);
            v.rows_mut(k, n - k).fill(0.0);
            debug!(t = t[k], z = z_stop, "magnet reached stop height");
            return Trajectory { t, z, v };
        }
    }

    warn!(h0 = params.h0, t_end = params.t_end, "stop height not reached within the simulated duration");
    Trajectory { t, z, v }
}
