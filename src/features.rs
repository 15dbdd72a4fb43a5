//! Feature extraction: one trajectory in, one fixed-size [`FeatureRecord`] out.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::{TrajSafeError, TrajSafeResult};
use crate::trajectory::Trajectory;

/// Compact summary of a trajectory. Key names are part of the report format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub goal_x: f64,
    pub goal_y: f64,
    pub d0: f64,
    #[serde(rename = "dT")]
    pub d_t: f64,
    pub dmin: f64,
    pub progress: f64,
    pub heading_err_abs: f64,
    pub v_max: f64,
    pub omega_max: f64,
    pub omega_mean: f64,
    pub domega_max: f64,
    #[serde(rename = "T")]
    pub sample_count: usize,
}

/// Wrap an angle into `[-pi, pi)`.
pub fn angle_wrap(a: f64) -> f64 {
    let wrapped = (a + PI).rem_euclid(2.0 * PI) - PI;
    // rem_euclid can round up to exactly 2*pi for tiny negative inputs
    if wrapped >= PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// Reduce a trajectory to its [`FeatureRecord`].
pub fn compute_features(traj: &Trajectory) -> TrajSafeResult<FeatureRecord> {
    let (first, last) = match (traj.samples.first(), traj.samples.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TrajSafeError::data("cannot extract features from an empty trajectory")),
    };

    let gx = traj.goal.gx;
    let gy = traj.goal.gy;
    if !gx.is_finite() || !gy.is_finite() {
        return Err(TrajSafeError::data("goal coordinates must be finite"));
    }
    for (i, s) in traj.samples.iter().enumerate() {
        let values = [s.t, s.x, s.y, s.theta, s.v, s.omega];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TrajSafeError::data(format!(
                "sample {i} contains a non-finite value"
            )));
        }
    }

    let dist = |x: f64, y: f64| ((x - gx).powi(2) + (y - gy).powi(2)).sqrt();

    let d0 = dist(first.x, first.y);
    let d_t = dist(last.x, last.y);
    let dmin = traj
        .samples
        .iter()
        .map(|s| dist(s.x, s.y))
        .fold(f64::INFINITY, f64::min);

    let desired = (gy - last.y).atan2(gx - last.x);
    let heading_err_abs = angle_wrap(last.theta - desired).abs();

    let v_max = traj.samples.iter().map(|s| s.v.abs()).fold(0.0, f64::max);
    let omega_max = traj.samples.iter().map(|s| s.omega.abs()).fold(0.0, f64::max);
    let omega_mean =
        traj.samples.iter().map(|s| s.omega.abs()).sum::<f64>() / traj.samples.len() as f64;

    let domega_max = traj
        .samples
        .windows(2)
        .map(|w| (w[1].omega - w[0].omega).abs())
        .fold(0.0, f64::max);

    Ok(FeatureRecord {
        goal_x: gx,
        goal_y: gy,
        d0,
        d_t,
        dmin,
        progress: d0 - d_t,
        heading_err_abs,
        v_max,
        omega_max,
        omega_mean,
        domega_max,
        sample_count: traj.samples.len(),
    })
}
