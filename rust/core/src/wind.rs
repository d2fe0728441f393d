// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-law wind shear
//!
//! `v(h) = v_ref * (h / 10 m)^k`. Heights below a small floor are treated as
//! the floor so the foot of the sail never sees a dead calm.

use crate::params::clamp_finite;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Height of the reference anemometer, metres
pub const REFERENCE_HEIGHT: f64 = 10.0;
/// Lowest height the profile is evaluated at, metres
pub const HEIGHT_FLOOR: f64 = 0.1;
/// Largest accepted shear exponent
pub const MAX_SHEAR_EXPONENT: f64 = 1.0;

/// Wind at one height
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindSample {
    /// m/s
    pub speed_at_height: f64,
    /// radians, height-invariant
    pub angle: f64,
}

/// Wind speed at `height` metres for a reference speed measured at 10 m
pub fn wind_at_height(reference_speed: f64, height: f64, shear_exponent: f64) -> f64 {
    let speed = clamp_finite(reference_speed, 0.0, f64::MAX);
    let exponent = clamp_finite(shear_exponent, 0.0, MAX_SHEAR_EXPONENT);
    let height = clamp_finite(height, HEIGHT_FLOOR, f64::MAX);
    if exponent == 0.0 {
        return speed;
    }
    speed * (height / REFERENCE_HEIGHT).powf(exponent)
}

/// Samples for a list of heights, all carrying the same angle
pub fn wind_profile(
    reference_speed: f64,
    angle: f64,
    heights: &[f64],
    shear_exponent: f64,
) -> Vec<WindSample> {
    heights
        .iter()
        .map(|&h| WindSample {
            speed_at_height: wind_at_height(reference_speed, h, shear_exponent),
            angle,
        })
        .collect()
}
