// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit conversion helpers
//!
//! Telemetry arrives in SI units (m/s, radians). Rig drawings are in
//! millimetres and operators think in knots and degrees.

use std::f64::consts::{PI, TAU};

/// Metres per second in one knot
pub const MS_PER_KNOT: f64 = 1852.0 / 3600.0;

#[inline]
pub fn knots_to_ms(knots: f64) -> f64 {
    knots * MS_PER_KNOT
}

#[inline]
pub fn ms_to_knots(ms: f64) -> f64 {
    ms / MS_PER_KNOT
}

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

#[inline]
pub fn mm_to_m(mm: f64) -> f64 {
    mm * 0.001
}

/// Wrap an angle into (-PI, PI]
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Wrap an angle into [0, 2*PI)
#[inline]
pub fn positive_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
