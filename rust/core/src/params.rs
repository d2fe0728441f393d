// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Range-carrying scalar parameters
//!
//! Control inputs reach the model as plain numbers from the telemetry bus.
//! These wrappers pin each value to its valid range once, at the boundary,
//! so the calculations downstream never see a value they cannot handle.
//!
//! `new` clamps (NaN collapses to the lower bound), `try_new` rejects.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clamp into `[min, max]`, mapping NaN to `min`
#[inline]
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Cunningham/outhaul position, 1 (eased) to 11 (hard on)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f64", into = "f64"))]
pub struct Cunningham(f64);

impl Cunningham {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 11.0;
    pub const NEUTRAL: f64 = 6.0;

    #[inline]
    pub fn new(value: f64) -> Self {
        Self(clamp_finite(value, Self::MIN, Self::MAX))
    }

    pub fn try_new(value: f64) -> Result<Self> {
        check_range("cunningham", value, Self::MIN, Self::MAX).map(Self)
    }

    pub fn neutral() -> Self {
        Self(Self::NEUTRAL)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Cunningham {
    fn default() -> Self {
        Self::neutral()
    }
}

impl From<f64> for Cunningham {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Cunningham> for f64 {
    fn from(value: Cunningham) -> Self {
        value.0
    }
}

/// Dimensionless value in `[0, 1]` (car positions, tension slider, line load)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f64", into = "f64"))]
pub struct Ratio(f64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0.0);
    pub const ONE: Ratio = Ratio(1.0);

    #[inline]
    pub fn new(value: f64) -> Self {
        Self(clamp_finite(value, 0.0, 1.0))
    }

    pub fn try_new(value: f64) -> Result<Self> {
        check_range("ratio", value, 0.0, 1.0).map(Self)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Ratio {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Ratio> for f64 {
    fn from(value: Ratio) -> Self {
        value.0
    }
}
