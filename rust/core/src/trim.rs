// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trim indicators
//!
//! Camber, twist, reef level and control-line loads for the operator
//! display. Everything here is a pure function of the current wind and
//! control positions; call it as often or as rarely as the UI needs.
//! None of these values feed the mesh deformer.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{Error, Result};
use crate::params::{clamp_finite, Ratio};
use crate::units::{knots_to_ms, normalize_angle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// True wind speed at which the first reef goes in, m/s (about 20 kn)
pub const FIRST_REEF_TWS: f64 = 10.3;
/// True wind speed at which the second reef goes in, m/s (about 27 kn)
pub const SECOND_REEF_TWS: f64 = 13.9;

/// Wind speed treated as "full load" for the indicators, m/s
pub const FULL_LOAD_TWS: f64 = 12.9;

/// Largest twist reported, radians
pub const MAX_TWIST: f64 = PI / 6.0;

const CAR_FLATTENING: f64 = 0.4;
const TENSION_FLATTENING: f64 = 0.3;
/// Flattest camber the controls can produce
pub const CAMBER_FLOOR: f64 = 0.3;

const CLOSE_HAULED_LIMIT: f64 = PI / 3.0;
const REACHING_LIMIT: f64 = 2.0 * PI / 3.0;

/// Inputs of the trim calculator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrimInput {
    /// True wind speed, m/s
    pub tws: f64,
    /// True wind angle, radians
    pub twa: f64,
    /// Apparent wind angle, radians
    pub awa: f64,
    pub main_car: Ratio,
    pub jib_car: Ratio,
    /// General tension slider
    pub tension: Ratio,
}

/// Reef stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum ReefLevel {
    Full,
    First,
    Second,
}

impl ReefLevel {
    /// 0, 1 or 2
    pub fn index(self) -> u8 {
        match self {
            ReefLevel::Full => 0,
            ReefLevel::First => 1,
            ReefLevel::Second => 2,
        }
    }

    /// Remaining luff length as a fraction of full hoist
    pub fn height_factor(self) -> f64 {
        match self {
            ReefLevel::Full => 1.0,
            ReefLevel::First => 0.8,
            ReefLevel::Second => 0.6,
        }
    }
}

impl TryFrom<u8> for ReefLevel {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            0 => Ok(ReefLevel::Full),
            1 => Ok(ReefLevel::First),
            2 => Ok(ReefLevel::Second),
            other => Err(Error::OutOfRange {
                name: "reef_level",
                value: other as f64,
                min: 0.0,
                max: 2.0,
            }),
        }
    }
}

impl From<ReefLevel> for u8 {
    fn from(level: ReefLevel) -> Self {
        level.index()
    }
}

/// Coarse point of sail, from the apparent wind angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointOfSail {
    CloseHauled,
    Reaching,
    Running,
}

impl PointOfSail {
    pub fn from_apparent_wind(awa: f64) -> Self {
        let angle = if awa.is_finite() {
            normalize_angle(awa).abs()
        } else {
            0.0
        };
        if angle < CLOSE_HAULED_LIMIT {
            PointOfSail::CloseHauled
        } else if angle < REACHING_LIMIT {
            PointOfSail::Reaching
        } else {
            PointOfSail::Running
        }
    }
}

/// 8-bit display colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub const TENSION_LOW: Rgb = Rgb::new(0x2e, 0xcc, 0x71);
pub const TENSION_MID: Rgb = Rgb::new(0xf3, 0x9c, 0x12);
pub const TENSION_HIGH: Rgb = Rgb::new(0xe7, 0x4c, 0x3c);

/// Loads on the four control lines, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineTensions {
    pub main_sheet: f64,
    pub jib_sheet: f64,
    pub vang: f64,
    pub cunningham: f64,
}

/// Display colours for `LineTensions`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TensionColors {
    pub main_sheet: Rgb,
    pub jib_sheet: Rgb,
    pub vang: Rgb,
    pub cunningham: Rgb,
}

/// Everything the trim indicators show
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrimState {
    pub reef_level: ReefLevel,
    pub reef_height_factor: f64,
    pub main_camber: f64,
    pub jib_camber: f64,
    pub main_twist: f64,
    pub jib_twist: f64,
    pub tensions: LineTensions,
    pub tension_colors: TensionColors,
    pub point_of_sail: PointOfSail,
}

/// Reef stage for a true wind speed in m/s
pub fn compute_reef_level(tws: f64) -> ReefLevel {
    let tws = clamp_finite(tws, 0.0, f64::MAX);
    if tws >= SECOND_REEF_TWS {
        ReefLevel::Second
    } else if tws >= FIRST_REEF_TWS {
        ReefLevel::First
    } else {
        ReefLevel::Full
    }
}

/// `tws` relative to full load, in `[0, 1]`
#[inline]
pub fn wind_speed_factor(tws: f64) -> f64 {
    clamp_finite(tws / FULL_LOAD_TWS, 0.0, 1.0)
}

/// Camber ratio in `[CAMBER_FLOOR, 1]`; 1 is the sail's natural depth
pub fn compute_camber(car_position: Ratio, tension: Ratio) -> f64 {
    clamp_finite(
        1.0 - car_position.value() * CAR_FLATTENING - tension.value() * TENSION_FLATTENING,
        CAMBER_FLOOR,
        1.0,
    )
}

/// Twist in `[0, MAX_TWIST]`; light air and an inboard car open the leech
pub fn compute_twist(tws: f64, car_position: Ratio) -> f64 {
    let open = (1.0 - wind_speed_factor(tws)) * (1.0 - car_position.value());
    clamp_finite(open * MAX_TWIST, 0.0, MAX_TWIST)
}

/// Line loads for the current wind and controls
pub fn compute_tensions(input: &TrimInput) -> LineTensions {
    let pressure = wind_speed_factor(input.tws).powi(2);
    let tension = input.tension.value();
    let blend = |p: f64, t: f64, car: f64| clamp_finite(p * pressure + t * tension + car, 0.0, 1.0);

    LineTensions {
        main_sheet: blend(0.5, 0.3, 0.2 * input.main_car.value()),
        jib_sheet: blend(0.5, 0.3, 0.2 * input.jib_car.value()),
        vang: blend(0.6, 0.4, 0.0),
        cunningham: blend(0.7, 0.3, 0.0),
    }
}

/// Green, amber, red gradient over a `[0, 1]` load
pub fn tension_color(tension: f64) -> Rgb {
    let t = clamp_finite(tension, 0.0, 1.0);
    if t <= 0.5 {
        lerp_rgb(TENSION_LOW, TENSION_MID, t * 2.0)
    } else {
        lerp_rgb(TENSION_MID, TENSION_HIGH, (t - 0.5) * 2.0)
    }
}

fn lerp_rgb(a: Rgb, b: Rgb, f: f64) -> Rgb {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round().clamp(0.0, 255.0) as u8;
    Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
}

pub fn tension_colors(tensions: &LineTensions) -> TensionColors {
    TensionColors {
        main_sheet: tension_color(tensions.main_sheet),
        jib_sheet: tension_color(tensions.jib_sheet),
        vang: tension_color(tensions.vang),
        cunningham: tension_color(tensions.cunningham),
    }
}

/// Full indicator set for one moment
pub fn compute_trim(input: &TrimInput) -> TrimState {
    let reef_level = compute_reef_level(input.tws);
    let tensions = compute_tensions(input);

    TrimState {
        reef_level,
        reef_height_factor: reef_level.height_factor(),
        main_camber: compute_camber(input.main_car, input.tension),
        jib_camber: compute_camber(input.jib_car, input.tension),
        main_twist: compute_twist(input.tws, input.main_car),
        jib_twist: compute_twist(input.tws, input.jib_car),
        tension_colors: tension_colors(&tensions),
        tensions,
        point_of_sail: PointOfSail::from_apparent_wind(input.awa),
    }
}

/// Convenience for callers holding knots
pub fn compute_trim_knots(tws_knots: f64, input: &TrimInput) -> TrimState {
    compute_trim(&TrimInput {
        tws: knots_to_ms(tws_knots),
        ..*input
    })
}
