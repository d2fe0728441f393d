// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry scenarios: keyframes the replay interpolates between.

use std::path::Path;

use sailtrim_core::units::normalize_angle;
use sailtrim_core::{Cunningham, Ratio, TrimInput};
use sailtrim_geometry::SailControls;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Telemetry at one instant. Angles in radians, speeds in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyframe {
    /// Seconds from the start of the scenario.
    pub t: f64,
    pub tws: f64,
    pub twa: f64,
    pub awa: f64,
    pub aws: f64,
    pub heading: f64,
    pub cunningham: f64,
    pub angle_of_attack_deg: f64,
    pub main_car: f64,
    pub jib_car: f64,
    pub tension: f64,
    pub shear_exponent: f64,
}

impl Default for Keyframe {
    fn default() -> Self {
        Self {
            t: 0.0,
            tws: 6.0,
            twa: 0.8,
            awa: 0.55,
            aws: 8.5,
            heading: 0.0,
            cunningham: Cunningham::NEUTRAL,
            angle_of_attack_deg: 15.0,
            main_car: 0.5,
            jib_car: 0.5,
            tension: 0.4,
            shear_exponent: 0.14,
        }
    }
}

fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a + (b - a) * f
}

/// Interpolate along the shorter arc
fn lerp_angle(a: f64, b: f64, f: f64) -> f64 {
    normalize_angle(a + normalize_angle(b - a) * f)
}

impl Keyframe {
    pub fn lerp(&self, other: &Keyframe, f: f64) -> Keyframe {
        Keyframe {
            t: lerp(self.t, other.t, f),
            tws: lerp(self.tws, other.tws, f),
            twa: lerp_angle(self.twa, other.twa, f),
            awa: lerp_angle(self.awa, other.awa, f),
            aws: lerp(self.aws, other.aws, f),
            heading: lerp_angle(self.heading, other.heading, f),
            cunningham: lerp(self.cunningham, other.cunningham, f),
            angle_of_attack_deg: lerp(self.angle_of_attack_deg, other.angle_of_attack_deg, f),
            main_car: lerp(self.main_car, other.main_car, f),
            jib_car: lerp(self.jib_car, other.jib_car, f),
            tension: lerp(self.tension, other.tension, f),
            shear_exponent: lerp(self.shear_exponent, other.shear_exponent, f),
        }
    }

    pub fn sail_controls(&self) -> SailControls {
        SailControls {
            awa: self.awa,
            aws: self.aws,
            angle_of_attack_deg: self.angle_of_attack_deg,
            cunningham: Cunningham::new(self.cunningham),
            shear_exponent: self.shear_exponent,
        }
    }

    pub fn trim_input(&self) -> TrimInput {
        TrimInput {
            tws: self.tws,
            twa: self.twa,
            awa: self.awa,
            main_car: Ratio::new(self.main_car),
            jib_car: Ratio::new(self.jib_car),
            tension: Ratio::new(self.tension),
        }
    }
}

/// Ordered keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    keyframes: Vec<Keyframe>,
}

impl Scenario {
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self, SimError> {
        if keyframes.is_empty() {
            return Err(SimError::EmptyScenario);
        }
        for w in keyframes.windows(2) {
            if w[1].t.partial_cmp(&w[0].t).map_or(true, |o| o.is_lt()) {
                return Err(SimError::UnorderedScenario(w[1].t));
            }
        }
        Ok(Self { keyframes })
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: Scenario = serde_json::from_str(&text).map_err(|source| SimError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(parsed.keyframes)
    }

    /// Twenty seconds on starboard: a gust builds past both reef
    /// breakpoints, the crew hardens the cunningham, then it eases off
    /// and the boat tacks onto port.
    pub fn gust() -> Self {
        let base = Keyframe::default();
        let keyframes = vec![
            base,
            Keyframe {
                t: 6.0,
                tws: 11.0,
                aws: 14.0,
                awa: 0.6,
                cunningham: 8.0,
                tension: 0.7,
                ..base
            },
            Keyframe {
                t: 10.0,
                tws: 15.5,
                aws: 19.0,
                awa: 0.65,
                cunningham: 11.0,
                main_car: 0.9,
                jib_car: 0.8,
                tension: 0.95,
                shear_exponent: 0.2,
                ..base
            },
            Keyframe {
                t: 15.0,
                tws: 7.0,
                aws: 9.5,
                cunningham: 4.0,
                ..base
            },
            Keyframe {
                t: 20.0,
                twa: -0.8,
                awa: -0.55,
                heading: 1.6,
                ..base
            },
        ];
        Self { keyframes }
    }

    pub fn duration(&self) -> f64 {
        let first = self.keyframes.first().map_or(0.0, |k| k.t);
        let last = self.keyframes.last().map_or(0.0, |k| k.t);
        last - first
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Telemetry at `t` seconds from the first keyframe, held at both ends.
    pub fn sample(&self, t: f64) -> Keyframe {
        let start = self.keyframes[0].t;
        let at = start + t;
        let next = self.keyframes.partition_point(|k| k.t <= at);
        if next == 0 {
            return Keyframe { t: at, ..self.keyframes[0] };
        }
        if next == self.keyframes.len() {
            return Keyframe {
                t: at,
                ..self.keyframes[next - 1]
            };
        }
        let a = &self.keyframes[next - 1];
        let b = &self.keyframes[next];
        let span = b.t - a.t;
        let f = if span > 0.0 { (at - a.t) / span } else { 1.0 };
        a.lerp(b, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gust_is_valid() {
        let gust = Scenario::gust();
        assert!(Scenario::new(gust.keyframes().to_vec()).is_ok());
        assert_abs_diff_eq!(gust.duration(), 20.0);
    }

    #[test]
    fn test_sample_interpolates() {
        let gust = Scenario::gust();
        let mid = gust.sample(3.0);
        assert_abs_diff_eq!(mid.tws, 8.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.cunningham, 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.t, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_holds_ends() {
        let gust = Scenario::gust();
        assert_eq!(gust.sample(-5.0).tws, 6.0);
        assert_eq!(gust.sample(500.0).awa, -0.55);
    }

    #[test]
    fn test_angles_take_short_way_round() {
        let a = Keyframe {
            awa: 3.0,
            ..Keyframe::default()
        };
        let b = Keyframe {
            awa: -3.0,
            ..Keyframe::default()
        };
        let mid = a.lerp(&b, 0.5);
        assert!(mid.awa.abs() > 3.0);
    }

    #[test]
    fn test_rejects_bad_scenarios() {
        assert!(matches!(Scenario::new(vec![]), Err(SimError::EmptyScenario)));
        let backwards = vec![
            Keyframe { t: 2.0, ..Keyframe::default() },
            Keyframe { t: 1.0, ..Keyframe::default() },
        ];
        assert!(matches!(
            Scenario::new(backwards),
            Err(SimError::UnorderedScenario(_))
        ));
    }

    #[test]
    fn test_parse_scenario_json() {
        let parsed: Scenario = serde_json::from_str(
            r#"{ "keyframes": [ { "t": 0.0, "tws": 4.0 }, { "t": 2.0, "tws": 8.0 } ] }"#,
        )
        .unwrap();
        assert_abs_diff_eq!(parsed.sample(1.0).tws, 6.0);
        assert_eq!(parsed.keyframes()[0].aws, Keyframe::default().aws);
    }
}
