// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rig constants
//!
//! Lengths are in millimetres, as they come off the sail plan. They are
//! fixed at startup and never mutated afterwards.

use std::f64::consts::PI;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sail plan dimensions for one sail
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SailGeometrySpec {
    /// Foot length, tack to clew
    pub chord_at_foot: f64,
    /// Chord at the masthead
    pub chord_at_mast_top: f64,
    /// Mast section width, fore and aft
    pub mast_width: f64,
    /// Luff length
    pub sail_height: f64,
    /// Vertical spacing of mesh levels
    pub level_height: f64,
    /// Height of the deck-sweeper cut above the foot
    pub deck_sweeper_height: f64,
    /// Horizontal distance from tack to mast
    pub tack_to_mast: f64,
    /// Head of the sail to the top of the mast
    pub top_to_upper_mast: f64,
    /// Roach allowance at mid height
    pub leech_curve: f64,
}

impl Default for SailGeometrySpec {
    /// 35 ft sloop mainsail
    fn default() -> Self {
        Self {
            chord_at_foot: 3500.0,
            chord_at_mast_top: 390.0,
            mast_width: 200.0,
            sail_height: 14000.0,
            level_height: 500.0,
            deck_sweeper_height: 600.0,
            tack_to_mast: 250.0,
            top_to_upper_mast: 300.0,
            leech_curve: 350.0,
        }
    }
}

impl SailGeometrySpec {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("chord_at_foot", self.chord_at_foot),
            ("chord_at_mast_top", self.chord_at_mast_top),
            ("mast_width", self.mast_width),
            ("sail_height", self.sail_height),
            ("level_height", self.level_height),
            ("deck_sweeper_height", self.deck_sweeper_height),
            ("tack_to_mast", self.tack_to_mast),
            ("top_to_upper_mast", self.top_to_upper_mast),
            ("leech_curve", self.leech_curve),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::geometry(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.chord_at_foot <= 0.0 || self.chord_at_mast_top <= 0.0 {
            return Err(Error::geometry("chord lengths must be positive"));
        }
        if self.chord_at_mast_top > self.chord_at_foot {
            return Err(Error::geometry(format!(
                "head chord {} exceeds foot chord {}",
                self.chord_at_mast_top, self.chord_at_foot
            )));
        }
        if self.mast_width >= self.chord_at_foot {
            return Err(Error::geometry(format!(
                "mast width {} leaves no sail on a {} foot",
                self.mast_width, self.chord_at_foot
            )));
        }
        if self.tack_to_mast >= self.chord_at_foot {
            return Err(Error::geometry(format!(
                "tack to mast {} swallows the {} foot",
                self.tack_to_mast, self.chord_at_foot
            )));
        }
        if self.sail_height <= 0.0 || self.level_height <= 0.0 {
            return Err(Error::geometry("sail and level heights must be positive"));
        }
        if self.level_height > self.sail_height {
            return Err(Error::geometry(format!(
                "level height {} is taller than the sail {}",
                self.level_height, self.sail_height
            )));
        }
        Ok(())
    }

    /// Number of discretized levels from foot to head, both included
    pub fn level_count(&self) -> usize {
        // Small bias so 14000 / 500 does not land on 27.999..
        (self.sail_height / self.level_height + 1e-9).floor() as usize + 1
    }

    /// Height of a level above the foot
    #[inline]
    pub fn level_elevation(&self, level: usize) -> f64 {
        (level as f64 * self.level_height).min(self.sail_height)
    }

    /// Chord on the straight line from foot to masthead
    pub fn straight_chord(&self, height: f64) -> f64 {
        let span = self.sail_height + self.top_to_upper_mast;
        let f = (height / span).clamp(0.0, 1.0);
        self.chord_at_foot + (self.chord_at_mast_top - self.chord_at_foot) * f
    }

    /// Chord including roach, before any clipping
    pub fn unclipped_width(&self, height: f64) -> f64 {
        let f = (height / self.sail_height).clamp(0.0, 1.0);
        self.straight_chord(height) + self.leech_curve * (PI * f).sin()
    }

    /// Chord after the deck-sweeper cut near the foot
    pub fn clipped_width(&self, height: f64) -> f64 {
        let width = self.unclipped_width(height);
        if self.deck_sweeper_height > 0.0 && height < self.deck_sweeper_height {
            let cut = self.tack_to_mast * (1.0 - height / self.deck_sweeper_height);
            (width - cut).max(0.0)
        } else {
            width
        }
    }
}

/// Kinematic limits of the rig
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RigLimits {
    /// Largest rotation of a rotating mast, radians
    pub max_mast_rotation: f64,
    /// Largest change of chord rotation between neighbouring levels, radians
    pub max_chord_rotation_per_level: f64,
}

impl Default for RigLimits {
    fn default() -> Self {
        Self {
            max_mast_rotation: 1.4,
            max_chord_rotation_per_level: 0.05,
        }
    }
}

impl RigLimits {
    pub fn validate(&self) -> Result<()> {
        if !self.max_mast_rotation.is_finite() || self.max_mast_rotation < 0.0 {
            return Err(Error::limits(format!(
                "max_mast_rotation must be finite and non-negative, got {}",
                self.max_mast_rotation
            )));
        }
        if !self.max_chord_rotation_per_level.is_finite() || self.max_chord_rotation_per_level < 0.0 {
            return Err(Error::limits(format!(
                "max_chord_rotation_per_level must be finite and non-negative, got {}",
                self.max_chord_rotation_per_level
            )));
        }
        Ok(())
    }
}
