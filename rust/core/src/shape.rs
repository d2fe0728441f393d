// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sail camber model
//!
//! A sail section is modelled as a piece of the parabola `p(t) = (t², 2t)`.
//! The sampled piece is laid onto the x-axis (luff at the origin, leech on
//! +x), scaled to the sail's foot length and then flattened vertically by a
//! fullness factor. Both the parabola span and the fullness come from the
//! cunningham/outhaul input: pulling it on shortens the span and reduces
//! fullness, which flattens the section.
//!
//! Shape metrics (draft, girth, entry/exit angles) are derived from the
//! sampled point set, so they match what the deformer sees exactly.

use std::f64::consts::{PI, TAU};

use crate::params::Cunningham;
use crate::rig::SailGeometrySpec;
use crate::units::positive_angle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples taken along the parabola
pub const SAMPLE_COUNT: usize = 240;
/// First parabola parameter sampled (the vertex itself has no direction)
pub const T_START: f64 = 0.001;

const T_END_NEUTRAL: f64 = 1.0;
const T_END_PER_STEP: f64 = 0.05;
const FULLNESS_MAX: f64 = 0.95;
const FULLNESS_PER_STEP: f64 = 0.025;

/// End of the sampled parabola span for a cunningham setting
#[inline]
pub fn parabola_end(cunningham: Cunningham) -> f64 {
    T_END_NEUTRAL + T_END_PER_STEP * (Cunningham::NEUTRAL - cunningham.value())
}

/// Vertical fullness factor for a cunningham setting, always below 1
#[inline]
pub fn fullness(cunningham: Cunningham) -> f64 {
    FULLNESS_MAX - FULLNESS_PER_STEP * (cunningham.value() - Cunningham::MIN)
}

/// A point of the section curve, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    fn distance(&self, other: &CurvePoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction from `self` to `other`, in (-PI, PI]
    #[inline]
    fn direction(&self, other: &CurvePoint) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Inputs of the shape model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeParams {
    pub chord_at_foot: f64,
    pub chord_at_mast_top: f64,
    pub mast_width: f64,
    pub cunningham: Cunningham,
}

impl ShapeParams {
    pub fn from_geometry(spec: &SailGeometrySpec, cunningham: Cunningham) -> Self {
        Self {
            chord_at_foot: spec.chord_at_foot,
            chord_at_mast_top: spec.chord_at_mast_top,
            mast_width: spec.mast_width,
            cunningham,
        }
    }

    /// Arc length at which the mast-entry tangent is read
    pub fn mast_entry_distance(&self) -> f64 {
        self.mast_width * self.chord_at_foot / self.chord_at_mast_top
    }
}

/// Section shape for one cunningham setting
#[derive(Debug, Clone, PartialEq)]
pub struct SailShape {
    pub params: ShapeParams,
    /// Sampled curve, luff first
    pub points: Vec<CurvePoint>,
    /// Cumulative arc length at each point
    pub arc_lengths: Vec<f64>,
    /// Straight tack-to-clew distance of the deformed section
    pub chord: f64,
    /// Maximum camber depth
    pub draft_depth: f64,
    /// Fore-aft location of maximum camber as a fraction of `chord`
    pub draft_position: f64,
    /// Arc length of the section
    pub girth: f64,
    /// `chord_at_foot - girth`
    pub sag: f64,
    pub entry_angle: f64,
    pub exit_angle: f64,
    /// Tangent where the curve leaves the mast; `None` if the curve is too short
    pub mast_entry_angle: Option<f64>,
    /// Mean of entry and exit angles
    pub force_angle: f64,
}

/// Compute the section shape for a cunningham setting
pub fn compute_shape(params: ShapeParams) -> SailShape {
    let t_end = parabola_end(params.cunningham);
    let fullness = fullness(params.cunningham);

    let step = (t_end - T_START) / (SAMPLE_COUNT - 1) as f64;
    let raw: Vec<CurvePoint> = (0..SAMPLE_COUNT)
        .map(|i| {
            let t = T_START + step * i as f64;
            CurvePoint::new(t * t, 2.0 * t)
        })
        .collect();

    // Lay the chord onto the x-axis with the luff at the origin
    let origin = raw[0];
    let rotation = -origin.direction(&raw[SAMPLE_COUNT - 1]);
    let (sin, cos) = rotation.sin_cos();
    let mut points: Vec<CurvePoint> = raw
        .iter()
        .map(|p| {
            let dx = p.x - origin.x;
            let dy = p.y - origin.y;
            CurvePoint::new(dx * cos - dy * sin, dx * sin + dy * cos)
        })
        .collect();

    // Foot length is the cloth length, so the arc is normalised to it
    let raw_girth: f64 = points.windows(2).map(|w| w[0].distance(&w[1])).sum();
    let scale = if raw_girth > 0.0 {
        params.chord_at_foot / raw_girth
    } else {
        0.0
    };
    for p in &mut points {
        p.x *= scale;
        p.y *= scale * fullness;
    }

    let arc_lengths = cumulative_arc_lengths(&points);
    let girth = arc_lengths.last().copied().unwrap_or(0.0);
    let chord = points[0].distance(&points[SAMPLE_COUNT - 1]);

    let (draft_index, draft) = points
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.y.total_cmp(&b.1.y))
        .map(|(i, p)| (i, *p))
        .unwrap_or((0, CurvePoint::default()));
    let draft_position = if chord > 0.0 { draft.x / chord } else { 0.0 };

    let entry_angle = positive_angle(points[0].direction(&points[1]));
    let mut exit_angle = positive_angle(points[SAMPLE_COUNT - 2].direction(&points[SAMPLE_COUNT - 1]));
    if exit_angle > PI {
        exit_angle -= TAU;
    }

    let mut shape = SailShape {
        params,
        points,
        arc_lengths,
        chord,
        draft_depth: draft.y,
        draft_position,
        girth,
        sag: params.chord_at_foot - girth,
        entry_angle,
        exit_angle,
        mast_entry_angle: None,
        force_angle: (entry_angle + exit_angle) / 2.0,
    };
    shape.mast_entry_angle = shape.tangent_at(params.mast_entry_distance());

    tracing::trace!(
        cunningham = params.cunningham.value(),
        draft_index,
        draft_depth = shape.draft_depth,
        girth = shape.girth,
        mast_entry_defined = shape.mast_entry_angle.is_some(),
        "Computed sail shape"
    );

    shape
}

fn cumulative_arc_lengths(points: &[CurvePoint]) -> Vec<f64> {
    let mut total = 0.0;
    let mut lengths = Vec::with_capacity(points.len());
    lengths.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(&w[1]);
        lengths.push(total);
    }
    lengths
}

impl SailShape {
    /// Depth over chord
    pub fn camber_ratio(&self) -> f64 {
        if self.chord > 0.0 {
            self.draft_depth / self.chord
        } else {
            0.0
        }
    }

    /// Tangent direction after walking `distance` along the curve from the luff
    ///
    /// Returns `None` when the curve ends before `distance` is reached.
    pub fn tangent_at(&self, distance: f64) -> Option<f64> {
        if distance.is_nan() || distance > self.girth || self.points.len() < 2 {
            return None;
        }
        let index = self
            .arc_lengths
            .iter()
            .position(|&s| s >= distance)
            .unwrap_or(self.arc_lengths.len() - 1)
            .max(1);
        Some(self.points[index - 1].direction(&self.points[index]))
    }

    /// Tangent angles at the boundaries of `vertex_count - 1` equal-arc
    /// segments of the curve beyond the mast
    ///
    /// With `clip_off_width` set, partitioning stops at that arc length.
    /// The result is shorter than `vertex_count` when the curve runs out;
    /// callers must cope with that.
    pub fn vertices_angles_for_level(
        &self,
        vertex_count: usize,
        mast_width: f64,
        clip_off_width: Option<f64>,
    ) -> Vec<f64> {
        let mut angles = Vec::with_capacity(vertex_count);
        if vertex_count == 0 {
            return angles;
        }

        let start = mast_width.max(0.0);
        let available = self.girth - start;
        if available.is_nan() || available <= 0.0 {
            return angles;
        }
        let step = if vertex_count > 1 {
            available / (vertex_count - 1) as f64
        } else {
            0.0
        };

        for k in 0..vertex_count {
            let distance = (start + step * k as f64).min(self.girth);
            if let Some(clip) = clip_off_width {
                if distance > clip {
                    break;
                }
            }
            match self.tangent_at(distance) {
                Some(angle) => angles.push(angle),
                None => break,
            }
        }
        angles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(cunningham: f64) -> ShapeParams {
        ShapeParams {
            chord_at_foot: 3500.0,
            chord_at_mast_top: 390.0,
            mast_width: 200.0,
            cunningham: Cunningham::new(cunningham),
        }
    }

    #[test]
    fn test_reference_section() {
        let shape = compute_shape(params(1.0));
        assert!(shape.girth < 3500.0);
        assert!(shape.draft_depth > 0.0);
        assert!(shape.sag > 0.0);
        assert_relative_eq!(shape.sag, 3500.0 - shape.girth);
        assert_eq!(shape.points.len(), SAMPLE_COUNT);
        assert_eq!(shape.arc_lengths.len(), SAMPLE_COUNT);
    }

    #[test]
    fn test_curve_starts_at_luff_and_ends_on_axis() {
        let shape = compute_shape(params(6.0));
        let first = shape.points[0];
        let last = shape.points[SAMPLE_COUNT - 1];
        assert_relative_eq!(first.x, 0.0);
        assert_relative_eq!(first.y, 0.0);
        assert!(last.y.abs() < 1e-6);
        assert_relative_eq!(last.x, shape.chord, epsilon = 1e-6);
    }

    #[test]
    fn test_draft_sits_forward_of_mid_chord() {
        let shape = compute_shape(params(6.0));
        assert!(shape.draft_position > 0.3 && shape.draft_position < 0.5);
        let ratio = shape.camber_ratio();
        assert!(ratio > 0.05 && ratio < 0.15, "camber ratio {}", ratio);
    }

    #[test]
    fn test_entry_and_exit_angles() {
        let shape = compute_shape(params(6.0));
        assert!(shape.entry_angle > 0.0 && shape.entry_angle < PI / 2.0);
        assert!(shape.exit_angle < 0.0 && shape.exit_angle > -PI / 2.0);
        assert_relative_eq!(shape.force_angle, (shape.entry_angle + shape.exit_angle) / 2.0);
    }

    #[test]
    fn test_mast_entry_angle_defined_for_default_rig() {
        let shape = compute_shape(params(3.0));
        let angle = shape.mast_entry_angle.expect("curve long enough");
        assert!(angle < shape.entry_angle && angle > shape.exit_angle);
    }

    #[test]
    fn test_mast_entry_angle_undefined_when_curve_too_short() {
        let shape = compute_shape(ShapeParams {
            chord_at_mast_top: 100.0,
            mast_width: 150.0,
            ..params(6.0)
        });
        // 150 * 3500 / 100 is longer than the whole section
        assert!(shape.mast_entry_angle.is_none());
    }

    #[test]
    fn test_vertex_angles_full_partition() {
        let shape = compute_shape(params(6.0));
        let angles = shape.vertices_angles_for_level(12, 200.0, None);
        assert_eq!(angles.len(), 12);
        // Tangent turns steadily from entry towards exit
        for w in angles.windows(2) {
            assert!(w[1] <= w[0] + 1e-9);
        }
    }

    #[test]
    fn test_vertex_angles_clip_off() {
        let shape = compute_shape(params(6.0));
        let clip = 200.0 + (shape.girth - 200.0) / 2.0 + 1.0;
        let angles = shape.vertices_angles_for_level(11, 200.0, Some(clip));
        assert_eq!(angles.len(), 6);
    }

    #[test]
    fn test_vertex_angles_short_when_girth_insufficient() {
        let shape = compute_shape(params(6.0));
        assert!(shape.vertices_angles_for_level(12, 5000.0, None).is_empty());
        assert!(shape.vertices_angles_for_level(0, 200.0, None).is_empty());
        assert_eq!(shape.vertices_angles_for_level(1, 200.0, None).len(), 1);
    }

    #[test]
    fn test_parabola_span_follows_cunningham() {
        assert!(parabola_end(Cunningham::new(1.0)) > parabola_end(Cunningham::new(11.0)));
        assert_relative_eq!(parabola_end(Cunningham::neutral()), 1.0);
        assert!(fullness(Cunningham::new(1.0)) < 1.0);
    }
}
