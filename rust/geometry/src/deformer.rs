// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-frame sail deformation
//!
//! The deformer owns a pristine flat reference mesh and, every frame,
//! rotates copies of its vertices around the luff axis to produce the
//! trimmed sail. Positions are always derived from the reference, never
//! from the previous frame, so nothing drifts however long it runs.
//!
//! Each instance carries its own cache and rotation history, so a main and
//! a jib can be driven side by side without sharing anything.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Rotation3, Vector3};
use sailtrim_core::params::clamp_finite;
use sailtrim_core::shape::{compute_shape, SailShape, ShapeParams};
use sailtrim_core::trim::MAX_TWIST;
use sailtrim_core::units::{deg_to_rad, mm_to_m, normalize_angle};
use sailtrim_core::{wind_at_height, Cunningham, RigLimits, SailGeometrySpec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mesh::{calculate_normals, Mesh};
use crate::sail_mesh::{MeshLevel, SailMesh};

/// Below this apparent wind angle the angle of attack is ignored, radians
pub const AOA_DEADBAND: f64 = 0.01;
/// Largest angle of attack accepted, degrees
pub const MAX_ANGLE_OF_ATTACK_DEG: f64 = 90.0;
/// Extra chord rotation per unit of wind speed gained over the foot, radians
pub const WIND_TWIST_GAIN: f64 = 0.5;

/// Everything fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeformerConfig {
    pub geometry: SailGeometrySpec,
    pub limits: RigLimits,
    pub vertices_per_level: usize,
    /// Height of the foot above the waterline, metres
    pub foot_height: f64,
    /// Levels per colour stripe
    pub stripe_levels: usize,
}

impl Default for DeformerConfig {
    fn default() -> Self {
        Self {
            geometry: SailGeometrySpec::default(),
            limits: RigLimits::default(),
            vertices_per_level: 12,
            foot_height: 1.5,
            stripe_levels: 4,
        }
    }
}

/// Live inputs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SailControls {
    /// Apparent wind angle, radians, positive to starboard
    pub awa: f64,
    /// Apparent wind speed at 10 m, m/s
    pub aws: f64,
    /// Angle of attack setting, degrees
    pub angle_of_attack_deg: f64,
    pub cunningham: Cunningham,
    pub shear_exponent: f64,
}

impl Default for SailControls {
    fn default() -> Self {
        Self {
            awa: 0.0,
            aws: 0.0,
            angle_of_attack_deg: 0.0,
            cunningham: Cunningham::neutral(),
            shear_exponent: 0.14,
        }
    }
}

/// Lifecycle of a deformer
///
/// Construction is the transition out of "uninitialized": a value of this
/// type only exists once the reference mesh has been built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeformerState {
    /// Reference mesh built, live buffer still in the flat pose
    Built,
    /// At least one frame has been applied
    Updating,
}

/// Per-level result of the last update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSample {
    pub level: usize,
    /// Above the waterline, metres
    pub height: f64,
    /// Apparent wind speed at this height, m/s
    pub wind_speed: f64,
    pub chord_angle: f64,
    /// Leech opening from the wind gradient, radians
    pub wind_twist: f64,
    /// After the per-level step limit
    pub chord_rotation: f64,
}

/// Summary of one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    /// Signed mast rotation, radians
    pub mast_rotation: f64,
    /// Accumulated rigid rotation of the sail node, radians
    pub node_rotation: f64,
    /// +1 with the wind from starboard, -1 from port
    pub dir_fact: f64,
    pub shape_recomputed: bool,
}

#[derive(Debug, Clone)]
struct CachedShape {
    cunningham: Cunningham,
    shape: SailShape,
    /// One table per mesh level, short where the deck sweeper clips the level
    level_angles: Vec<Vec<f64>>,
}

/// Drives one sail's mesh from live wind and rig state
#[derive(Debug, Clone)]
pub struct SailDeformer {
    config: DeformerConfig,
    mesh: SailMesh,
    live: Mesh,
    staging: Vec<f32>,
    cached: Option<CachedShape>,
    last_good_angles: Vec<f64>,
    last_good_mast_entry: f64,
    last_mast_rotation: f64,
    node_rotation: f64,
    levels: Vec<LevelSample>,
    warned_mast_entry: bool,
    warned_short_angles: bool,
    state: DeformerState,
}

impl SailDeformer {
    /// Validate the configuration and build the reference mesh
    pub fn new(config: DeformerConfig) -> Result<Self> {
        config.limits.validate()?;
        let mesh = SailMesh::build(&config.geometry, config.vertices_per_level, config.stripe_levels)?;
        let live = mesh.reference().clone();
        let staging = live.positions.clone();

        Ok(Self {
            config,
            levels: Vec::with_capacity(mesh.level_count()),
            mesh,
            live,
            staging,
            cached: None,
            last_good_angles: Vec::new(),
            last_good_mast_entry: 0.0,
            last_mast_rotation: 0.0,
            node_rotation: 0.0,
            warned_mast_entry: false,
            warned_short_angles: false,
            state: DeformerState::Built,
        })
    }

    /// Apply one frame of wind and controls
    pub fn update(&mut self, controls: &SailControls) -> FrameSummary {
        let awa = if controls.awa.is_finite() {
            normalize_angle(controls.awa)
        } else {
            0.0
        };
        let dir_fact = if awa >= 0.0 { 1.0 } else { -1.0 };
        let abs_awa = awa.abs();

        let mut angle_of_attack = deg_to_rad(clamp_finite(
            controls.angle_of_attack_deg,
            -MAX_ANGLE_OF_ATTACK_DEG,
            MAX_ANGLE_OF_ATTACK_DEG,
        ));
        if abs_awa < AOA_DEADBAND {
            angle_of_attack = 0.0;
        }

        let shape_recomputed = self.refresh_shape(controls.cunningham);
        let mast_entry = self.mast_entry_angle();

        let max_mast = self.config.limits.max_mast_rotation;
        let mast_magnitude = (abs_awa - angle_of_attack + mast_entry).min(max_mast);
        let mast_rotation = mast_magnitude * dir_fact;

        let chord_angle = (abs_awa - angle_of_attack).clamp(0.0, FRAC_PI_2);
        let max_step = self.config.limits.max_chord_rotation_per_level;
        let vertices_per_level = self.mesh.vertices_per_level();

        let foot_wind = wind_at_height(controls.aws, self.config.foot_height, controls.shear_exponent);

        self.levels.clear();
        // The boom holds the foot at zero rotation
        let mut previous = 0.0;
        for level in self.mesh.levels() {
            let height = self.config.foot_height + mm_to_m(level.elevation);
            let wind_speed = wind_at_height(controls.aws, height, controls.shear_exponent);

            // Stronger air aloft opens the leech
            let gain = wind_speed / foot_wind;
            let wind_twist = if gain.is_finite() {
                (WIND_TWIST_GAIN * (gain - 1.0)).clamp(0.0, MAX_TWIST)
            } else {
                0.0
            };

            let target = chord_angle - mast_magnitude + wind_twist;
            let chord_rotation = target.min(previous + max_step);
            previous = chord_rotation;

            let first = level.first_vertex;
            copy_position(&self.mesh.reference().positions, &mut self.staging, first);

            for vertex in 1..vertices_per_level {
                let vertex_angle = self.vertex_angle(level.index, vertex);
                let angle = -(dir_fact * (chord_rotation + vertex_angle) + FRAC_PI_2);
                let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), angle);
                let rotated = rotation * self.mesh.reference().position(first + vertex);

                let i = (first + vertex) * 3;
                self.staging[i] = rotated.x as f32;
                self.staging[i + 1] = rotated.y as f32;
                self.staging[i + 2] = rotated.z as f32;
            }

            self.levels.push(LevelSample {
                level: level.index,
                height,
                wind_speed,
                chord_angle,
                wind_twist,
                chord_rotation,
            });
        }

        // Publish the finished frame in one step
        std::mem::swap(&mut self.live.positions, &mut self.staging);
        calculate_normals(&mut self.live);

        self.node_rotation += mast_rotation - self.last_mast_rotation;
        self.last_mast_rotation = mast_rotation;
        self.state = DeformerState::Updating;

        tracing::trace!(
            awa,
            mast_rotation,
            node_rotation = self.node_rotation,
            shape_recomputed,
            "Sail frame updated"
        );

        FrameSummary {
            mast_rotation,
            node_rotation: self.node_rotation,
            dir_fact,
            shape_recomputed,
        }
    }

    /// Return to the flat pose and forget all frame history
    pub fn reset(&mut self) {
        self.live = self.mesh.reference().clone();
        self.staging.copy_from_slice(&self.live.positions);
        self.cached = None;
        self.last_good_angles.clear();
        self.last_good_mast_entry = 0.0;
        self.last_mast_rotation = 0.0;
        self.node_rotation = 0.0;
        self.levels.clear();
        self.state = DeformerState::Built;
    }

    fn refresh_shape(&mut self, cunningham: Cunningham) -> bool {
        if self.cached.as_ref().is_some_and(|c| c.cunningham == cunningham) {
            return false;
        }

        let geometry = &self.config.geometry;
        let vertices_per_level = self.mesh.vertices_per_level();
        let shape = compute_shape(ShapeParams::from_geometry(geometry, cunningham));
        let vertex_angles = shape.vertices_angles_for_level(vertices_per_level, geometry.mast_width, None);
        let level_angles = self
            .mesh
            .levels()
            .iter()
            .map(|level| match clip_off_distance(&shape, level) {
                Some(clip) => shape.vertices_angles_for_level(vertices_per_level, geometry.mast_width, Some(clip)),
                None => vertex_angles.clone(),
            })
            .collect();

        if vertex_angles.len() < vertices_per_level && !self.warned_short_angles {
            tracing::warn!(
                cunningham = cunningham.value(),
                girth = shape.girth,
                angles = vertex_angles.len(),
                wanted = vertices_per_level,
                "Sail curve too short for every vertex, reusing last valid angle"
            );
            self.warned_short_angles = true;
        }
        if !vertex_angles.is_empty() {
            self.last_good_angles.clone_from(&vertex_angles);
        }
        if let Some(angle) = shape.mast_entry_angle {
            self.last_good_mast_entry = angle;
        } else if !self.warned_mast_entry {
            tracing::warn!(
                cunningham = cunningham.value(),
                girth = shape.girth,
                "Mast entry angle undefined, keeping last known angle"
            );
            self.warned_mast_entry = true;
        }

        tracing::debug!(
            cunningham = cunningham.value(),
            draft_depth = shape.draft_depth,
            draft_position = shape.draft_position,
            girth = shape.girth,
            "Recomputed sail shape"
        );

        self.cached = Some(CachedShape {
            cunningham,
            shape,
            level_angles,
        });
        true
    }

    fn mast_entry_angle(&self) -> f64 {
        self.cached
            .as_ref()
            .and_then(|c| c.shape.mast_entry_angle)
            .unwrap_or(self.last_good_mast_entry)
    }

    fn vertex_angle(&self, level: usize, vertex: usize) -> f64 {
        let angles = match self.cached.as_ref().and_then(|c| c.level_angles.get(level)) {
            Some(table) if !table.is_empty() => table,
            _ => &self.last_good_angles,
        };
        angles
            .get(vertex)
            .or_else(|| angles.last())
            .copied()
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn config(&self) -> &DeformerConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> DeformerState {
        self.state
    }

    #[inline]
    pub fn sail_mesh(&self) -> &SailMesh {
        &self.mesh
    }

    /// Mesh as of the last completed update
    #[inline]
    pub fn live_mesh(&self) -> &Mesh {
        &self.live
    }

    /// Vertex positions as of the last completed update
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.live.positions
    }

    /// Shape used by the last update
    pub fn shape(&self) -> Option<&SailShape> {
        self.cached.as_ref().map(|c| &c.shape)
    }

    #[inline]
    pub fn level_samples(&self) -> &[LevelSample] {
        &self.levels
    }

    #[inline]
    pub fn mast_rotation(&self) -> f64 {
        self.last_mast_rotation
    }

    #[inline]
    pub fn node_rotation_angle(&self) -> f64 {
        self.node_rotation
    }

    /// Rigid rotation the renderer applies to the sail node
    pub fn node_rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.node_rotation)
    }
}

/// Arc length at which a deck-sweeper clipped level runs out of cloth
fn clip_off_distance(shape: &SailShape, level: &MeshLevel) -> Option<f64> {
    if level.width > 0.0 && level.clipped_width < level.width {
        Some(shape.girth * level.clipped_width / level.width)
    } else {
        None
    }
}

#[inline]
fn copy_position(src: &[f32], dst: &mut [f32], vertex: usize) {
    let i = vertex * 3;
    dst[i..i + 3].copy_from_slice(&src[i..i + 3]);
}
