// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat reference mesh of a sail
//!
//! Local sail space: Y runs up the luff, the flat sail lies along +Z with
//! the luff at Z = 0. Positions are in metres. The reference mesh is built
//! once and never touched again; the deformer rotates copies of it.

use nalgebra::{Point3, Vector3};
use sailtrim_core::units::mm_to_m;
use sailtrim_core::SailGeometrySpec;

use crate::error::{Error, Result};
use crate::mesh::{calculate_normals, Mesh};

/// Base sailcloth colour
pub const CLOTH_COLOR: [f32; 3] = [0.95, 0.94, 0.90];
/// Colour of the alternate stripes
pub const STRIPE_COLOR: [f32; 3] = [0.18, 0.33, 0.62];

/// One horizontal row of vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshLevel {
    pub index: usize,
    /// Height above the foot, mm
    pub elevation: f64,
    /// Chord before clipping, mm
    pub width: f64,
    /// Chord the vertices are spread over, mm
    pub clipped_width: f64,
    /// Index of the luff vertex of this level
    pub first_vertex: usize,
}

/// Reference sail mesh plus its level layout
#[derive(Debug, Clone)]
pub struct SailMesh {
    levels: Vec<MeshLevel>,
    vertices_per_level: usize,
    reference: Mesh,
}

impl SailMesh {
    /// Build the flat mesh for a rig
    ///
    /// `stripe_levels` is the number of levels per colour band.
    pub fn build(spec: &SailGeometrySpec, vertices_per_level: usize, stripe_levels: usize) -> Result<Self> {
        spec.validate()?;
        if vertices_per_level < 2 {
            return Err(Error::InvalidMeshLayout(format!(
                "need at least 2 vertices per level, got {}",
                vertices_per_level
            )));
        }
        if stripe_levels == 0 {
            return Err(Error::InvalidMeshLayout("stripe_levels must be positive".to_string()));
        }

        let level_count = spec.level_count();
        if level_count < 2 {
            return Err(Error::InvalidMeshLayout(format!(
                "sail of {} mm with {} mm levels has a single level",
                spec.sail_height, spec.level_height
            )));
        }
        let vertex_count = level_count * vertices_per_level;
        if vertex_count > u32::MAX as usize {
            return Err(Error::InvalidMeshLayout(format!("{} vertices overflow u32 indices", vertex_count)));
        }

        let quads = (level_count - 1) * (vertices_per_level - 1);
        let mut reference = Mesh::with_capacity(vertex_count, quads * 6);
        let mut levels = Vec::with_capacity(level_count);

        for index in 0..level_count {
            let elevation = spec.level_elevation(index);
            let level = MeshLevel {
                index,
                elevation,
                width: spec.unclipped_width(elevation),
                clipped_width: spec.clipped_width(elevation),
                first_vertex: index * vertices_per_level,
            };

            let color = if (index / stripe_levels) % 2 == 0 {
                CLOTH_COLOR
            } else {
                STRIPE_COLOR
            };
            let spacing = level.clipped_width / (vertices_per_level - 1) as f64;
            for i in 0..vertices_per_level {
                let position = Point3::new(0.0, mm_to_m(elevation), mm_to_m(spacing * i as f64));
                reference.add_colored_vertex(position, Vector3::zeros(), color);
            }
            levels.push(level);
        }

        // Quad strip between each pair of neighbouring levels
        let n = vertices_per_level as u32;
        for level in 0..(level_count as u32 - 1) {
            for i in 0..(n - 1) {
                let a = level * n + i;
                let b = a + 1;
                let c = a + n;
                let d = c + 1;
                reference.add_triangle(a, c, b);
                reference.add_triangle(b, c, d);
            }
        }

        calculate_normals(&mut reference);

        tracing::info!(
            levels = level_count,
            vertices = reference.vertex_count(),
            triangles = reference.triangle_count(),
            "Built reference sail mesh"
        );

        Ok(Self {
            levels,
            vertices_per_level,
            reference,
        })
    }

    #[inline]
    pub fn levels(&self) -> &[MeshLevel] {
        &self.levels
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn vertices_per_level(&self) -> usize {
        self.vertices_per_level
    }

    /// The pristine flat mesh
    #[inline]
    pub fn reference(&self) -> &Mesh {
        &self.reference
    }

    #[inline]
    pub fn vertex_index(&self, level: usize, vertex: usize) -> usize {
        level * self.vertices_per_level + vertex
    }

    #[inline]
    pub fn reference_position(&self, level: usize, vertex: usize) -> Point3<f64> {
        self.reference.position(self.vertex_index(level, vertex))
    }
}
