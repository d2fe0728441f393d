// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SailTrim Geometry
//!
//! Reference sail mesh construction and per-frame deformation, using
//! nalgebra for points and rotations.

pub mod deformer;
pub mod error;
pub mod mesh;
pub mod sail_mesh;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Rotation3, Vector3};

pub use deformer::{DeformerConfig, DeformerState, FrameSummary, LevelSample, SailControls, SailDeformer};
pub use error::{Error, Result};
pub use mesh::{calculate_normals, Mesh};
pub use sail_mesh::{MeshLevel, SailMesh};
