// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SailTrim Core
//!
//! Sail section shape, wind shear and trim indicators for a sailboat
//! telemetry dashboard.
//!
//! ## Overview
//!
//! - **Shape model**: camber curve and shape metrics for a cunningham setting
//! - **Wind field**: power-law wind speed at any height above the waterline
//! - **Trim calculator**: camber, twist, reef level and line loads for the
//!   operator display
//!
//! Everything is a pure function of its inputs. Out-of-range inputs are
//! clamped rather than rejected, so per-frame calls never fail.
//!
//! ## Quick Start
//!
//! ```rust
//! use sailtrim_core::{compute_shape, compute_trim, wind_at_height};
//! use sailtrim_core::{Cunningham, Ratio, SailGeometrySpec, ShapeParams, TrimInput};
//!
//! let rig = SailGeometrySpec::default();
//! let shape = compute_shape(ShapeParams::from_geometry(&rig, Cunningham::new(4.0)));
//! assert!(shape.girth <= rig.chord_at_foot);
//!
//! let aloft = wind_at_height(8.0, 12.0, 0.14);
//! assert!(aloft > 8.0);
//!
//! let trim = compute_trim(&TrimInput {
//!     tws: 6.0,
//!     main_car: Ratio::new(0.4),
//!     ..TrimInput::default()
//! });
//! println!("reef {:?}, main sheet at {}", trim.reef_level, trim.tension_colors.main_sheet);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of rig configuration and trim output

pub mod error;
pub mod params;
pub mod rig;
pub mod shape;
pub mod trim;
pub mod units;
pub mod wind;

pub use error::{Error, Result};
pub use params::{Cunningham, Ratio};
pub use rig::{RigLimits, SailGeometrySpec};
pub use shape::{compute_shape, CurvePoint, SailShape, ShapeParams};
pub use trim::{
    compute_reef_level, compute_trim, tension_color, LineTensions, PointOfSail, ReefLevel, Rgb,
    TensionColors, TrimInput, TrimState,
};
pub use wind::{wind_at_height, wind_profile, WindSample};
