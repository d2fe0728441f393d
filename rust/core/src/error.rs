// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for sail model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing rig and parameter types
///
/// Per-frame calculations never fail; they clamp instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid sail geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid rig limits: {0}")]
    InvalidLimits(String),

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl Error {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Error::InvalidGeometry(msg.into())
    }

    pub fn limits(msg: impl Into<String>) -> Self {
        Error::InvalidLimits(msg.into())
    }
}
