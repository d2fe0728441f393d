// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for sail mesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a sail mesh
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mesh layout: {0}")]
    InvalidMeshLayout(String),

    #[error("Rig configuration error: {0}")]
    Core(#[from] sailtrim_core::Error),
}
