// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the replay host.

use std::path::PathBuf;

use thiserror::Error;

/// Host error types.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Scenario has no keyframes")]
    EmptyScenario,

    #[error("Scenario keyframes out of order at t = {0}")]
    UnorderedScenario(f64),

    #[error("Sail setup failed: {0}")]
    Geometry(#[from] sailtrim_geometry::Error),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
