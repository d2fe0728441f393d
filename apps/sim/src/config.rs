// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host configuration loaded from environment variables.

use std::path::PathBuf;

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Rig description (JSON). Built-in 35 ft sloop when unset.
    pub rig_path: Option<PathBuf>,
    /// Telemetry scenario (JSON). Built-in gust when unset.
    pub scenario_path: Option<PathBuf>,
    /// Render-loop frame rate.
    pub fps: u32,
    /// Frames between trim indicator refreshes.
    pub trim_every: u32,
    /// Emit stderr logs as JSON objects instead of text.
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            rig_path: lookup("SAILTRIM_RIG")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            scenario_path: lookup("SAILTRIM_SCENARIO")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            fps: lookup("SAILTRIM_FPS")
                .and_then(|v| v.parse().ok())
                .filter(|&fps| fps > 0)
                .unwrap_or(30),
            trim_every: lookup("SAILTRIM_TRIM_EVERY")
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(10),
            log_json: lookup("SAILTRIM_LOG_FORMAT")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("json")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
