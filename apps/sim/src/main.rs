// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SailTrim Sim - headless telemetry replay.
//!
//! Replays a wind and control scenario through the sail deformers at a
//! fixed frame rate and prints one JSON line per frame on stdout. Logs go
//! to stderr.
//!
//! # Environment
//!
//! - `SAILTRIM_RIG` - rig JSON (built-in sloop mainsail when unset)
//! - `SAILTRIM_SCENARIO` - scenario JSON (built-in gust when unset)
//! - `SAILTRIM_FPS` - frame rate, default 30
//! - `SAILTRIM_TRIM_EVERY` - frames between trim refreshes, default 10
//! - `SAILTRIM_LOG_FORMAT` - `json` for structured stderr logs

use std::io::{BufWriter, Write};

use anyhow::Context;

mod config;
mod error;
mod rig;
mod runner;
mod scenario;

use config::Config;
use rig::RigFile;
use runner::Replay;
use scenario::Scenario;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Initialize logging
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sailtrim_geometry=debug,sailtrim_sim=debug".into());
    let logs = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    tracing::info!(
        rig = ?config.rig_path,
        scenario = ?config.scenario_path,
        fps = config.fps,
        trim_every = config.trim_every,
        log_json = config.log_json,
        "Starting SailTrim replay"
    );

    let rig = match &config.rig_path {
        Some(path) => RigFile::load(path)?,
        None => RigFile::default(),
    };
    let scenario = match &config.scenario_path {
        Some(path) => Scenario::load(path)?,
        None => Scenario::gust(),
    };

    let mut replay = Replay::new(rig, scenario, config).context("failed to rig sails")?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = replay.run(&mut out)?;
    out.flush()?;

    tracing::info!(frames, "Replay finished");
    Ok(())
}
