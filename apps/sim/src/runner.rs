// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-rate replay of a scenario through the sail deformers.
//!
//! Every frame updates the mainsail (and the jib, when rigged). The trim
//! indicators run on their own slower cadence, every `trim_every` frames;
//! in between, each line repeats the latest trim summary.

use std::io::Write;

use sailtrim_core::{compute_trim, TrimState};
use sailtrim_geometry::{DeformerConfig, SailDeformer};
use serde::Serialize;

use crate::config::Config;
use crate::error::SimError;
use crate::rig::RigFile;
use crate::scenario::Scenario;

/// Deformed state of one sail after a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SailReport {
    pub mast_rotation: f64,
    pub node_rotation: f64,
    /// Chord rotation of the head level, radians
    pub head_chord_rotation: f64,
    /// Leech vertex of the head level, metres in sail space
    pub leech_tip: [f32; 3],
}

/// One output line
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub t: f64,
    pub heading: f64,
    pub main: SailReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jib: Option<SailReport>,
    /// Latest trim summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimState>,
    /// Whether `trim` was recomputed on this frame
    pub trim_refreshed: bool,
}

pub struct Replay {
    config: Config,
    scenario: Scenario,
    main: SailDeformer,
    jib: Option<SailDeformer>,
    latest_trim: Option<TrimState>,
}

fn build_sail(name: &str, config: DeformerConfig) -> Result<SailDeformer, SimError> {
    let deformer = SailDeformer::new(config)?;
    tracing::debug!(
        sail = name,
        levels = deformer.sail_mesh().level_count(),
        vertices = deformer.live_mesh().vertex_count(),
        "Rigged sail"
    );
    Ok(deformer)
}

fn report(deformer: &SailDeformer) -> SailReport {
    let mesh = deformer.sail_mesh();
    let head = mesh.level_count() - 1;
    let leech = mesh.vertex_index(head, mesh.vertices_per_level() - 1) * 3;
    let positions = deformer.positions();
    SailReport {
        mast_rotation: deformer.mast_rotation(),
        node_rotation: deformer.node_rotation_angle(),
        head_chord_rotation: deformer
            .level_samples()
            .last()
            .map_or(0.0, |sample| sample.chord_rotation),
        leech_tip: [positions[leech], positions[leech + 1], positions[leech + 2]],
    }
}

impl Replay {
    pub fn new(rig: RigFile, scenario: Scenario, config: Config) -> Result<Self, SimError> {
        let main = build_sail("main", rig.main)?;
        let jib = rig.jib.map(|jib| build_sail("jib", jib)).transpose()?;
        Ok(Self {
            config,
            scenario,
            main,
            jib,
            latest_trim: None,
        })
    }

    /// Frames needed to cover the scenario, both ends included
    pub fn frame_count(&self) -> u64 {
        (self.scenario.duration() * self.config.fps as f64).floor() as u64 + 1
    }

    /// Advance the sails to `frame`
    pub fn step(&mut self, frame: u64) -> FrameReport {
        let t = frame as f64 / self.config.fps as f64;
        let sample = self.scenario.sample(t);
        let controls = sample.sail_controls();

        self.main.update(&controls);
        if let Some(jib) = self.jib.as_mut() {
            jib.update(&controls);
        }

        let trim_refreshed = frame % self.config.trim_every as u64 == 0;
        if trim_refreshed {
            let state = compute_trim(&sample.trim_input());
            tracing::trace!(frame, reef = state.reef_level.index(), "Trim refreshed");
            self.latest_trim = Some(state);
        }

        FrameReport {
            frame,
            t,
            heading: sample.heading,
            main: report(&self.main),
            jib: self.jib.as_ref().map(report),
            trim: self.latest_trim,
            trim_refreshed,
        }
    }

    /// Replay the whole scenario, one JSON line per frame
    pub fn run(&mut self, mut out: impl Write) -> Result<u64, SimError> {
        let frames = self.frame_count();
        for frame in 0..frames {
            let report = self.step(frame);
            serde_json::to_writer(&mut out, &report)?;
            out.write_all(b"\n")?;
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Keyframe;
    use approx::assert_abs_diff_eq;

    fn config() -> Config {
        Config {
            fps: 10,
            trim_every: 5,
            ..Config::default()
        }
    }

    fn sloop() -> RigFile {
        RigFile {
            jib: Some(DeformerConfig::default()),
            ..RigFile::default()
        }
    }

    #[test]
    fn test_frame_count_covers_scenario() {
        let replay = Replay::new(RigFile::default(), Scenario::gust(), config()).unwrap();
        assert_eq!(replay.frame_count(), 201);
    }

    #[test]
    fn test_trim_cadence() {
        let mut replay = Replay::new(sloop(), Scenario::gust(), config()).unwrap();
        let reports: Vec<_> = (0..12).map(|f| replay.step(f)).collect();
        let trimmed: Vec<u64> = reports
            .iter()
            .filter(|r| r.trim_refreshed)
            .map(|r| r.frame)
            .collect();
        assert_eq!(trimmed, vec![0, 5, 10]);
        assert!(reports.iter().all(|r| r.jib.is_some() && r.trim.is_some()));
        assert_eq!(reports[3].trim, reports[0].trim);
    }

    #[test]
    fn test_node_follows_mast() {
        let mut replay = Replay::new(RigFile::default(), Scenario::gust(), config()).unwrap();
        for frame in 0..30 {
            let report = replay.step(frame);
            assert_abs_diff_eq!(report.main.node_rotation, report.main.mast_rotation, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tack_mirrors_leech() {
        let starboard = Keyframe::default();
        let port = Keyframe {
            awa: -starboard.awa,
            twa: -starboard.twa,
            ..starboard
        };
        let mut a = Replay::new(RigFile::default(), Scenario::new(vec![starboard]).unwrap(), config()).unwrap();
        let mut b = Replay::new(RigFile::default(), Scenario::new(vec![port]).unwrap(), config()).unwrap();
        let ra = a.step(0);
        let rb = b.step(0);
        assert_abs_diff_eq!(ra.main.leech_tip[0], rb.main.leech_tip[0], epsilon = 1e-4);
        assert_abs_diff_eq!(ra.main.leech_tip[2], -rb.main.leech_tip[2], epsilon = 1e-4);
        assert_abs_diff_eq!(ra.main.mast_rotation, -rb.main.mast_rotation, epsilon = 1e-12);
    }

    #[test]
    fn test_run_writes_json_lines() {
        let scenario = Scenario::new(vec![
            Keyframe::default(),
            Keyframe {
                t: 1.0,
                tws: 15.0,
                ..Keyframe::default()
            },
        ])
        .unwrap();
        let mut replay = Replay::new(RigFile::default(), scenario, config()).unwrap();
        let mut out = Vec::new();
        let frames = replay.run(&mut out).unwrap();
        assert_eq!(frames, 11);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1]["trim_refreshed"], false);
        assert_eq!(lines[1]["trim"], lines[0]["trim"]);
        assert!(lines[0].get("jib").is_none());
        assert_eq!(lines[10]["trim"]["reef_level"], 2);
        assert_eq!(lines[10]["frame"], 10);
    }
}
