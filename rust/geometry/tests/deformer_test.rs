// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame-level behaviour of the sail deformer.

use approx::assert_abs_diff_eq;
use sailtrim_core::{Cunningham, RigLimits, SailGeometrySpec};
use sailtrim_geometry::{DeformerConfig, SailControls, SailDeformer, SailMesh};

fn beat(awa: f64) -> SailControls {
    SailControls {
        awa,
        aws: 9.0,
        angle_of_attack_deg: 12.0,
        cunningham: Cunningham::new(5.0),
        shear_exponent: 0.27,
    }
}

#[test]
fn test_reference_mesh_is_deterministic() {
    let spec = SailGeometrySpec::default();
    let a = SailMesh::build(&spec, 12, 4).unwrap();
    let b = SailMesh::build(&spec, 12, 4).unwrap();
    let bits = |m: &SailMesh| m.reference().positions.iter().map(|p| p.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.reference().indices, b.reference().indices);
}

#[test]
fn test_chord_rotation_steps_stay_bounded() {
    let config = DeformerConfig {
        limits: RigLimits {
            max_mast_rotation: 0.3,
            max_chord_rotation_per_level: 0.02,
        },
        ..DeformerConfig::default()
    };
    let mut deformer = SailDeformer::new(config).unwrap();
    for awa in [0.0, 0.3, 0.9, 1.6, -2.4, 3.1] {
        deformer.update(&beat(awa));
        let samples = deformer.level_samples();
        assert_eq!(samples.len(), deformer.sail_mesh().level_count());
        assert!(samples[0].chord_rotation <= 0.02 + 1e-12);
        for w in samples.windows(2) {
            let step = w[1].chord_rotation - w[0].chord_rotation;
            assert!(step <= 0.02 + 1e-12, "step {} at awa {}", step, awa);
            assert!(step >= -1e-12);
        }
    }

    // Mast pinned at its limit, so the limit is what shapes the twist
    deformer.update(&beat(1.6));
    let samples = deformer.level_samples();
    let foot = samples[0].chord_rotation;
    let head = samples[samples.len() - 1].chord_rotation;
    assert_abs_diff_eq!(foot, 0.02, epsilon = 1e-12);
    assert!(head - foot > 0.3, "twist {}", head - foot);
    assert!(samples
        .windows(2)
        .any(|w| (w[1].chord_rotation - w[0].chord_rotation - 0.02).abs() < 1e-12));
}

#[test]
fn test_step_limit_shapes_the_sail() {
    let tight = DeformerConfig {
        limits: RigLimits {
            max_chord_rotation_per_level: 0.0,
            ..RigLimits::default()
        },
        ..DeformerConfig::default()
    };
    let loose = DeformerConfig {
        limits: RigLimits {
            max_chord_rotation_per_level: 1.0,
            ..RigLimits::default()
        },
        ..DeformerConfig::default()
    };
    let mut a = SailDeformer::new(tight).unwrap();
    let mut b = SailDeformer::new(loose).unwrap();
    a.update(&beat(0.9));
    b.update(&beat(0.9));
    assert_ne!(a.positions(), b.positions());
}

#[test]
fn test_wind_gradient_twists_the_head_off() {
    let mut sheared = SailDeformer::new(DeformerConfig::default()).unwrap();
    let mut uniform = SailDeformer::new(DeformerConfig::default()).unwrap();
    sheared.update(&beat(0.9));
    uniform.update(&SailControls {
        shear_exponent: 0.0,
        ..beat(0.9)
    });

    let twist = |d: &SailDeformer| {
        let samples = d.level_samples();
        samples[samples.len() - 1].chord_rotation - samples[0].chord_rotation
    };
    assert!(twist(&sheared) > twist(&uniform) + 0.1);
    assert!(uniform.level_samples().iter().all(|s| s.wind_twist == 0.0));

    let mesh = sheared.sail_mesh();
    let head_leech = mesh.vertex_index(mesh.level_count() - 1, mesh.vertices_per_level() - 1) * 3;
    assert_ne!(
        &sheared.positions()[head_leech..head_leech + 3],
        &uniform.positions()[head_leech..head_leech + 3]
    );
}

#[test]
fn test_wind_increases_up_the_sail() {
    let mut deformer = SailDeformer::new(DeformerConfig::default()).unwrap();
    deformer.update(&beat(0.8));
    let samples = deformer.level_samples();
    for w in samples.windows(2) {
        assert!(w[1].wind_speed >= w[0].wind_speed);
        assert!(w[1].height > w[0].height);
        assert_eq!(w[1].chord_angle, w[0].chord_angle);
    }
}

#[test]
fn test_no_drift_over_many_frames() {
    let mut deformer = SailDeformer::new(DeformerConfig::default()).unwrap();
    deformer.update(&beat(0.7));
    let first = deformer.positions().to_vec();

    for frame in 0..2000 {
        let awa = 0.7 + 0.4 * (frame as f64 * 0.05).sin();
        deformer.update(&beat(awa));
    }
    deformer.update(&beat(0.7));
    assert_eq!(deformer.positions(), first.as_slice());
}

#[test]
fn test_tacks_mirror_across_centreline() {
    let mut starboard = SailDeformer::new(DeformerConfig::default()).unwrap();
    let mut port = SailDeformer::new(DeformerConfig::default()).unwrap();
    starboard.update(&beat(0.75));
    port.update(&beat(-0.75));

    for (s, p) in starboard
        .positions()
        .chunks_exact(3)
        .zip(port.positions().chunks_exact(3))
    {
        assert_abs_diff_eq!(s[0], p[0], epsilon = 1e-4);
        assert_abs_diff_eq!(s[1], p[1], epsilon = 1e-6);
        assert_abs_diff_eq!(s[2], -p[2], epsilon = 1e-4);
    }
    assert_abs_diff_eq!(starboard.mast_rotation(), -port.mast_rotation(), epsilon = 1e-12);
}

#[test]
fn test_independent_instances() {
    let jib_config = DeformerConfig {
        geometry: SailGeometrySpec {
            chord_at_foot: 2800.0,
            chord_at_mast_top: 120.0,
            mast_width: 40.0,
            sail_height: 11000.0,
            ..SailGeometrySpec::default()
        },
        ..DeformerConfig::default()
    };
    let mut main = SailDeformer::new(DeformerConfig::default()).unwrap();
    let mut jib = SailDeformer::new(jib_config).unwrap();

    main.update(&beat(0.7));
    let main_alone = main.positions().to_vec();

    let mut main_again = SailDeformer::new(DeformerConfig::default()).unwrap();
    jib.update(&beat(-1.2));
    main_again.update(&beat(0.7));
    assert_eq!(main_again.positions(), main_alone.as_slice());
    assert!(jib.mast_rotation() < 0.0);
}

#[test]
fn test_degenerate_curve_keeps_frame_stable() {
    // Mast entry lands past the end of the curve
    let config = DeformerConfig {
        geometry: SailGeometrySpec {
            chord_at_mast_top: 100.0,
            mast_width: 150.0,
            ..SailGeometrySpec::default()
        },
        ..DeformerConfig::default()
    };
    let mut deformer = SailDeformer::new(config).unwrap();
    deformer.update(&beat(0.9));
    assert!(deformer.shape().unwrap().mast_entry_angle.is_none());
    assert!(deformer.positions().iter().all(|p| p.is_finite()));

    // Mast eats the whole section, no vertex angles at all
    let config = DeformerConfig {
        geometry: SailGeometrySpec {
            mast_width: 3499.0,
            ..SailGeometrySpec::default()
        },
        ..DeformerConfig::default()
    };
    let mut deformer = SailDeformer::new(config).unwrap();
    let eased = SailControls {
        cunningham: Cunningham::new(11.0),
        ..beat(0.9)
    };
    deformer.update(&eased);
    let shape = deformer.shape().unwrap();
    assert!(shape.vertices_angles_for_level(12, 3499.0, None).is_empty());
    assert!(deformer.positions().iter().all(|p| p.is_finite()));
    assert!(deformer.live_mesh().normals.iter().all(|n| n.is_finite()));
}

#[test]
fn test_node_rotation_tracks_mast_rotation() {
    let mut deformer = SailDeformer::new(DeformerConfig::default()).unwrap();
    for awa in [0.4, 0.9, -0.6, 2.0, 0.1] {
        let summary = deformer.update(&beat(awa));
        // Deltas accumulate back to the absolute mast rotation
        assert_abs_diff_eq!(summary.node_rotation, summary.mast_rotation, epsilon = 1e-12);
    }
    let rotation = deformer.node_rotation();
    assert_abs_diff_eq!(rotation.angle(), deformer.node_rotation_angle().abs(), epsilon = 1e-9);
}
