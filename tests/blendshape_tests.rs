//! Blendshape Rig Tests
//!
//! Tests for:
//! - Linear synthesis against the closed-form sum
//! - Exact neutral reproduction
//! - Coefficient length validation
//! - Named lookup and resolution

mod common;

use glam::Vec3;

use common::vec3_approx;
use facemesh::errors::FaceMeshError;
use facemesh::resources::BlendshapeRig;

/// Rows of the 3x3 identity.
fn eye3() -> Vec<Vec3> {
    vec![Vec3::X, Vec3::Y, Vec3::Z]
}

fn smile_blink_rig() -> BlendshapeRig {
    BlendshapeRig::new(
        vec![Vec3::ZERO; 3],
        vec![
            ("smile".to_string(), vec![Vec3::ONE; 3]),
            ("blink".to_string(), eye3()),
        ],
    )
    .unwrap()
}

fn irregular_rig() -> BlendshapeRig {
    BlendshapeRig::new(
        vec![
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(-1.0, 0.5, 2.0),
            Vec3::new(3.0, -0.25, 0.0),
            Vec3::new(0.0, 0.0, -4.0),
        ],
        vec![
            (
                "jawOpen".to_string(),
                vec![Vec3::new(0.0, -0.3, 0.1), Vec3::ZERO, Vec3::new(0.2, 0.2, 0.2), Vec3::NEG_Y],
            ),
            (
                "browUp".to_string(),
                vec![Vec3::Y, Vec3::new(0.5, 0.5, 0.0), Vec3::ZERO, Vec3::new(0.0, 0.1, 0.0)],
            ),
            (
                "cheekPuff".to_string(),
                vec![Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::new(1.0, 1.0, 1.0)],
            ),
        ],
    )
    .unwrap()
}

// ============================================================================
// Synthesis
// ============================================================================

#[test]
fn half_smile_is_half_ones() {
    let rig = smile_blink_rig();
    let out = rig.synthesize(&[0.5, 0.0]).unwrap();
    assert_eq!(out, vec![Vec3::splat(0.5); 3]);
}

#[test]
fn synthesis_matches_closed_form_sum() {
    let rig = irregular_rig();
    let coefficient_sets: [[f32; 3]; 4] = [
        [1.0, 0.0, 0.0],
        [0.25, 0.75, 0.5],
        [1.0, 1.0, 1.0],
        [-0.5, 2.0, 0.1],
    ];

    for coefficients in coefficient_sets {
        let out = rig.synthesize(&coefficients).unwrap();
        for (v, got) in out.iter().enumerate() {
            let mut expected = rig.neutral()[v];
            for (k, c) in coefficients.iter().enumerate() {
                expected += rig.delta(k).unwrap()[v] * *c;
            }
            assert!(vec3_approx(*got, expected), "{coefficients:?} vertex {v}: {got:?} vs {expected:?}");
        }
    }
}

#[test]
fn zero_coefficients_reproduce_neutral_exactly() {
    let rig = irregular_rig();
    let out = rig.synthesize(&[0.0; 3]).unwrap();
    assert_eq!(out, rig.neutral());
    assert_eq!(rig.reset(), rig.neutral());
}

#[test]
fn rig_does_not_clamp() {
    let rig = smile_blink_rig();
    let out = rig.synthesize(&[2.0, -1.0]).unwrap();
    assert_eq!(out[0], Vec3::new(1.0, 2.0, 2.0));
}

#[test]
fn wrong_coefficient_count_is_rejected() {
    let rig = smile_blink_rig();
    let err = rig.synthesize(&[0.5]).unwrap_err();
    assert!(matches!(
        err,
        FaceMeshError::CoefficientLengthMismatch { expected: 2, actual: 1 }
    ));
}

#[test]
fn synthesize_into_rejects_wrong_output_length() {
    let rig = smile_blink_rig();
    let mut out = vec![Vec3::ZERO; 2];
    let err = rig.synthesize_into(&[0.0, 0.0], &mut out).unwrap_err();
    assert!(matches!(err, FaceMeshError::ShapeMismatch { expected: 3, actual: 2, .. }));
}

// ============================================================================
// Construction & lookup
// ============================================================================

#[test]
fn delta_with_wrong_vertex_count_is_rejected() {
    let err = BlendshapeRig::new(vec![Vec3::ZERO; 3], vec![("smile".to_string(), vec![Vec3::ONE; 2])])
        .unwrap_err();
    assert!(matches!(err, FaceMeshError::ShapeMismatch { expected: 3, actual: 2, .. }));
}

#[test]
fn names_keep_construction_order() {
    let rig = irregular_rig();
    assert_eq!(rig.n_blendshapes(), 3);
    assert_eq!(rig.names(), &["jawOpen", "browUp", "cheekPuff"]);
    assert_eq!(rig.index_of("browUp").unwrap(), 1);
}

#[test]
fn unknown_name_lookup_fails_recoverably() {
    let rig = smile_blink_rig();
    let err = rig.index_of("nonexistent").unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, FaceMeshError::UnknownBlendshape(name) if name == "nonexistent"));
}

#[test]
fn rig_from_full_targets_subtracts_neutral() {
    let neutral = vec![Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 0.0, -1.0)];
    let target = vec![Vec3::new(1.0, 2.0, 1.0), Vec3::new(2.0, 0.0, -3.0)];
    let rig = BlendshapeRig::from_target_meshes(neutral, vec![("pose".to_string(), target.clone())]).unwrap();

    assert_eq!(rig.delta(0).unwrap(), &[Vec3::Y, Vec3::new(0.0, 0.0, -2.0)][..]);
    assert_eq!(rig.synthesize(&[1.0]).unwrap(), target);
}
