//! Off-axis projection against the screen geometry


use approx::assert_relative_eq;
use fishtank_stereo::projection::{frustum_matrix, generalized_perspective, off_axis_extents, off_axis_projection};
use fishtank_stereo::Error;
use nalgebra::{Point3, Vector4};
use proptest::prelude::*;
use test_helpers::test_plane;

#[test]
fn test_centered_eye_gives_symmetric_frustum() {
    let extents = off_axis_extents(&Point3::new(0.0, 0.0, 0.5), &test_plane(), 0.1, 10.0).unwrap();

    assert_relative_eq!(extents.left, -extents.right, epsilon = 1e-12);
    assert_relative_eq!(extents.bottom, -extents.top, epsilon = 1e-12);
    assert_relative_eq!(extents.right, 0.06, epsilon = 1e-12);
    assert_relative_eq!(extents.top, 0.04, epsilon = 1e-12);
    assert_relative_eq!(extents.near, 0.1);
    assert_relative_eq!(extents.far, 10.0);
}

#[test]
fn test_eye_offset_skews_frustum() {
    let plane = test_plane();
    let centered = off_axis_extents(&Point3::new(0.0, 0.0, 0.5), &plane, 0.1, 10.0).unwrap();

    let e = 0.1;
    let shifted = off_axis_extents(&Point3::new(e, 0.0, 0.5), &plane, 0.1, 10.0).unwrap();

    // Both horizontal bounds move by -e * n / d
    let shift = -e * 0.1 / 0.5;
    assert_relative_eq!(shifted.left, centered.left + shift, epsilon = 1e-12);
    assert_relative_eq!(shifted.right, centered.right + shift, epsilon = 1e-12);
    assert_relative_eq!(shifted.bottom, centered.bottom, epsilon = 1e-12);
    assert_relative_eq!(shifted.top, centered.top, epsilon = 1e-12);
    assert!(!shifted.is_symmetric(1e-9));
}

#[test]
fn test_projection_maps_screen_corners_to_ndc() {
    let plane = test_plane();
    let eye = Point3::new(0.12, -0.07, 0.45);
    let projection = off_axis_projection(&eye, &plane, 0.1, 10.0).unwrap();

    // Plane is aligned with the eye camera, so eye space is a translation
    let corners = [
        (plane.bottom_left(), -1.0, -1.0),
        (plane.bottom_right(), 1.0, -1.0),
        (plane.top_left(), -1.0, 1.0),
        (plane.top_right(), 1.0, 1.0),
    ];
    for (corner, ndc_x, ndc_y) in corners {
        let local = corner - eye;
        let clip = projection * Vector4::new(local.x, local.y, local.z, 1.0);
        assert_relative_eq!(clip.x / clip.w, ndc_x, epsilon = 1e-9);
        assert_relative_eq!(clip.y / clip.w, ndc_y, epsilon = 1e-9);
    }
}

#[test]
fn test_projection_matches_frustum_layout() {
    let eye = Point3::new(-0.05, 0.02, 0.6);
    let extents = off_axis_extents(&eye, &test_plane(), 0.2, 50.0).unwrap();
    let matrix = off_axis_projection(&eye, &test_plane(), 0.2, 50.0).unwrap();

    let expected = frustum_matrix(extents.left, extents.right, extents.bottom, extents.top, 0.2, 50.0);
    assert_relative_eq!(matrix, expected, epsilon = 1e-12);

    assert_relative_eq!(matrix[(0, 0)], 2.0 * 0.2 / (extents.right - extents.left), epsilon = 1e-12);
    assert_relative_eq!(matrix[(3, 2)], -1.0);
    assert_relative_eq!(matrix[(3, 3)], 0.0);
}

#[test]
fn test_eye_behind_plane_is_rejected() {
    let result = off_axis_projection(&Point3::new(0.0, 0.0, -0.5), &test_plane(), 0.1, 10.0);
    assert!(matches!(result, Err(Error::DegenerateGeometry(_))));

    let result = generalized_perspective(&Point3::new(0.0, 0.0, 0.0), &test_plane(), 0.1, 10.0);
    assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
}

proptest! {
    #[test]
    fn prop_matrix_is_finite_in_front_of_plane(
        x in -1.0f64..1.0,
        y in -1.0f64..1.0,
        z in 0.05f64..3.0,
    ) {
        let matrix = off_axis_projection(&Point3::new(x, y, z), &test_plane(), 0.1, 10.0).unwrap();
        prop_assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn prop_horizontal_shift_preserves_width(
        x in -0.5f64..0.5,
        z in 0.1f64..2.0,
    ) {
        let centered = off_axis_extents(&Point3::new(0.0, 0.0, z), &test_plane(), 0.1, 10.0).unwrap();
        let shifted = off_axis_extents(&Point3::new(x, 0.0, z), &test_plane(), 0.1, 10.0).unwrap();

        prop_assert!(((shifted.right - shifted.left) - (centered.right - centered.left)).abs() < 1e-12);
        prop_assert!((shifted.left - (centered.left - x * 0.1 / z)).abs() < 1e-12);
    }
}
