//! Off-axis (asymmetric frustum) projection for a fixed physical screen.
//!
//! Follows Kooima, "Generalized Perspective Projection" (2009). Matrices use
//! the OpenGL clip-space convention (camera looks down −Z, depth maps to
//! [−1, 1]), the same layout as `glFrustum`.

use nalgebra::{Matrix4, Point3, Translation3};

use crate::constants::MIN_PLANE_DISTANCE;
use crate::projection_plane::ProjectionPlane;
use crate::{Error, Result};

/// Frustum bounds measured on the near clip plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumExtents {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
}

impl FrustumExtents {
    /// Whether the frustum is centered on the view axis within `epsilon`
    #[must_use]
    pub fn is_symmetric(&self, epsilon: f64) -> bool {
        (self.left + self.right).abs() <= epsilon && (self.bottom + self.top).abs() <= epsilon
    }

    /// Perspective matrix for these bounds
    #[must_use]
    pub fn to_matrix(&self) -> Matrix4<f64> {
        frustum_matrix(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }
}

fn validate_clip_planes(near: f64, far: f64) -> Result<()> {
    if !(near.is_finite() && far.is_finite() && near > 0.0 && far > near) {
        return Err(Error::InvalidInput(format!(
            "Clip planes must satisfy 0 < near < far, got near={near}, far={far}"
        )));
    }
    Ok(())
}

/// Frustum bounds for an eye looking through `plane`.
///
/// Assumes the eye camera is oriented with the plane basis (camera right =
/// plane right, camera up = plane up), which is how the stereo rig is used.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for invalid clip planes and
/// `Error::DegenerateGeometry` when the eye is on or behind the plane.
pub fn off_axis_extents(eye: &Point3<f64>, plane: &ProjectionPlane, near: f64, far: f64) -> Result<FrustumExtents> {
    validate_clip_planes(near, far)?;

    let va = plane.bottom_left() - eye;
    let vb = plane.bottom_right() - eye;
    let vc = plane.top_left() - eye;

    let vr = plane.right();
    let vu = plane.up();
    let vn = plane.normal();

    let distance = -va.dot(&vn);
    if !distance.is_finite() || distance <= MIN_PLANE_DISTANCE {
        return Err(Error::DegenerateGeometry(format!(
            "Eye is {distance:.6} m in front of the projection plane"
        )));
    }

    let scale = near / distance;

    Ok(FrustumExtents {
        left: vr.dot(&va) * scale,
        right: vr.dot(&vb) * scale,
        bottom: vu.dot(&va) * scale,
        top: vu.dot(&vc) * scale,
        near,
        far,
    })
}

/// Off-axis projection matrix for an eye looking through `plane`
///
/// # Errors
///
/// See [`off_axis_extents`].
pub fn off_axis_projection(eye: &Point3<f64>, plane: &ProjectionPlane, near: f64, far: f64) -> Result<Matrix4<f64>> {
    Ok(off_axis_extents(eye, plane, near, far)?.to_matrix())
}

/// Full generalized perspective `P · Mᵀ · T`, valid for any plane orientation.
///
/// Unlike [`off_axis_projection`] this folds the plane basis rotation and
/// the eye translation into the matrix, so it maps world coordinates
/// straight to clip space.
///
/// # Errors
///
/// See [`off_axis_extents`].
pub fn generalized_perspective(
    eye: &Point3<f64>,
    plane: &ProjectionPlane,
    near: f64,
    far: f64,
) -> Result<Matrix4<f64>> {
    let projection = off_axis_projection(eye, plane, near, far)?;

    let vr = plane.right();
    let vu = plane.up();
    let vn = plane.normal();

    #[rustfmt::skip]
    let basis = Matrix4::new(
        vr.x, vr.y, vr.z, 0.0,
        vu.x, vu.y, vu.z, 0.0,
        vn.x, vn.y, vn.z, 0.0,
        0.0,  0.0,  0.0,  1.0,
    );

    let translation = Translation3::new(-eye.x, -eye.y, -eye.z).to_homogeneous();

    Ok(projection * basis * translation)
}

/// Perspective matrix for an arbitrary frustum, as `glFrustum`
#[must_use]
#[rustfmt::skip]
pub fn frustum_matrix(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Matrix4<f64> {
    let x = 2.0 * near / (right - left);
    let y = 2.0 * near / (top - bottom);
    let a = (right + left) / (right - left);
    let b = (top + bottom) / (top - bottom);
    let c = -(far + near) / (far - near);
    let d = -(2.0 * far * near) / (far - near);

    Matrix4::new(
        x,   0.0, a,    0.0,
        0.0, y,   b,    0.0,
        0.0, 0.0, c,    d,
        0.0, 0.0, -1.0, 0.0,
    )
}

/// Symmetric perspective matrix from a vertical field of view (radians)
#[must_use]
pub fn symmetric_perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Matrix4<f64> {
    let top = near * (fov_y / 2.0).tan();
    let right = top * aspect;
    frustum_matrix(-right, right, -top, top, near, far)
}
