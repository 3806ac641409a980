//! Physical projection plane (e.g. a monitor) in world space.
//!
//! Coordinates are right-handed: for a plane facing the viewer, `right`
//! runs along the bottom edge, `up` along the left edge and `normal =
//! right × up` points from the plane toward the viewer.

use nalgebra::{Isometry3, Point3, Vector3};

use crate::constants::{EPSILON, PLANE_TOLERANCE};
use crate::{Error, Result};

/// A rectangle in world space with a derived orthonormal basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionPlane {
    bottom_left: Point3<f64>,
    bottom_right: Point3<f64>,
    top_left: Point3<f64>,
    top_right: Point3<f64>,
    right: Vector3<f64>,
    up: Vector3<f64>,
    normal: Vector3<f64>,
}

impl ProjectionPlane {
    /// Build a plane from its four corners
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateGeometry` if an edge has zero length, the
    /// edges are not perpendicular, or the top-right corner does not
    /// complete the rectangle.
    pub fn new(
        bottom_left: Point3<f64>,
        bottom_right: Point3<f64>,
        top_left: Point3<f64>,
        top_right: Point3<f64>,
    ) -> Result<Self> {
        let width_edge = bottom_right - bottom_left;
        let height_edge = top_left - bottom_left;

        if width_edge.norm() < EPSILON || height_edge.norm() < EPSILON {
            return Err(Error::DegenerateGeometry(
                "Projection plane edges must have non-zero length".to_string(),
            ));
        }

        let right = width_edge.normalize();
        let up = height_edge.normalize();

        if right.dot(&up).abs() > PLANE_TOLERANCE {
            return Err(Error::DegenerateGeometry(format!(
                "Projection plane edges are not perpendicular (cos = {:.6})",
                right.dot(&up)
            )));
        }

        let expected_top_right = bottom_left + width_edge + height_edge;
        let mismatch = (top_right - expected_top_right).norm();
        if mismatch > PLANE_TOLERANCE {
            return Err(Error::DegenerateGeometry(format!(
                "Top-right corner is {mismatch:.6} m away from completing the rectangle"
            )));
        }

        let normal = right.cross(&up).normalize();

        Ok(Self {
            bottom_left,
            bottom_right,
            top_left,
            top_right,
            right,
            up,
            normal,
        })
    }

    /// Axis-aligned plane in the XY plane centered at `center`, facing +Z
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if width or height is not positive.
    pub fn from_center_size(center: Point3<f64>, width: f64, height: f64) -> Result<Self> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Plane size must be positive, got {width} x {height}"
            )));
        }

        let half_w = Vector3::new(width / 2.0, 0.0, 0.0);
        let half_h = Vector3::new(0.0, height / 2.0, 0.0);

        Self::new(
            center - half_w - half_h,
            center + half_w - half_h,
            center - half_w + half_h,
            center + half_w + half_h,
        )
    }

    /// Re-derive the plane after moving it by `transform`
    ///
    /// # Errors
    ///
    /// Propagates validation errors; a rigid transform of a valid plane
    /// stays valid.
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Result<Self> {
        Self::new(
            transform * self.bottom_left,
            transform * self.bottom_right,
            transform * self.top_left,
            transform * self.top_right,
        )
    }

    #[must_use]
    pub const fn bottom_left(&self) -> Point3<f64> {
        self.bottom_left
    }

    #[must_use]
    pub const fn bottom_right(&self) -> Point3<f64> {
        self.bottom_right
    }

    #[must_use]
    pub const fn top_left(&self) -> Point3<f64> {
        self.top_left
    }

    #[must_use]
    pub const fn top_right(&self) -> Point3<f64> {
        self.top_right
    }

    /// Unit vector along the bottom edge
    #[must_use]
    pub const fn right(&self) -> Vector3<f64> {
        self.right
    }

    /// Unit vector along the left edge
    #[must_use]
    pub const fn up(&self) -> Vector3<f64> {
        self.up
    }

    /// Unit normal pointing toward the viewer
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        (self.bottom_right - self.bottom_left).norm()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.top_left - self.bottom_left).norm()
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.bottom_left + (self.top_right - self.bottom_left) / 2.0
    }

    /// Distance of `point` from the plane along the normal; positive on the viewer side
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.bottom_left).dot(&self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn monitor() -> ProjectionPlane {
        ProjectionPlane::new(
            Point3::new(-0.3, -0.2, 0.0),
            Point3::new(0.3, -0.2, 0.0),
            Point3::new(-0.3, 0.2, 0.0),
            Point3::new(0.3, 0.2, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_basis() {
        let plane = monitor();
        assert_relative_eq!(plane.right(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(plane.up(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(plane.normal(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(plane.width(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(plane.height(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(plane.center(), Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn test_from_center_size_matches_corners() {
        let plane = ProjectionPlane::from_center_size(Point3::origin(), 0.6, 0.4).unwrap();
        let reference = monitor();
        assert_relative_eq!(plane.bottom_left(), reference.bottom_left(), epsilon = 1e-12);
        assert_relative_eq!(plane.top_right(), reference.top_right(), epsilon = 1e-12);
        assert!(ProjectionPlane::from_center_size(Point3::origin(), 0.0, 0.4).is_err());
    }

    #[test]
    fn test_rejects_non_rectangles() {
        // Skewed parallelogram
        let skewed = ProjectionPlane::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.2, 1.0, 0.0),
            Point3::new(1.2, 1.0, 0.0),
        );
        assert!(matches!(skewed, Err(Error::DegenerateGeometry(_))));

        // Fourth corner lifted off the plane
        let warped = ProjectionPlane::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.1),
        );
        assert!(warped.is_err());

        // Collapsed edge
        let collapsed = ProjectionPlane::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert!(collapsed.is_err());
    }

    #[test]
    fn test_transformed_plane() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2);
        let transform = Isometry3::from_parts(Translation3::new(1.0, 0.0, 0.0), rotation);
        let plane = monitor().transformed(&transform).unwrap();

        // Rotating +90° about Y turns +Z into +X
        assert_relative_eq!(plane.normal(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(plane.center(), Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_signed_distance() {
        let plane = monitor();
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.1, 0.1, 0.5)), 0.5, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, -0.25)), -0.25, epsilon = 1e-12);
    }
}
