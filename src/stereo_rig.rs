//! Two-eye camera rig driven by a tracked head pose.
//!
//! Each update places the eyes ±IPD/2 along the rig's right axis with the
//! rig's rotation (parallel cameras, no toe-in) and recomputes each eye's
//! projection: off-axis through the projection plane when one is configured,
//! symmetric perspective otherwise.

use log::{debug, info, warn};
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};

use crate::constants::{DEFAULT_ASPECT, DEFAULT_FAR_CLIP, DEFAULT_FIELD_OF_VIEW, DEFAULT_IPD, DEFAULT_NEAR_CLIP};
use crate::projection::{off_axis_projection, symmetric_perspective};
use crate::projection_plane::ProjectionPlane;
use crate::{Error, Result};

/// Position + orientation in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with identity rotation
    #[must_use]
    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Local +X in world space
    #[must_use]
    pub fn right(&self) -> Vector3<f64> {
        self.rotation * Vector3::x()
    }

    /// Local +Y in world space
    #[must_use]
    pub fn up(&self) -> Vector3<f64> {
        self.rotation * Vector3::y()
    }

    /// Viewing direction (local −Z) in world space
    #[must_use]
    pub fn forward(&self) -> Vector3<f64> {
        self.rotation * -Vector3::z()
    }

    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation)
    }

    /// World-to-camera transform
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4<f64> {
        self.to_isometry().inverse().to_homogeneous()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Point3::origin())
    }
}

/// Which eye
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Direction of the eye offset along the rig's right axis
    #[must_use]
    pub const fn side(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// How an eye's projection was produced on the last update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Default symmetric perspective
    Symmetric,
    /// Off-axis frustum through the projection plane
    OffAxis,
    /// Previous matrix kept because the geometry was degenerate
    Held,
}

/// One eye camera: clip planes, fallback lens and current outputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeCamera {
    pub near: f64,
    pub far: f64,
    /// Vertical field of view in degrees, used for the symmetric projection
    pub field_of_view: f64,
    /// Width / height
    pub aspect: f64,
    pose: Pose,
    projection: Matrix4<f64>,
    mode: ProjectionMode,
}

impl EyeCamera {
    /// Create an eye camera with a symmetric projection
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the clip planes, field of view or
    /// aspect ratio are out of range.
    pub fn new(near: f64, far: f64, field_of_view: f64, aspect: f64) -> Result<Self> {
        if !(near.is_finite() && far.is_finite() && near > 0.0 && far > near) {
            return Err(Error::InvalidInput(format!(
                "Clip planes must satisfy 0 < near < far, got near={near}, far={far}"
            )));
        }
        if !(field_of_view > 0.0 && field_of_view < 180.0) {
            return Err(Error::InvalidInput(format!(
                "Field of view must be in (0, 180) degrees, got {field_of_view}"
            )));
        }
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(Error::InvalidInput(format!("Aspect ratio must be positive, got {aspect}")));
        }

        let mut camera = Self {
            near,
            far,
            field_of_view,
            aspect,
            pose: Pose::default(),
            projection: Matrix4::identity(),
            mode: ProjectionMode::Symmetric,
        };
        camera.reset_projection();
        Ok(camera)
    }

    /// Revert to the symmetric perspective projection
    pub fn reset_projection(&mut self) {
        self.projection = self.symmetric_projection();
        self.mode = ProjectionMode::Symmetric;
    }

    /// Symmetric perspective for this camera's lens
    #[must_use]
    pub fn symmetric_projection(&self) -> Matrix4<f64> {
        symmetric_perspective(self.field_of_view.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    #[must_use]
    pub const fn projection(&self) -> Matrix4<f64> {
        self.projection
    }

    #[must_use]
    pub const fn mode(&self) -> ProjectionMode {
        self.mode
    }
}

impl Default for EyeCamera {
    fn default() -> Self {
        let near = DEFAULT_NEAR_CLIP;
        let far = DEFAULT_FAR_CLIP;
        let mut camera = Self {
            near,
            far,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            aspect: DEFAULT_ASPECT,
            pose: Pose::default(),
            projection: Matrix4::identity(),
            mode: ProjectionMode::Symmetric,
        };
        camera.reset_projection();
        camera
    }
}

/// Per-eye outputs of one rig update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigFrame {
    pub rig: Pose,
    pub left: EyeCamera,
    pub right: EyeCamera,
}

impl RigFrame {
    #[must_use]
    pub const fn eye(&self, eye: Eye) -> &EyeCamera {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

/// Stereo camera rig
pub struct StereoRig {
    ipd: f64,
    use_off_axis: bool,
    plane: Option<ProjectionPlane>,
    left: EyeCamera,
    right: EyeCamera,
    warned_missing_plane: bool,
}

impl StereoRig {
    /// Create a rig with two eye cameras
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `ipd` is not positive and finite.
    pub fn new(ipd: f64, left: EyeCamera, right: EyeCamera) -> Result<Self> {
        validate_ipd(ipd)?;
        info!("Creating stereo rig with IPD {ipd:.4} m");
        Ok(Self {
            ipd,
            use_off_axis: true,
            plane: None,
            left,
            right,
            warned_missing_plane: false,
        })
    }

    /// Attach a projection plane
    #[must_use]
    pub fn with_plane(mut self, plane: ProjectionPlane) -> Self {
        self.plane = Some(plane);
        self
    }

    /// Replace or remove the projection plane
    pub fn set_plane(&mut self, plane: Option<ProjectionPlane>) {
        self.plane = plane;
        self.warned_missing_plane = false;
    }

    #[must_use]
    pub const fn plane(&self) -> Option<&ProjectionPlane> {
        self.plane.as_ref()
    }

    /// Enable or disable off-axis projection
    pub fn set_use_off_axis(&mut self, use_off_axis: bool) {
        self.use_off_axis = use_off_axis;
    }

    #[must_use]
    pub const fn use_off_axis(&self) -> bool {
        self.use_off_axis
    }

    /// Change the inter-pupillary distance
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `ipd` is not positive and finite.
    pub fn set_ipd(&mut self, ipd: f64) -> Result<()> {
        validate_ipd(ipd)?;
        self.ipd = ipd;
        Ok(())
    }

    #[must_use]
    pub const fn ipd(&self) -> f64 {
        self.ipd
    }

    #[must_use]
    pub const fn eye(&self, eye: Eye) -> &EyeCamera {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    /// Reposition both eyes around `rig` and recompute their projections
    pub fn update(&mut self, rig: &Pose) -> RigFrame {
        let half_ipd = self.ipd * 0.5;
        let right_axis = rig.right();

        for eye in [Eye::Left, Eye::Right] {
            let camera = match eye {
                Eye::Left => &mut self.left,
                Eye::Right => &mut self.right,
            };
            camera.pose = Pose::new(rig.position + right_axis * (eye.side() * half_ipd), rig.rotation);
        }

        match (self.use_off_axis, self.plane) {
            (true, Some(plane)) => {
                Self::update_off_axis(&mut self.left, Eye::Left, &plane);
                Self::update_off_axis(&mut self.right, Eye::Right, &plane);
            }
            (use_off_axis, _) => {
                if use_off_axis && !self.warned_missing_plane {
                    warn!("Off-axis projection enabled but no projection plane is set; using symmetric projection");
                    self.warned_missing_plane = true;
                }
                self.left.reset_projection();
                self.right.reset_projection();
            }
        }

        RigFrame {
            rig: *rig,
            left: self.left,
            right: self.right,
        }
    }

    fn update_off_axis(camera: &mut EyeCamera, eye: Eye, plane: &ProjectionPlane) {
        match off_axis_projection(&camera.pose.position, plane, camera.near, camera.far) {
            Ok(projection) if projection.iter().all(|v| v.is_finite()) => {
                camera.projection = projection;
                camera.mode = ProjectionMode::OffAxis;
            }
            Ok(_) => {
                warn!("{eye:?} eye produced a non-finite projection; keeping previous matrix");
                camera.mode = ProjectionMode::Held;
            }
            Err(e) => {
                warn!("{eye:?} eye: {e}; keeping previous matrix");
                camera.mode = ProjectionMode::Held;
            }
        }
        debug!("{eye:?} eye at {:?} mode {:?}", camera.pose.position, camera.mode);
    }
}

impl Default for StereoRig {
    fn default() -> Self {
        Self {
            ipd: DEFAULT_IPD,
            use_off_axis: true,
            plane: None,
            left: EyeCamera::default(),
            right: EyeCamera::default(),
            warned_missing_plane: false,
        }
    }
}

fn validate_ipd(ipd: f64) -> Result<()> {
    if ipd.is_finite() && ipd > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("IPD must be positive, got {ipd}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn monitor() -> ProjectionPlane {
        ProjectionPlane::from_center_size(Point3::origin(), 0.6, 0.4).unwrap()
    }

    fn rig() -> StereoRig {
        let eye = EyeCamera::new(0.1, 10.0, 60.0, 1.5).unwrap();
        StereoRig::new(0.064, eye, eye).unwrap().with_plane(monitor())
    }

    #[test]
    fn test_eyes_are_symmetric_about_rig() {
        let mut rig = rig();
        let rotation = UnitQuaternion::from_euler_angles(0.1, -0.3, 0.2);
        let pose = Pose::new(Point3::new(0.1, 0.2, 0.7), rotation);

        let frame = rig.update(&pose);

        let offset = pose.right() * 0.032;
        assert_relative_eq!(frame.left.pose().position, pose.position - offset, epsilon = 1e-12);
        assert_relative_eq!(frame.right.pose().position, pose.position + offset, epsilon = 1e-12);
        assert_eq!(frame.left.pose().rotation, rotation);
        assert_eq!(frame.right.pose().rotation, rotation);
    }

    #[test]
    fn test_off_axis_skews_per_eye() {
        let mut rig = rig();
        let frame = rig.update(&Pose::at(Point3::new(0.0, 0.0, 0.5)));

        assert_eq!(frame.left.mode(), ProjectionMode::OffAxis);
        assert_eq!(frame.right.mode(), ProjectionMode::OffAxis);

        // Left eye sits left of center, so its frustum skews right: m[(0, 2)] > 0
        assert!(frame.left.projection()[(0, 2)] > 0.0);
        assert!(frame.right.projection()[(0, 2)] < 0.0);
        assert_relative_eq!(
            frame.left.projection()[(0, 2)],
            -frame.right.projection()[(0, 2)],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_toggle_falls_back_to_symmetric() {
        let mut rig = rig();
        rig.set_use_off_axis(false);
        let frame = rig.update(&Pose::at(Point3::new(0.2, 0.0, 0.5)));
        assert_eq!(frame.left.mode(), ProjectionMode::Symmetric);
        assert_eq!(frame.left.projection(), frame.left.symmetric_projection());
    }

    #[test]
    fn test_missing_plane_falls_back_to_symmetric() {
        let eye = EyeCamera::default();
        let mut rig = StereoRig::new(0.064, eye, eye).unwrap();
        let frame = rig.update(&Pose::at(Point3::new(0.0, 0.0, 0.5)));
        assert_eq!(frame.right.mode(), ProjectionMode::Symmetric);
    }

    #[test]
    fn test_degenerate_eye_holds_previous_matrix() {
        let mut rig = rig();
        let good = rig.update(&Pose::at(Point3::new(0.0, 0.0, 0.5)));
        let bad = rig.update(&Pose::at(Point3::new(0.0, 0.0, -0.1)));

        assert_eq!(bad.left.mode(), ProjectionMode::Held);
        assert_eq!(bad.left.projection(), good.left.projection());
        assert!(bad.left.projection().iter().all(|v| v.is_finite()));
        // Pose still follows the rig
        assert_relative_eq!(bad.left.pose().position.z, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_ipd_validation() {
        let mut rig = rig();
        assert!(rig.set_ipd(0.0).is_err());
        assert!(rig.set_ipd(f64::NAN).is_err());
        assert!(rig.set_ipd(0.07).is_ok());
        assert_relative_eq!(rig.ipd(), 0.07);
    }

    #[test]
    fn test_eye_camera_validation() {
        assert!(EyeCamera::new(0.0, 10.0, 60.0, 1.0).is_err());
        assert!(EyeCamera::new(0.1, 0.05, 60.0, 1.0).is_err());
        assert!(EyeCamera::new(0.1, 10.0, 180.0, 1.0).is_err());
        assert!(EyeCamera::new(0.1, 10.0, 60.0, 0.0).is_err());
    }

    #[test]
    fn test_pose_axes() {
        let pose = Pose::new(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2),
        );
        assert_relative_eq!(pose.right(), -Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(pose.forward(), -Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(pose.up(), Vector3::y(), epsilon = 1e-12);
    }
}
