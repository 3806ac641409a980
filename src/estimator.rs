//! Pinhole triangulation of the viewer's head position from two eye pixels.
//!
//! Output convention: right-handed, meters, origin at the webcam (which
//! sits at the projection plane's origin), +X to the viewer's right, +Y up,
//! +Z from the screen toward the viewer. A viewer in front of the screen
//! therefore always has positive Z.

use log::debug;
use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FOCAL_LENGTH, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_IPD, MIN_EYE_SEPARATION_PX,
};
use crate::{Error, Result};

/// Webcam intrinsics needed for triangulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in pixels
    pub focal_length: f64,
    /// Frame width in pixels
    pub frame_width: u32,
    /// Frame height in pixels
    pub frame_height: u32,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            focal_length: DEFAULT_FOCAL_LENGTH,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

/// Eye landmarks of one detected face, in normalized image coordinates
/// (0..1, origin top-left, v down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeDetection {
    pub left_eye: Point2<f64>,
    pub right_eye: Point2<f64>,
}

impl EyeDetection {
    #[must_use]
    pub const fn new(left_eye: Point2<f64>, right_eye: Point2<f64>) -> Self {
        Self { left_eye, right_eye }
    }
}

/// Turns eye detections into 3D head positions
#[derive(Debug, Clone, Copy)]
pub struct PositionEstimator {
    intrinsics: CameraIntrinsics,
    ipd: f64,
    mirror_x: bool,
}

impl PositionEstimator {
    /// Create an estimator
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the focal length, frame size or
    /// IPD is not positive.
    pub fn new(intrinsics: CameraIntrinsics, ipd: f64) -> Result<Self> {
        if !(intrinsics.focal_length.is_finite() && intrinsics.focal_length > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Focal length must be positive, got {}",
                intrinsics.focal_length
            )));
        }
        if intrinsics.frame_width == 0 || intrinsics.frame_height == 0 {
            return Err(Error::InvalidInput(format!(
                "Frame size must be non-zero, got {}x{}",
                intrinsics.frame_width, intrinsics.frame_height
            )));
        }
        if !(ipd.is_finite() && ipd > 0.0) {
            return Err(Error::InvalidInput(format!("IPD must be positive, got {ipd}")));
        }

        Ok(Self {
            intrinsics,
            ipd,
            mirror_x: false,
        })
    }

    /// Flip X for webcams that deliver a mirrored image
    #[must_use]
    pub fn mirrored(mut self, mirror_x: bool) -> Self {
        self.mirror_x = mirror_x;
        self
    }

    #[must_use]
    pub const fn intrinsics(&self) -> CameraIntrinsics {
        self.intrinsics
    }

    /// Estimate the head position, or `None` if the eyes are too close
    /// together in the image to triangulate
    #[must_use]
    pub fn estimate(&self, detection: &EyeDetection) -> Option<Vector3<f64>> {
        let w = f64::from(self.intrinsics.frame_width);
        let h = f64::from(self.intrinsics.frame_height);
        let f = self.intrinsics.focal_length;

        let left = Point2::new(detection.left_eye.x * w, detection.left_eye.y * h);
        let right = Point2::new(detection.right_eye.x * w, detection.right_eye.y * h);

        let separation = nalgebra::distance(&left, &right);
        if !separation.is_finite() || separation < MIN_EYE_SEPARATION_PX {
            debug!("Eye separation {separation:.3} px too small to triangulate");
            return None;
        }

        let center = nalgebra::center(&left, &right);
        let cx = w / 2.0;
        let cy = h / 2.0;

        let z = f * self.ipd / separation;
        let mut x = -(center.x - cx) * z / f;
        let y = -(center.y - cy) * z / f;

        if self.mirror_x {
            x = -x;
        }

        Some(Vector3::new(x, y, z))
    }
}

impl Default for PositionEstimator {
    fn default() -> Self {
        Self {
            intrinsics: CameraIntrinsics::default(),
            ipd: DEFAULT_IPD,
            mirror_x: false,
        }
    }
}
