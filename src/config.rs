//! Configuration management for the fish tank stereo pipeline

use crate::estimator::{CameraIntrinsics, PositionEstimator};
use crate::filters::{FilterBank, FilterKind, FilterSpec, Position, SmoothingFilter};
use crate::projection_plane::ProjectionPlane;
use crate::stereo_rig::{EyeCamera, StereoRig};
use crate::tracking::TrackingPipeline;
use crate::{constants, Error, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stereo rig configuration
    pub stereo: StereoConfig,

    /// Filter configuration
    pub filter: FilterConfig,

    /// Projection plane corners; absent means symmetric projection only
    #[serde(default)]
    pub plane: Option<PlaneConfig>,

    /// Eye camera lens configuration
    pub cameras: CameraConfig,

    /// Position estimator configuration
    pub estimator: EstimatorConfig,
}

/// Stereo rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    /// Inter-pupillary distance in meters
    pub ipd: f64,

    /// Render off-axis projections through the plane
    pub use_off_axis: bool,
}

/// Filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter driving the rig
    pub default_filter: String,

    /// Moving average window size (1-200)
    pub samples: usize,

    /// Single exponential alpha (0.01-1.0)
    pub se_alpha: f64,

    /// Double exponential level factor (0-1)
    pub de_alpha: f64,

    /// Double exponential trend factor (0-1)
    pub de_beta: f64,

    /// One-euro base sampling frequency in Hz
    pub frequency: f64,

    /// One-euro minimum cutoff in Hz
    pub one_euro_min_cutoff: f64,

    /// One-euro speed coefficient
    pub one_euro_beta: f64,

    /// One-euro derivative cutoff in Hz
    pub one_euro_d_cutoff: f64,
}

/// Projection plane corners in world space (meters)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaneConfig {
    pub bottom_left: [f64; 3],
    pub bottom_right: [f64; 3],
    pub top_left: [f64; 3],
    pub top_right: [f64; 3],
}

/// Eye camera lens configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Near clip distance in meters
    pub near: f64,

    /// Far clip distance in meters
    pub far: f64,

    /// Vertical field of view in degrees for the symmetric projection
    pub field_of_view: f64,

    /// Viewport aspect ratio (width / height)
    pub aspect: f64,
}

/// Position estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Webcam focal length in pixels
    pub focal_length: f64,

    /// Webcam frame width in pixels
    pub frame_width: u32,

    /// Webcam frame height in pixels
    pub frame_height: u32,

    /// Viewer's real inter-pupillary distance in meters
    pub ipd: f64,

    /// Webcam delivers a mirrored image
    pub mirror_x: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stereo: StereoConfig::default(),
            filter: FilterConfig::default(),
            plane: Some(PlaneConfig::default()),
            cameras: CameraConfig::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            ipd: constants::DEFAULT_IPD,
            use_off_axis: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_filter: FilterKind::OneEuro.as_str().to_string(),
            samples: constants::DEFAULT_MOVING_AVERAGE_WINDOW,
            se_alpha: constants::DEFAULT_SE_ALPHA,
            de_alpha: constants::DEFAULT_DE_ALPHA,
            de_beta: constants::DEFAULT_DE_BETA,
            frequency: constants::DEFAULT_ONE_EURO_FREQUENCY,
            one_euro_min_cutoff: constants::DEFAULT_ONE_EURO_MIN_CUTOFF,
            one_euro_beta: constants::DEFAULT_ONE_EURO_BETA,
            one_euro_d_cutoff: constants::DEFAULT_ONE_EURO_D_CUTOFF,
        }
    }
}

impl Default for PlaneConfig {
    /// A 24" 16:9 monitor centered on the origin
    fn default() -> Self {
        Self {
            bottom_left: [-0.265, -0.15, 0.0],
            bottom_right: [0.265, -0.15, 0.0],
            top_left: [-0.265, 0.15, 0.0],
            top_right: [0.265, 0.15, 0.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            near: constants::DEFAULT_NEAR_CLIP,
            far: constants::DEFAULT_FAR_CLIP,
            field_of_view: constants::DEFAULT_FIELD_OF_VIEW,
            aspect: constants::DEFAULT_ASPECT,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            focal_length: constants::DEFAULT_FOCAL_LENGTH,
            frame_width: constants::DEFAULT_FRAME_WIDTH,
            frame_height: constants::DEFAULT_FRAME_HEIGHT,
            ipd: constants::DEFAULT_IPD,
            mirror_x: false,
        }
    }
}

impl PlaneConfig {
    /// Build the validated plane
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateGeometry` if the corners do not form a rectangle.
    pub fn to_plane(&self) -> Result<ProjectionPlane> {
        let point = |c: [f64; 3]| Point3::new(c[0], c[1], c[2]);
        ProjectionPlane::new(
            point(self.bottom_left),
            point(self.bottom_right),
            point(self.top_left),
            point(self.top_right),
        )
    }
}

impl FilterConfig {
    /// Specification of `kind` with the configured parameters
    #[must_use]
    pub const fn spec_for(&self, kind: FilterKind) -> FilterSpec {
        match kind {
            FilterKind::None => FilterSpec::None,
            FilterKind::MovingAverage => FilterSpec::MovingAverage { samples: self.samples },
            FilterKind::SingleExponential => FilterSpec::SingleExponential { alpha: self.se_alpha },
            FilterKind::DoubleExponential => FilterSpec::DoubleExponential {
                alpha: self.de_alpha,
                beta: self.de_beta,
            },
            FilterKind::OneEuro => FilterSpec::OneEuro {
                frequency: self.frequency,
                min_cutoff: self.one_euro_min_cutoff,
                beta: self.one_euro_beta,
                d_cutoff: self.one_euro_d_cutoff,
            },
        }
    }

    /// Specifications for every smoothing kind
    #[must_use]
    pub fn specs(&self) -> Vec<FilterSpec> {
        FilterKind::ALL
            .iter()
            .filter(|kind| **kind != FilterKind::None)
            .map(|kind| self.spec_for(*kind))
            .collect()
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Serialize configuration to YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Selected filter kind
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` for an unknown filter name.
    pub fn filter_kind(&self) -> Result<FilterKind> {
        self.filter.default_filter.parse()
    }

    /// Create the selected filter from configuration
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown filter name or invalid parameters.
    pub fn create_filter(&self) -> Result<Box<dyn SmoothingFilter<Position>>> {
        self.filter.spec_for(self.filter_kind()?).build()
    }

    /// Create a bank holding every filter kind, selecting the configured one
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown filter name or invalid parameters.
    pub fn create_filter_bank(&self) -> Result<FilterBank> {
        FilterBank::new(&self.filter.specs(), self.filter_kind()?)
    }

    /// Projection plane, if configured
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateGeometry` for malformed corners.
    pub fn projection_plane(&self) -> Result<Option<ProjectionPlane>> {
        self.plane.as_ref().map(PlaneConfig::to_plane).transpose()
    }

    /// Eye camera described by the lens configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for out-of-range lens parameters.
    pub fn eye_camera(&self) -> Result<EyeCamera> {
        EyeCamera::new(
            self.cameras.near,
            self.cameras.far,
            self.cameras.field_of_view,
            self.cameras.aspect,
        )
    }

    /// Stereo rig described by the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any rig, lens or plane parameter is invalid.
    pub fn create_rig(&self) -> Result<StereoRig> {
        let eye = self.eye_camera()?;
        let mut rig = StereoRig::new(self.stereo.ipd, eye, eye)?;
        rig.set_plane(self.projection_plane()?);
        rig.set_use_off_axis(self.stereo.use_off_axis);
        Ok(rig)
    }

    /// Position estimator described by the configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for invalid intrinsics.
    pub fn create_estimator(&self) -> Result<PositionEstimator> {
        let intrinsics = CameraIntrinsics {
            focal_length: self.estimator.focal_length,
            frame_width: self.estimator.frame_width,
            frame_height: self.estimator.frame_height,
        };
        Ok(PositionEstimator::new(intrinsics, self.estimator.ipd)?.mirrored(self.estimator.mirror_x))
    }

    /// Full tracking pipeline described by the configuration
    ///
    /// # Errors
    ///
    /// Returns the first validation or construction error.
    pub fn create_pipeline(&self) -> Result<TrackingPipeline> {
        self.validate()?;
        Ok(TrackingPipeline::new(
            self.create_estimator()?,
            self.create_filter_bank()?,
            self.create_rig()?,
        ))
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        // Validate stereo settings
        if !(self.stereo.ipd.is_finite() && self.stereo.ipd > 0.0) {
            return Err(Error::ConfigError("IPD must be greater than 0".to_string()));
        }

        // Validate filter parameters
        self.filter_kind()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        if !(constants::MOVING_AVERAGE_WINDOW_MIN..=constants::MOVING_AVERAGE_WINDOW_MAX)
            .contains(&self.filter.samples)
        {
            return Err(Error::ConfigError(format!(
                "Moving average samples must be between {} and {}",
                constants::MOVING_AVERAGE_WINDOW_MIN,
                constants::MOVING_AVERAGE_WINDOW_MAX
            )));
        }
        if !(constants::SE_ALPHA_MIN..=constants::SE_ALPHA_MAX).contains(&self.filter.se_alpha) {
            return Err(Error::ConfigError(format!(
                "Single exponential alpha must be between {} and {}",
                constants::SE_ALPHA_MIN,
                constants::SE_ALPHA_MAX
            )));
        }
        if !(0.0..=1.0).contains(&self.filter.de_alpha) {
            return Err(Error::ConfigError(
                "Double exponential alpha must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.filter.de_beta) {
            return Err(Error::ConfigError(
                "Double exponential beta must be between 0.0 and 1.0".to_string(),
            ));
        }
        for spec in self.filter.specs() {
            spec.validate().map_err(|e| Error::ConfigError(e.to_string()))?;
        }

        // Validate camera settings
        if !(self.cameras.near > 0.0 && self.cameras.far > self.cameras.near) {
            return Err(Error::ConfigError(
                "Camera clip planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if !(self.cameras.field_of_view > 0.0 && self.cameras.field_of_view < 180.0) {
            return Err(Error::ConfigError(
                "Field of view must be between 0 and 180 degrees".to_string(),
            ));
        }
        if !(self.cameras.aspect > 0.0) {
            return Err(Error::ConfigError("Aspect ratio must be greater than 0".to_string()));
        }

        // Validate estimator settings
        if !(self.estimator.focal_length > 0.0) {
            return Err(Error::ConfigError("Focal length must be greater than 0".to_string()));
        }
        if self.estimator.frame_width == 0 || self.estimator.frame_height == 0 {
            return Err(Error::ConfigError("Frame size must be non-zero".to_string()));
        }
        if !(self.estimator.ipd > 0.0) {
            return Err(Error::ConfigError("Estimator IPD must be greater than 0".to_string()));
        }

        // Validate plane geometry
        self.projection_plane()
            .map_err(|e| Error::ConfigError(format!("Invalid projection plane: {e}")))?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Fish Tank Stereo Configuration

# Stereo rig
stereo:
  ipd: 0.064
  use_off_axis: true

# Filter configuration
filter:
  default_filter: "one_euro"
  samples: 30
  se_alpha: 0.03
  de_alpha: 0.04
  de_beta: 0.5
  frequency: 60.0
  one_euro_min_cutoff: 1.0
  one_euro_beta: 0.0
  one_euro_d_cutoff: 1.0

# Physical screen corners in meters (remove for symmetric projection)
plane:
  bottom_left: [-0.265, -0.15, 0.0]
  bottom_right: [0.265, -0.15, 0.0]
  top_left: [-0.265, 0.15, 0.0]
  top_right: [0.265, 0.15, 0.0]

# Eye cameras
cameras:
  near: 0.01
  far: 1000.0
  field_of_view: 60.0
  aspect: 1.7777777777777777

# Webcam triangulation
estimator:
  focal_length: 492.0
  frame_width: 640
  frame_height: 480
  ipd: 0.064
  mirror_x: false
"#;
