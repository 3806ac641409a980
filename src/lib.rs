//! Head-coupled stereo rendering for "fish tank" virtual reality.
//!
//! This library turns a tracked head position into a pair of eye cameras
//! whose asymmetric (off-axis) frusta look through a fixed physical screen:
//! - Webcam eye detections are triangulated into a 3D head position
//! - A bank of smoothing filters removes tracking jitter
//! - A stereo rig places two eyes around the filtered head
//! - Each eye gets an off-axis projection through the screen rectangle
//!
//! The pipeline runs once per rendered frame:
//! 1. Estimate the head position from the eye landmarks
//! 2. Filter it with the selected smoothing filter
//! 3. Position the rig and both eye cameras
//! 4. Recompute each eye's projection matrix
//!
//! # Examples
//!
//! ## Off-axis projection
//!
//! ```no_run
//! use fishtank_stereo::{projection::off_axis_extents, projection_plane::ProjectionPlane};
//! use nalgebra::Point3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A 60 x 40 cm screen centered on the origin
//! let screen = ProjectionPlane::from_center_size(Point3::origin(), 0.6, 0.4)?;
//!
//! // Eye 10 cm right of center, half a meter in front of the screen
//! let extents = off_axis_extents(&Point3::new(0.1, 0.0, 0.5), &screen, 0.1, 100.0)?;
//! println!("l={:.3} r={:.3} b={:.3} t={:.3}", extents.left, extents.right, extents.bottom, extents.top);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Filters
//!
//! ```no_run
//! use fishtank_stereo::filters::{create_filter, Position, SmoothingFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Moving average over the last 10 samples
//! let mut filter = create_filter("moving_average:10")?;
//!
//! let filtered = filter.apply(Position::new(0.01, -0.02, 0.55));
//! println!("Filtered head: {filtered:?}");
//!
//! // Reset filter if needed
//! filter.reset();
//! # Ok(())
//! # }
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```no_run
//! use fishtank_stereo::{config::Config, estimator::EyeDetection};
//! use nalgebra::Point2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = Config::default().create_pipeline()?;
//!
//! // Eyes found by a face detector, in normalized image coordinates
//! let detection = EyeDetection::new(Point2::new(0.45, 0.52), Point2::new(0.55, 0.52));
//!
//! if let Some(frame) = pipeline.tick_detection(Some(&detection)) {
//!     let left = frame.left.projection();
//!     let right = frame.right.projection();
//!     println!("Left eye at {:?}", frame.left.pose().position);
//!     println!("Projections: {left} {right}");
//! }
//!
//! // Frames without a face keep the previous cameras
//! let held = pipeline.tick_detection(None);
//! assert!(held.is_some());
//! # Ok(())
//! # }
//! ```

/// Smoothing filters for head positions
pub mod filters;

/// Physical screen rectangle used as the projection window
pub mod projection_plane;

/// Off-axis and symmetric perspective projection matrices
pub mod projection;

/// Two-eye camera rig positioned from the head pose
pub mod stereo_rig;

/// Head position triangulation from webcam eye landmarks
pub mod estimator;

/// Per-frame tracking pipeline
pub mod tracking;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
