//! Constants used throughout the crate

/// Default inter-pupillary distance in meters
pub const DEFAULT_IPD: f64 = 0.064;

/// Default moving average window (frames)
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 30;

/// Moving average window bounds
pub const MOVING_AVERAGE_WINDOW_MIN: usize = 1;
pub const MOVING_AVERAGE_WINDOW_MAX: usize = 200;

/// Default single exponential smoothing factor
pub const DEFAULT_SE_ALPHA: f64 = 0.03;

/// Single exponential alpha bounds as exposed in configuration
pub const SE_ALPHA_MIN: f64 = 0.01;
pub const SE_ALPHA_MAX: f64 = 1.0;

/// Default double exponential parameters
pub const DEFAULT_DE_ALPHA: f64 = 0.04;
pub const DEFAULT_DE_BETA: f64 = 0.5;

/// Default one-euro base sampling frequency (Hz)
pub const DEFAULT_ONE_EURO_FREQUENCY: f64 = 60.0;

/// Default one-euro cutoff parameters
pub const DEFAULT_ONE_EURO_MIN_CUTOFF: f64 = 1.0;
pub const DEFAULT_ONE_EURO_BETA: f64 = 0.0;
pub const DEFAULT_ONE_EURO_D_CUTOFF: f64 = 1.0;

/// Default eye camera clip planes (meters)
pub const DEFAULT_NEAR_CLIP: f64 = 0.01;
pub const DEFAULT_FAR_CLIP: f64 = 1000.0;

/// Default eye camera vertical field of view (degrees) for symmetric fallback
pub const DEFAULT_FIELD_OF_VIEW: f64 = 60.0;

/// Default eye camera aspect ratio (width / height)
pub const DEFAULT_ASPECT: f64 = 16.0 / 9.0;

/// Default webcam focal length in pixels
pub const DEFAULT_FOCAL_LENGTH: f64 = 492.0;

/// Default webcam frame size
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Minimum eye separation in pixels for a usable detection
pub const MIN_EYE_SEPARATION_PX: f64 = 0.1;

/// Smallest eye-to-plane distance accepted by the off-axis builder (meters)
pub const MIN_PLANE_DISTANCE: f64 = 1e-6;

/// Tolerance for plane orthogonality and coplanarity checks
pub const PLANE_TOLERANCE: f64 = 1e-4;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
