//! Replay application: feeds recorded or synthetic eye detections through
//! the tracking pipeline and reports the per-eye cameras of every frame.

use crate::{
    config::Config,
    error::{Error, Result},
    estimator::EyeDetection,
    projection::{off_axis_extents, FrustumExtents},
    stereo_rig::{EyeCamera, ProjectionMode, RigFrame},
    tracking::TrackingPipeline,
};
use log::{debug, info, warn};
use nalgebra::Point2;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where eye detections come from
    pub detection_source: DetectionSource,
    /// Pipeline configuration
    pub pipeline: Config,
    /// Report every filter in the bank, not only the selected one
    pub show_all_filters: bool,
}

/// Detection source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionSource {
    /// Detection log, one frame per line
    File(PathBuf),
    /// Generated head sweep with the given number of frames
    Synthetic(usize),
}

/// Outputs of one replayed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    /// Whether this frame carried a usable detection
    pub detected: bool,
    /// Rig state after the tick (held when `detected` is false)
    pub frame: Option<RigFrame>,
    pub left_extents: Option<FrustumExtents>,
    pub right_extents: Option<FrustumExtents>,
}

/// Parse a detection log.
///
/// Each line holds `lx ly rx ry` in normalized image coordinates. A line
/// that is empty or `-` is a frame without a face; `#` starts a comment.
///
/// # Errors
///
/// Returns `Error::InvalidInput` naming the first malformed line.
pub fn parse_detections(content: &str) -> Result<Vec<Option<EyeDetection>>> {
    content
        .lines()
        .enumerate()
        .map(|(number, line)| parse_detection_line(line).map_err(|e| line_error(number + 1, &e)))
        .collect()
}

fn line_error(line: usize, error: &Error) -> Error {
    Error::InvalidInput(format!("Detection line {line}: {error}"))
}

fn parse_detection_line(line: &str) -> Result<Option<EyeDetection>> {
    let data = line.split('#').next().unwrap_or_default().trim();
    if data.is_empty() || data == "-" {
        return Ok(None);
    }

    let values = data
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| Error::InvalidInput(format!("'{token}' is not a number")))
        })
        .collect::<Result<Vec<_>>>()?;

    match values.as_slice() {
        &[lx, ly, rx, ry] => Ok(Some(EyeDetection::new(Point2::new(lx, ly), Point2::new(rx, ry)))),
        other => Err(Error::InvalidInput(format!("expected 4 values, found {}", other.len()))),
    }
}

/// Load a detection log from disk
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains a malformed line.
pub fn load_detections(path: &std::path::Path) -> Result<Vec<Option<EyeDetection>>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
    parse_detections(&content)
}

/// Generate a head sweeping side to side while moving in and out.
///
/// Every 25th frame drops the face to exercise the hold path.
#[must_use]
pub fn synthetic_detections(frames: usize) -> Vec<Option<EyeDetection>> {
    (0..frames)
        .map(|i| {
            if i % 25 == 24 {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / 60.0;
            let center_u = 0.5 + 0.2 * (t * 0.9).sin();
            let center_v = 0.5 + 0.05 * (t * 0.6).sin();
            let half_separation = 0.05 + 0.015 * (t * 0.4).sin();
            Some(EyeDetection::new(
                Point2::new(center_u - half_separation, center_v),
                Point2::new(center_u + half_separation, center_v),
            ))
        })
        .collect()
}

/// Main application struct
pub struct FishTankApp {
    config: AppConfig,
    pipeline: TrackingPipeline,
}

impl FishTankApp {
    /// Create the application and its tracking pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline configuration is invalid.
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing fish tank stereo application");
        let pipeline = config.pipeline.create_pipeline()?;
        Ok(Self { config, pipeline })
    }

    #[must_use]
    pub const fn pipeline(&self) -> &TrackingPipeline {
        &self.pipeline
    }

    /// Detections for the configured source
    ///
    /// # Errors
    ///
    /// Returns an error if a detection file cannot be loaded.
    pub fn detections(&self) -> Result<Vec<Option<EyeDetection>>> {
        match &self.config.detection_source {
            DetectionSource::File(path) => {
                info!("Reading detections from: {}", path.display());
                load_detections(path)
            }
            DetectionSource::Synthetic(frames) => {
                info!("Generating {frames} synthetic frames");
                Ok(synthetic_detections(*frames))
            }
        }
    }

    /// Run one tick and collect its report
    pub fn process(&mut self, index: usize, detection: Option<&EyeDetection>) -> FrameReport {
        let (ticks_before, skipped_before) = self.pipeline.stats();
        let frame = self.pipeline.tick_detection(detection);
        let (ticks, skipped) = self.pipeline.stats();
        let detected = ticks > ticks_before && skipped == skipped_before;

        let (left_extents, right_extents) = frame.map_or((None, None), |frame| {
            (self.extents(&frame.left), self.extents(&frame.right))
        });

        FrameReport {
            index,
            detected,
            frame,
            left_extents,
            right_extents,
        }
    }

    fn extents(&self, eye: &EyeCamera) -> Option<FrustumExtents> {
        if eye.mode() != ProjectionMode::OffAxis {
            return None;
        }
        let plane = self.pipeline.rig().plane()?;
        off_axis_extents(&eye.pose().position, plane, eye.near, eye.far).ok()
    }

    /// Replay the whole source, writing one line per frame to `out`
    ///
    /// # Errors
    ///
    /// Returns an error if the detections cannot be loaded or `out` fails.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<Vec<FrameReport>> {
        let detections = self.detections()?;
        info!("Starting replay of {} frames", detections.len());

        let start_time = Instant::now();
        let mut reports = Vec::with_capacity(detections.len());

        for (index, detection) in detections.iter().enumerate() {
            let report = self.process(index, detection.as_ref());
            writeln!(out, "{}", format_report(&report))?;

            if self.config.show_all_filters && report.detected {
                for (kind, output) in self.pipeline.filters().outputs() {
                    writeln!(out, "        {kind:<20} ({:+.4}, {:+.4}, {:+.4})", output.x, output.y, output.z)?;
                }
            }

            if report.detected && report.left_extents.is_none() && self.pipeline.rig().use_off_axis() {
                debug!("Frame {index}: no off-axis extents for this frame");
            }
            reports.push(report);
        }

        let (ticks, skipped) = self.pipeline.stats();
        #[allow(clippy::cast_precision_loss)]
        let fps = ticks as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
        if skipped == ticks && ticks > 0 {
            warn!("No frame carried a usable detection");
        }
        info!("Replayed {ticks} frames ({skipped} without detection) at {fps:.0} fps");

        Ok(reports)
    }
}

/// One-line text rendering of a frame report
#[must_use]
pub fn format_report(report: &FrameReport) -> String {
    let Some(frame) = report.frame else {
        return format!("{:>5}  no detection", report.index);
    };

    let status = if report.detected { "track" } else { "held " };
    let left = frame.left.pose().position;
    let right = frame.right.pose().position;

    let mut line = format!(
        "{:>5}  {status}  L ({:+.4}, {:+.4}, {:+.4})  R ({:+.4}, {:+.4}, {:+.4})",
        report.index, left.x, left.y, left.z, right.x, right.y, right.z
    );

    let eyes = [
        ("L", report.left_extents, frame.left.mode()),
        ("R", report.right_extents, frame.right.mode()),
    ];
    for (label, extents, mode) in eyes {
        match extents {
            Some(e) => line.push_str(&format!(
                "  {label}[l {:+.4} r {:+.4} b {:+.4} t {:+.4}]",
                e.left, e.right, e.bottom, e.top
            )),
            None => line.push_str(&format!("  {label}[{mode:?}]")),
        }
    }

    line
}
