//! Frame-synchronous head tracking pipeline.
//!
//! One tick per rendered frame: estimate → filter → place rig → project.
//! A tick without a usable sample changes nothing and returns the previous
//! frame's outputs.

use log::{debug, info};
use nalgebra::Vector3;

use crate::estimator::{EyeDetection, PositionEstimator};
use crate::filters::{FilterBank, Position};
use crate::stereo_rig::{Pose, RigFrame, StereoRig};

/// Drives a filter bank and a stereo rig from raw head positions
pub struct TrackingPipeline {
    estimator: PositionEstimator,
    filters: FilterBank,
    rig: StereoRig,
    /// Frame the head position is expressed in (the projection plane's frame)
    anchor: Pose,
    last_raw: Option<Position>,
    last_filtered: Option<Position>,
    last_frame: Option<RigFrame>,
    ticks: u64,
    skipped: u64,
}

impl TrackingPipeline {
    #[must_use]
    pub fn new(estimator: PositionEstimator, filters: FilterBank, rig: StereoRig) -> Self {
        info!(
            "Tracking pipeline ready: filter={}, ipd={:.4} m, off-axis={}",
            filters.selected(),
            rig.ipd(),
            rig.use_off_axis()
        );
        Self {
            estimator,
            filters,
            rig,
            anchor: Pose::default(),
            last_raw: None,
            last_filtered: None,
            last_frame: None,
            ticks: 0,
            skipped: 0,
        }
    }

    /// Place the tracking frame in the world
    #[must_use]
    pub fn with_anchor(mut self, anchor: Pose) -> Self {
        self.anchor = anchor;
        self
    }

    /// Run one tick from an optional face detection
    pub fn tick_detection(&mut self, detection: Option<&EyeDetection>) -> Option<RigFrame> {
        let raw = detection.and_then(|d| self.estimator.estimate(d));
        self.tick(raw)
    }

    /// Run one tick from a raw head position.
    ///
    /// `None` and the all-zero vector both mean "no detection": state is
    /// held and the previous frame is returned.
    pub fn tick(&mut self, raw: Option<Position>) -> Option<RigFrame> {
        self.ticks += 1;

        let Some(raw) = raw.filter(|p| !is_no_detection(p)) else {
            self.skipped += 1;
            debug!("Tick {}: no detection, holding previous frame", self.ticks);
            return self.last_frame;
        };

        let filtered = self.filters.apply(raw);
        self.last_raw = Some(raw);
        self.last_filtered = Some(filtered);

        let rig_pose = Pose::new(
            self.anchor.position + self.anchor.rotation * filtered,
            self.anchor.rotation,
        );

        let frame = self.rig.update(&rig_pose);
        self.last_frame = Some(frame);
        Some(frame)
    }

    #[must_use]
    pub const fn last_frame(&self) -> Option<RigFrame> {
        self.last_frame
    }

    #[must_use]
    pub const fn last_raw(&self) -> Option<Position> {
        self.last_raw
    }

    #[must_use]
    pub const fn last_filtered(&self) -> Option<Position> {
        self.last_filtered
    }

    /// Total ticks and ticks that held state
    #[must_use]
    pub const fn stats(&self) -> (u64, u64) {
        (self.ticks, self.skipped)
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterBank {
        &self.filters
    }

    #[must_use]
    pub const fn rig(&self) -> &StereoRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut StereoRig {
        &mut self.rig
    }
}

fn is_no_detection(position: &Vector3<f64>) -> bool {
    position.x == 0.0 && position.y == 0.0 && position.z == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterKind, FilterSpec};
    use crate::projection_plane::ProjectionPlane;
    use crate::stereo_rig::{EyeCamera, ProjectionMode};
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Point3};

    fn pipeline(spec: FilterSpec) -> TrackingPipeline {
        let plane = ProjectionPlane::from_center_size(Point3::origin(), 0.6, 0.4).unwrap();
        let eye = EyeCamera::new(0.1, 10.0, 60.0, 1.5).unwrap();
        let rig = StereoRig::new(0.064, eye, eye).unwrap().with_plane(plane);
        let filters = FilterBank::new(&[spec], spec.kind()).unwrap();
        TrackingPipeline::new(PositionEstimator::default(), filters, rig)
    }

    #[test]
    fn test_tick_positions_rig() {
        let mut pipeline = pipeline(FilterSpec::None);
        let frame = pipeline.tick(Some(Position::new(0.1, 0.0, 0.6))).unwrap();

        assert_relative_eq!(frame.rig.position, Point3::new(0.1, 0.0, 0.6), epsilon = 1e-12);
        assert_relative_eq!(frame.left.pose().position.x, 0.068, epsilon = 1e-12);
        assert_relative_eq!(frame.right.pose().position.x, 0.132, epsilon = 1e-12);
        assert_eq!(frame.left.mode(), ProjectionMode::OffAxis);
    }

    #[test]
    fn test_no_detection_holds_state() {
        let mut pipeline = pipeline(FilterSpec::MovingAverage { samples: 4 });

        assert!(pipeline.tick(None).is_none());

        let first = pipeline.tick(Some(Position::new(0.0, 0.1, 0.5))).unwrap();
        let held = pipeline.tick(Some(Position::zeros())).unwrap();
        assert_eq!(first, held);

        let held = pipeline.tick(None).unwrap();
        assert_eq!(first, held);

        // The zero sentinel never entered the moving average
        let next = pipeline.tick(Some(Position::new(0.0, 0.1, 0.5))).unwrap();
        assert_relative_eq!(next.rig.position, Point3::new(0.0, 0.1, 0.5), epsilon = 1e-12);

        assert_eq!(pipeline.stats(), (5, 3));
    }

    #[test]
    fn test_filter_smooths_rig_motion() {
        let mut pipeline = pipeline(FilterSpec::MovingAverage { samples: 2 });
        pipeline.tick(Some(Position::new(0.0, 0.0, 0.5)));
        let frame = pipeline.tick(Some(Position::new(0.2, 0.0, 0.5))).unwrap();
        assert_relative_eq!(frame.rig.position.x, 0.1, epsilon = 1e-12);
        assert_eq!(pipeline.last_raw(), Some(Position::new(0.2, 0.0, 0.5)));
    }

    #[test]
    fn test_detection_tick() {
        let mut pipeline = pipeline(FilterSpec::None);
        let detection = EyeDetection::new(Point2::new(0.45, 0.5), Point2::new(0.55, 0.5));
        let frame = pipeline.tick_detection(Some(&detection)).unwrap();
        assert!(frame.rig.position.z > 0.0);

        // Degenerate detection holds the frame
        let collapsed = EyeDetection::new(Point2::new(0.5, 0.5), Point2::new(0.5, 0.5));
        assert_eq!(pipeline.tick_detection(Some(&collapsed)), Some(frame));
        assert_eq!(pipeline.tick_detection(None), Some(frame));
    }

    #[test]
    fn test_anchor_transforms_head_position() {
        let anchor = Pose::at(Point3::new(0.0, 1.0, 0.0));
        let mut pipeline = pipeline(FilterSpec::None).with_anchor(anchor);
        pipeline.rig_mut().set_use_off_axis(false);
        let frame = pipeline.tick(Some(Position::new(0.0, 0.0, 0.5))).unwrap();
        assert_relative_eq!(frame.rig.position, Point3::new(0.0, 1.0, 0.5), epsilon = 1e-12);
        assert_eq!(pipeline.filters().selected(), FilterKind::None);
    }
}
