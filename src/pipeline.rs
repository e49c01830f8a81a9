use std::{io::Write, time::Duration};

use log::{debug, info, warn};

use crate::{
	detection::sort_by_id,
	CameraIntrinsics, DemoError, Detection, FrameError, GrayImage, MarkerDetector, PoseEstimate,
	PoseEstimator, TagOrientation, TimeProfile, TimeProfileStatistics,
};

/// Produces frames, e.g. from a camera.
pub trait FrameSource {
	type Frame;

	/// Block until the next frame is available
	fn read_frame(&mut self) -> Result<Self::Frame, FrameError>;

	/// Single-channel intensity copy of `frame`
	fn to_gray(&mut self, frame: &Self::Frame) -> Result<GrayImage, FrameError>;
}

/// Draws a detection onto a frame
pub trait Annotator<F> {
	fn annotate(&mut self, frame: &mut F, detection: &Detection) -> Result<(), FrameError>;
}

/// Where annotated frames go, and where the quit key comes from
pub trait FrameSink<F> {
	fn show(&mut self, frame: &F) -> Result<(), DemoError>;

	/// Wait up to `delay` for a key press
	fn poll_key(&mut self, delay: Duration) -> Result<Option<char>, DemoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
	/// Only report per-frame timing
	pub quiet: bool,
	/// Process detections in ascending id order instead of detector order
	pub sort_by_id: bool,
	/// Stop after this many loop iterations
	pub max_frames: Option<usize>,
	pub quit_key: char,
	pub key_delay: Duration,
}

impl Default for PipelineOptions {
	fn default() -> Self {
		Self {
			quiet: false,
			sort_by_id: false,
			max_frames: None,
			quit_key: 'q',
			key_delay: Duration::from_millis(30),
		}
	}
}

/// One detection and what became of it
#[derive(Debug, Clone)]
pub struct MarkerReport {
	pub detection: Detection,
	/// `None` if pose estimation failed
	pub pose: Option<(PoseEstimate, TagOrientation)>,
	pub annotated: bool,
}

#[derive(Debug, Clone)]
pub struct FrameReport {
	/// In processing order
	pub markers: Vec<MarkerReport>,
	pub profile: TimeProfile,
}

impl FrameReport {
	pub fn detections(&self) -> usize {
		self.markers.len()
	}

	pub fn poses(&self) -> usize {
		self.markers.iter().filter(|m| m.pose.is_some()).count()
	}

	pub fn annotated(&self) -> usize {
		self.markers.iter().filter(|m| m.annotated).count()
	}

	/// Wall-clock time from frame capture to display
	pub fn elapsed(&self) -> Duration {
		self.profile.total_duration()
	}
}

#[derive(Debug)]
pub enum FrameOutcome {
	Processed(FrameReport),
	/// Frame was dropped before detection
	Skipped(FrameError),
}

#[derive(Debug, Default)]
pub struct RunSummary {
	/// Frames that made it to the display
	pub frames: usize,
	/// Frames dropped by capture or detection errors
	pub skipped: usize,
	pub statistics: TimeProfileStatistics,
}

/// Capture → detect → pose → annotate → display, one frame at a time.
pub struct Pipeline<S, D, P, A, K> {
	source: S,
	detector: D,
	estimator: P,
	annotator: A,
	sink: K,
	intrinsics: CameraIntrinsics,
	options: PipelineOptions,
}

impl<S, D, P, A, K> Pipeline<S, D, P, A, K>
where
	S: FrameSource,
	D: MarkerDetector,
	P: PoseEstimator<D::Marker>,
	A: Annotator<S::Frame>,
	K: FrameSink<S::Frame>,
{
	pub fn new(source: S, detector: D, estimator: P, annotator: A, sink: K, intrinsics: CameraIntrinsics, options: PipelineOptions) -> Self {
		Self {
			source,
			detector,
			estimator,
			annotator,
			sink,
			intrinsics,
			options,
		}
	}

	pub fn detector(&self) -> &D {
		&self.detector
	}

	pub fn annotator(&self) -> &A {
		&self.annotator
	}

	pub fn sink(&self) -> &K {
		&self.sink
	}

	/// Run one iteration, writing the console report to `out`.
	///
	/// Only display errors (and failing to write `out`) are returned as errors.
	pub fn process_frame(&mut self, out: &mut impl Write) -> Result<FrameOutcome, DemoError> {
		let mut tp = TimeProfile::default();

		let mut frame = match self.source.read_frame() {
			Ok(frame) => frame,
			Err(e) => {
				warn!("Dropping frame: {e}");
				return Ok(FrameOutcome::Skipped(e));
			}
		};
		tp.stamp("capture");

		let gray = match self.source.to_gray(&frame) {
			Ok(gray) => gray,
			Err(e) => {
				warn!("Dropping frame: {e}");
				return Ok(FrameOutcome::Skipped(e));
			}
		};
		tp.stamp("cvt_color");

		let mut found = match self.detector.detect(&gray) {
			Ok(found) => found,
			Err(e) => {
				warn!("Dropping frame: {e}");
				return Ok(FrameOutcome::Skipped(e));
			}
		};
		tp.stamp("detect");

		if self.options.sort_by_id {
			sort_by_id(&mut found);
		}

		if !self.options.quiet {
			writeln!(out, "{} tags detected", found.len())?;
		}

		let mut markers = Vec::with_capacity(found.len());
		for marker in found {
			let detection = marker.as_ref();
			let pose = match self.estimator.estimate(&marker, &self.intrinsics) {
				Ok(pose) => {
					let orientation = TagOrientation::from_pose(&pose);
					Some((pose, orientation))
				},
				Err(e) => {
					warn!("{e}");
					None
				}
			};

			if !self.options.quiet {
				if let Some((pose, orientation)) = &pose {
					write_pose(out, detection.id, pose, orientation)?;
				}
			}

			let annotated = match self.annotator.annotate(&mut frame, detection) {
				Ok(()) => true,
				Err(e) => {
					warn!("Tag {}: {e}", detection.id);
					false
				}
			};

			markers.push(MarkerReport {
				detection: detection.clone(),
				pose,
				annotated,
			});
		}
		tp.stamp("tags");

		self.sink.show(&frame)?;
		tp.stamp("imshow");

		writeln!(out, "Time spent: {}ms", tp.total_duration().as_millis())?;
		debug!("Frame profile:\n{tp}");

		Ok(FrameOutcome::Processed(FrameReport {
			markers,
			profile: tp,
		}))
	}

	/// Loop until the quit key, the frame limit, or a fatal error.
	pub fn run(&mut self, out: &mut impl Write) -> Result<RunSummary, DemoError> {
		let mut summary = RunSummary::default();

		loop {
			if let Some(max_frames) = self.options.max_frames {
				if summary.frames + summary.skipped >= max_frames {
					info!("Reached frame limit ({max_frames})");
					break;
				}
			}

			match self.process_frame(out)? {
				FrameOutcome::Processed(report) => {
					summary.frames += 1;
					summary.statistics.add(&report.profile);
				},
				FrameOutcome::Skipped(_) => summary.skipped += 1,
			}

			if self.sink.poll_key(self.options.key_delay)? == Some(self.options.quit_key) {
				info!("Quit key pressed");
				break;
			}
		}

		Ok(summary)
	}
}

fn write_pose(out: &mut impl Write, id: u32, pose: &PoseEstimate, orientation: &TagOrientation) -> std::io::Result<()> {
	let (R, t) = (&pose.R, &pose.t);
	writeln!(out, "tag {id} T is {:.6}  {:.6}  {:.6}", t.x, t.y, t.z)?;
	writeln!(out, "R is {:.6}  {:.6}  {:.6}", R[(0, 0)], R[(0, 1)], R[(0, 2)])?;
	writeln!(out, "{:.6} {:.6}  {:.6}", R[(1, 0)], R[(1, 1)], R[(1, 2)])?;
	writeln!(out, "{:.6} {:.6}  {:.6}", R[(2, 0)], R[(2, 1)], R[(2, 2)])?;
	writeln!(out, "error is {:.6}", pose.error)?;
	let p = &orientation.camera_position;
	writeln!(out, "result is {:.6}  {:.6}  {:.6}", p.x, p.y, p.z)?;
	let angles = &orientation.angles;
	writeln!(out, "theta_x is {:.6}\ttheta_y is {:.6}\ttheta_z is {:.6}", angles.theta_x, angles.theta_y, angles.theta_z)
}
