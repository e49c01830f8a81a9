//! Tag detection and pose estimation with the AprilTag C library.
use log::debug;
use nalgebra::{Matrix3, Point2, Vector3};

use crate::{
	CameraIntrinsics, DemoError, Detection, DetectorConfig, FrameError, GrayImage, MarkerDetector,
	PoseEstimate, PoseEstimator, TagFamily,
};

/// Bit errors corrected while decoding
const BITS_CORRECTED: usize = 2;

/// Iterations of the orthogonal iteration pose solver
const POSE_ITERATIONS: usize = 50;

fn native_family(family: TagFamily) -> apriltag::Family {
	match family {
		TagFamily::Tag36h11 => apriltag::Family::tag_36h11(),
		TagFamily::Tag25h9 => apriltag::Family::tag_25h9(),
		TagFamily::Tag16h5 => apriltag::Family::tag_16h5(),
		TagFamily::TagCircle21h7 => apriltag::Family::tag_circle_21h7(),
		TagFamily::TagStandard41h12 => apriltag::Family::tag_standard_41h12(),
	}
}

/// A detection plus the native detection it came from
#[derive(Debug)]
pub struct AprilTagMarker {
	detection: Detection,
	native: apriltag::Detection,
}

impl AsRef<Detection> for AprilTagMarker {
	fn as_ref(&self) -> &Detection {
		&self.detection
	}
}

pub struct AprilTagDetector {
	inner: apriltag::Detector,
	/// Reused between frames of the same size
	image: Option<apriltag::Image>,
}

impl AprilTagDetector {
	/// Create a detector for one family. The family is freed with the detector.
	pub fn new(family: TagFamily, config: &DetectorConfig) -> Result<Self, DemoError> {
		let nthreads = u8::try_from(config.nthreads().get())
			.map_err(|_| DemoError::InvalidConfig(format!("at most {} threads are supported (got {})", u8::MAX, config.nthreads())))?;

		let mut inner = apriltag::DetectorBuilder::new()
			.add_family_bits(native_family(family), BITS_CORRECTED)
			.build()?;
		inner.set_thread_number(nthreads);
		inner.set_decimation(config.quad_decimate());
		inner.set_sigma(config.quad_sigma());
		inner.set_refine_edges(config.refine_edges());
		inner.set_debug(config.debug());
		debug!("Created {family} detector: {config:?}");

		Ok(Self {
			inner,
			image: None,
		})
	}
}

impl MarkerDetector for AprilTagDetector {
	type Marker = AprilTagMarker;

	fn detect(&mut self, image: &GrayImage) -> Result<Vec<AprilTagMarker>, FrameError> {
		let native_image = load_image(&mut self.image, image)?;
		let found = self.inner.detect(native_image);

		let markers = found
			.into_iter()
			.filter_map(|native| {
				let id = u32::try_from(native.id()).ok()?;
				let corners = native.corners().map(|[x, y]| Point2::new(x, y));
				let [cx, cy] = native.center();
				Some(AprilTagMarker {
					detection: Detection::new(id, corners, Point2::new(cx, cy)),
					native,
				})
			})
			.collect();
		Ok(markers)
	}
}

/// Copy `src` into the cached native image, reallocating only when the size changes
fn load_image<'a>(cache: &'a mut Option<apriltag::Image>, src: &GrayImage) -> Result<&'a apriltag::Image, FrameError> {
	let image = match cache.take() {
		Some(image) if image.width() == src.width() && image.height() == src.height() => image,
		_ => apriltag::Image::zeros_with_stride(src.width(), src.height(), src.width())
			.map_err(|e| FrameError::Detect(e.to_string()))?,
	};
	let image = cache.insert(image);

	let stride = image.stride();
	let width = src.width();
	let buf = image.as_slice_mut();
	for (y, row) in src.rows().enumerate() {
		buf[y * stride..y * stride + width].copy_from_slice(row);
	}
	Ok(image)
}

/// Pose from the detection's homography, refined by orthogonal iteration.
///
/// Of the (up to) two local minima, the one with the lower object-space
/// error is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct AprilTagPoseEstimator;

impl PoseEstimator<AprilTagMarker> for AprilTagPoseEstimator {
	fn estimate(&self, marker: &AprilTagMarker, intrinsics: &CameraIntrinsics) -> Result<PoseEstimate, FrameError> {
		let id = marker.detection.id;
		let pose_error = |reason: &str| FrameError::Pose { id, reason: reason.into() };

		let params = apriltag::TagParams {
			tagsize: intrinsics.tagsize,
			fx: intrinsics.fx,
			fy: intrinsics.fy,
			cx: intrinsics.cx,
			cy: intrinsics.cy,
		};
		let best = marker.native
			.estimate_tag_pose_orthogonal_iteration(&params, POSE_ITERATIONS)
			.into_iter()
			.min_by(|a, b| a.error.total_cmp(&b.error))
			.ok_or_else(|| pose_error("no solution"))?;

		let rotation = best.pose.rotation();
		let translation = best.pose.translation();
		if (rotation.nrows(), rotation.ncols()) != (3, 3) || translation.nrows() * translation.ncols() != 3 {
			return Err(pose_error("malformed solution"));
		}

		Ok(PoseEstimate {
			R: Matrix3::from_row_slice(rotation.data()),
			t: Vector3::from_column_slice(translation.data()),
			error: best.error,
		})
	}
}

#[cfg(test)]
mod test {
	use approx::assert_relative_eq;
	use nalgebra::{Matrix3, Point2, Vector3};

	use super::{AprilTagDetector, AprilTagPoseEstimator};
	use crate::{CameraIntrinsics, DetectorConfig, GrayImage, MarkerDetector, PoseEstimator, TagFamily, FAMILY_TABLE};

	/// tag16h5 data bit positions, inside the 6x6 black border
	const TAG16H5_BITS: [(usize, usize); 16] = [
		(1, 1), (2, 1), (3, 1), (2, 2),
		(4, 1), (4, 2), (4, 3), (3, 2),
		(4, 4), (3, 4), (2, 4), (3, 3),
		(1, 4), (1, 3), (1, 2), (2, 3),
	];
	/// tag16h5 id 0
	const TAG16H5_CODE_0: u64 = 0x27c8;

	const SCALE: usize = 20;
	const PAD: usize = 40;

	fn fill_cell(im: &mut GrayImage, (cx, cy): (usize, usize), value: u8) {
		for y in 0..SCALE {
			let row = im.row_mut(PAD + cy * SCALE + y);
			row[PAD + cx * SCALE..PAD + (cx + 1) * SCALE].fill(value);
		}
	}

	/// Upright tag16h5 on a white background. The black border spans
	/// pixels `PAD + SCALE .. PAD + 7 * SCALE`.
	fn render_tag16h5(code: u64) -> GrayImage {
		let size = 8 * SCALE + 2 * PAD;
		let mut im = GrayImage::zeroed(size, size);
		for y in 0..size {
			im.row_mut(y).fill(255);
		}
		for cy in 1..7 {
			for cx in 1..7 {
				fill_cell(&mut im, (cx, cy), 0);
			}
		}
		for (i, (bx, by)) in TAG16H5_BITS.iter().enumerate() {
			if code & (1 << (TAG16H5_BITS.len() - 1 - i)) != 0 {
				fill_cell(&mut im, (bx + 1, by + 1), 255);
			}
		}
		im
	}

	#[test]
	fn every_family_has_a_detector() {
		for info in FAMILY_TABLE {
			assert!(AprilTagDetector::new(info.family, &DetectorConfig::default()).is_ok(), "{}", info.name);
		}
	}

	#[test]
	fn config_reaches_detector() {
		let config = DetectorConfig::new(3, 2.0, 0.8, false, true).unwrap();
		let AprilTagDetector { inner, .. } = AprilTagDetector::new(TagFamily::Tag36h11, &config).unwrap();
		let raw = inner.into_raw();
		let (nthreads, decimate, sigma, refine, debug) = unsafe {
			let td = raw.as_ref();
			(td.nthreads, td.quad_decimate, td.quad_sigma, td.refine_edges, td.debug)
		};
		drop(unsafe { apriltag::Detector::from_raw(raw.as_ptr()) });

		assert_eq!(nthreads, 3);
		assert_eq!(decimate, 2.0);
		assert_eq!(sigma, 0.8);
		assert_eq!(refine, 0);
		assert_eq!(debug, 1);
	}

	#[test]
	fn too_many_threads() {
		let config = DetectorConfig::new(1000, 1.0, 0.0, true, false).unwrap();
		assert!(AprilTagDetector::new(TagFamily::Tag36h11, &config).is_err());
	}

	#[test]
	fn blank_image() {
		let mut detector = AprilTagDetector::new(TagFamily::Tag16h5, &DetectorConfig::default()).unwrap();
		assert!(detector.detect(&GrayImage::zeroed(64, 48)).unwrap().is_empty());
	}

	#[test]
	fn detects_rendered_tag() {
		let mut detector = AprilTagDetector::new(TagFamily::Tag16h5, &DetectorConfig::default()).unwrap();
		let markers = detector.detect(&render_tag16h5(TAG16H5_CODE_0)).unwrap();
		assert_eq!(markers.len(), 1);

		let det = markers[0].as_ref();
		assert_eq!(det.id, 0);
		let (lo, hi) = ((PAD + SCALE) as f64, (PAD + 7 * SCALE) as f64);
		// Counter-clockwise from bottom-left
		let expected = [(lo, hi), (hi, hi), (hi, lo), (lo, lo)];
		for (corner, (x, y)) in det.corners.iter().zip(expected) {
			assert!((corner - Point2::new(x, y)).norm() < 1.5, "{corner} vs ({x}, {y})");
		}
		let mid = (lo + hi) / 2.;
		assert!((det.center - Point2::new(mid, mid)).norm() < 1.0);
	}

	#[test]
	fn image_buffer_follows_frame_size() {
		let mut detector = AprilTagDetector::new(TagFamily::Tag16h5, &DetectorConfig::default()).unwrap();
		assert!(detector.detect(&GrayImage::zeroed(32, 32)).unwrap().is_empty());
		assert_eq!(detector.detect(&render_tag16h5(TAG16H5_CODE_0)).unwrap().len(), 1);
		assert!(detector.detect(&GrayImage::zeroed(32, 32)).unwrap().is_empty());
	}

	#[test]
	fn fronto_parallel_pose() {
		let mut detector = AprilTagDetector::new(TagFamily::Tag16h5, &DetectorConfig::default()).unwrap();
		let image = render_tag16h5(TAG16H5_CODE_0);
		let markers = detector.detect(&image).unwrap();
		assert_eq!(markers.len(), 1);

		// 6 cells of black border = 120 px; at f = 600 px a 0.2 m tag is 1 m away
		let center = image.width() as f64 / 2.;
		let intrinsics = CameraIntrinsics {
			tagsize: 0.2,
			fx: 600.,
			fy: 600.,
			cx: center,
			cy: center,
		};
		let pose = AprilTagPoseEstimator.estimate(&markers[0], &intrinsics).unwrap();
		assert_relative_eq!(pose.t, Vector3::new(0., 0., 1.), epsilon = 0.02);
		assert_relative_eq!(pose.R, Matrix3::identity(), epsilon = 0.05);
		assert_relative_eq!(pose.R * pose.R.transpose(), Matrix3::identity(), epsilon = 1e-6);
		assert!(pose.error >= 0. && pose.error < 1e-3, "error {}", pose.error);
	}
}
