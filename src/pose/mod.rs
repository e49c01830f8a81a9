mod orientation;

pub use orientation::{camera_position, euler_angles, EulerAngles, TagOrientation};

use nalgebra::{Matrix3, Vector3};

use crate::{DemoError, Detection, FrameError};

/// Fixed camera parameters needed for metric pose estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
	/// In meters.
	pub tagsize: f64,
	/// In pixels.
	pub fx: f64,
	/// In pixels.
	pub fy: f64,
	/// In pixels.
	pub cx: f64,
	/// In pixels.
	pub cy: f64,
}

impl Default for CameraIntrinsics {
	fn default() -> Self {
		Self {
			tagsize: 0.135,
			fx: 1952.992318829338,
			fy: 1951.357135681735,
			cx: 539.6076735381756,
			cy: 276.4885069533516,
		}
	}
}

impl CameraIntrinsics {
	pub fn validate(self) -> Result<Self, DemoError> {
		let positive = [("tag size", self.tagsize), ("fx", self.fx), ("fy", self.fy)];
		for (name, value) in positive {
			if !(value.is_finite() && value > 0.) {
				return Err(DemoError::InvalidConfig(format!("{name} must be positive (got {value})")));
			}
		}
		if !(self.cx.is_finite() && self.cy.is_finite()) {
			return Err(DemoError::InvalidConfig("principal point must be finite".into()));
		}
		Ok(self)
	}
}

/// Rotation and translation of a tag relative to the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseEstimate {
	/// Rotation, tag frame to camera frame
	pub R: Matrix3<f64>,
	/// Tag origin in the camera frame
	pub t: Vector3<f64>,
	/// Object-space error of the solution
	pub error: f64,
}

/// Estimates the pose of a detected tag.
///
/// `M` is the detector's [Marker](crate::MarkerDetector::Marker) type.
pub trait PoseEstimator<M: ?Sized = Detection> {
	fn estimate(&self, marker: &M, intrinsics: &CameraIntrinsics) -> Result<PoseEstimate, FrameError>;
}

impl<M: ?Sized, P: PoseEstimator<M> + ?Sized> PoseEstimator<M> for Box<P> {
	fn estimate(&self, marker: &M, intrinsics: &CameraIntrinsics) -> Result<PoseEstimate, FrameError> {
		(**self).estimate(marker, intrinsics)
	}
}
