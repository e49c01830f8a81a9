mod config;

pub use config::DetectorConfig;

use crate::{Detection, FrameError, GrayImage};

/// Finds tags in a grayscale image.
///
/// Implementations own whatever family and detector resources they need and
/// release them on drop.
pub trait MarkerDetector {
	/// Per-tag result. Backends may carry native state along for their
	/// [PoseEstimator](crate::PoseEstimator).
	type Marker: AsRef<Detection>;

	/// Detect tags in `image`. Order of the result is implementation-defined.
	fn detect(&mut self, image: &GrayImage) -> Result<Vec<Self::Marker>, FrameError>;
}

impl<D: MarkerDetector + ?Sized> MarkerDetector for Box<D> {
	type Marker = D::Marker;

	fn detect(&mut self, image: &GrayImage) -> Result<Vec<Self::Marker>, FrameError> {
		(**self).detect(image)
	}
}
