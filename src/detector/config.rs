use std::num::NonZeroUsize;

use crate::DemoError;

/// Configuration for a [MarkerDetector](super::MarkerDetector).
///
/// Fixed once the detector is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
	/// How many threads should be used?
	nthreads: NonZeroUsize,

	/// Detection of quads can be done on a lower-resolution image,
	/// improving speed at a cost of pose accuracy and a slight
	/// decrease in detection rate. Decoding the binary payload is
	/// still done at full resolution.
	quad_decimate: f32,

	/// What Gaussian blur should be applied to the segmented image
	/// (used for quad detection?)  Parameter is the standard deviation
	/// in pixels.  Very noisy images benefit from non-zero values
	/// (e.g. 0.8).
	quad_sigma: f32,

	/// When set, the edges of the each quad are adjusted to "snap
	/// to" strong gradients nearby. This is useful when decimation is
	/// employed, as it can increase the quality of the initial quad
	/// estimate substantially. Generally recommended to be on.
	refine_edges: bool,

	/// Have the detector write its intermediate images (slow)
	debug: bool,
}

impl Default for DetectorConfig {
	fn default() -> Self {
		Self {
			nthreads: NonZeroUsize::MIN,
			quad_decimate: 1.0,
			quad_sigma: 0.0,
			refine_edges: true,
			debug: false,
		}
	}
}

impl DetectorConfig {
	pub fn new(nthreads: usize, quad_decimate: f32, quad_sigma: f32, refine_edges: bool, debug: bool) -> Result<Self, DemoError> {
		let nthreads = NonZeroUsize::new(nthreads)
			.ok_or_else(|| DemoError::InvalidConfig("threads must be at least 1".into()))?;
		if !(quad_decimate >= 1.) {
			return Err(DemoError::InvalidConfig(format!("decimate must be >= 1 (got {quad_decimate})")));
		}
		if !quad_sigma.is_finite() {
			return Err(DemoError::InvalidConfig(format!("blur must be finite (got {quad_sigma})")));
		}
		Ok(Self {
			nthreads,
			quad_decimate,
			quad_sigma,
			refine_edges,
			debug,
		})
	}

	pub const fn nthreads(&self) -> NonZeroUsize {
		self.nthreads
	}

	pub const fn quad_decimate(&self) -> f32 {
		self.quad_decimate
	}

	pub const fn quad_sigma(&self) -> f32 {
		self.quad_sigma
	}

	pub const fn refine_edges(&self) -> bool {
		self.refine_edges
	}

	pub const fn debug(&self) -> bool {
		self.debug
	}
}
