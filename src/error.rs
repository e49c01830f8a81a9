use std::io;

use thiserror::Error;

/// Errors that end the demo (exit code -1)
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DemoError {
	#[error("Unrecognized tag family name: {0}")]
	UnknownFamily(String),
	#[error("Couldn't open video capture device {camera}")]
	SourceUnavailable {
		camera: i32,
	},
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("Display error: {0}")]
	Display(String),
	#[error("Backend error: {0}")]
	Backend(String),
	#[error(transparent)]
	Io(#[from] io::Error),
}

/// Errors scoped to a single frame. These are logged and the frame (or tag) is skipped.
#[derive(Clone, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum FrameError {
	#[error("Frame capture failed: {0}")]
	Capture(String),
	#[error("Frame source returned an empty frame")]
	EmptyFrame,
	#[error("Detection error: {0}")]
	Detect(String),
	#[error("Pose estimation failed for tag {id}: {reason}")]
	Pose {
		id: u32,
		reason: String,
	},
	#[error("Drawing error: {0}")]
	Draw(String),
}

#[cfg(feature="opencv")]
impl From<opencv::Error> for DemoError {
	fn from(value: opencv::Error) -> Self {
		Self::Backend(value.to_string())
	}
}

#[cfg(feature="apriltag")]
impl From<apriltag::Error> for DemoError {
	fn from(value: apriltag::Error) -> Self {
		Self::Backend(value.to_string())
	}
}
