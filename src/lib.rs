#![allow(non_snake_case)]

pub mod families;
pub mod cli;
pub mod pipeline;
#[cfg(feature="apriltag")]
pub mod apriltag_backend;
#[cfg(feature="opencv")]
pub mod opencv_backend;
mod detector;
mod detection;
mod error;
mod image;
mod pose;
mod timeprofile;

pub use families::{TagFamily, FamilyInfo, FAMILY_TABLE};
pub use detector::{MarkerDetector, DetectorConfig};
pub use detection::{Detection, sort_by_id};
pub use error::{DemoError, FrameError};
pub use image::GrayImage;
pub use timeprofile::{TimeProfile, TimeProfileStatistics, StageSummary};
pub use cli::{Args, DemoConfig};
pub use pipeline::{Pipeline, PipelineOptions, FrameReport, RunSummary};

pub use pose::{
	camera_position,
	euler_angles,
	CameraIntrinsics,
	EulerAngles,
	PoseEstimate,
	PoseEstimator,
	TagOrientation,
};
