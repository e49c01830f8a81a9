use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::{pipeline::PipelineOptions, CameraIntrinsics, DemoError, DetectorConfig, TagFamily};

/// Show live AprilTag detections and their poses from a camera
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
	/// Enable debugging output (slow)
	#[arg(short, long)]
	pub debug: bool,
	/// Reduce output
	#[arg(short, long, default_value_t=false)]
	pub quiet: bool,
	/// Tag family to use
	#[arg(short, long, default_value="tag36h11")]
	pub family: String,
	/// Use this many CPU threads
	#[arg(short, long, default_value_t=1)]
	pub threads: usize,
	/// Decimate input image by this factor
	#[arg(short='x', long, default_value_t=1.0)]
	pub decimate: f32,
	/// Apply low-pass blur to input
	#[arg(short, long, default_value_t=0.0, allow_negative_numbers=true)]
	pub blur: f32,
	/// Spend more time trying to align edges of tags
	#[arg(short='0', long, default_value_t=true, action=ArgAction::Set)]
	pub refine_edges: bool,
	/// Camera ID
	#[arg(short, long, default_value_t=0)]
	pub camera: i32,
	/// Stop after this many frames
	#[arg(long)]
	pub max_frames: Option<usize>,
	/// Process detections in order of tag id
	#[arg(long)]
	pub sort_by_id: bool,
	/// Physical tag size (meters)
	#[arg(long, default_value_t=CameraIntrinsics::default().tagsize)]
	pub tag_size: f64,
	/// Focal length x (pixels)
	#[arg(long, default_value_t=CameraIntrinsics::default().fx)]
	pub fx: f64,
	/// Focal length y (pixels)
	#[arg(long, default_value_t=CameraIntrinsics::default().fy)]
	pub fy: f64,
	/// Principal point x (pixels)
	#[arg(long, default_value_t=CameraIntrinsics::default().cx)]
	pub cx: f64,
	/// Principal point y (pixels)
	#[arg(long, default_value_t=CameraIntrinsics::default().cy)]
	pub cy: f64,
}

impl Args {
	/// Log level implied by `--debug`/`--quiet`
	pub fn log_level(&self) -> LevelFilter {
		if self.debug {
			LevelFilter::Debug
		} else if self.quiet {
			LevelFilter::Warn
		} else {
			LevelFilter::Info
		}
	}
}

/// Everything the demo needs, validated
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
	pub family: TagFamily,
	pub detector: DetectorConfig,
	pub intrinsics: CameraIntrinsics,
	pub camera: i32,
	pub options: PipelineOptions,
}

impl DemoConfig {
	pub fn from_args(args: &Args) -> Result<Self, DemoError> {
		let family = args.family.parse::<TagFamily>()?;
		let detector = DetectorConfig::new(args.threads, args.decimate, args.blur, args.refine_edges, args.debug)?;
		let intrinsics = CameraIntrinsics {
			tagsize: args.tag_size,
			fx: args.fx,
			fy: args.fy,
			cx: args.cx,
			cy: args.cy,
		}.validate()?;
		if args.max_frames == Some(0) {
			return Err(DemoError::InvalidConfig("max-frames must be at least 1".into()));
		}

		Ok(Self {
			family,
			detector,
			intrinsics,
			camera: args.camera,
			options: PipelineOptions {
				quiet: args.quiet,
				sort_by_id: args.sort_by_id,
				max_frames: args.max_frames,
				..Default::default()
			},
		})
	}
}
